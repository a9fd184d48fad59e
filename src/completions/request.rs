use serde::Serialize;

use crate::core::{ChatRole, Conversation, ReasoningEffort};

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub model: String,

    pub messages: Vec<ChatMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Replaces `max_tokens` for models that reject it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
}

/// Chat message with content already reduced to a single string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

pub(crate) fn convert_messages(conversation: &Conversation) -> Vec<ChatMessage> {
    conversation
        .messages()
        .iter()
        .map(|message| ChatMessage {
            role: message.role,
            content: message.content.flatten(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentPart, Message};
    use serde_json::json;

    #[test]
    fn test_structured_content_is_flattened_per_message() {
        let conversation = Conversation::new(vec![
            Message::system("You are terse."),
            Message::user(vec![ContentPart::text("a"), ContentPart::text("b")]),
        ]);

        let request = Request {
            model: "gpt-4o-mini".to_string(),
            messages: convert_messages(&conversation),
            max_tokens: Some(256),
            max_completion_tokens: None,
            temperature: Some(0.5),
            reasoning_effort: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "You are terse." },
                    { "role": "user", "content": "ab" }
                ],
                "max_tokens": 256,
                "temperature": 0.5
            })
        );
    }
}
