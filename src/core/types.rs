use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One typed fragment of structured message content.
///
/// Deserializes from an object (`{"type": .., "text": ..}`) or from a bare
/// value: strings and other scalars become text parts, `null` an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawContentPart")]
pub struct ContentPart {
    #[serde(rename = "type", default = "default_part_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

fn default_part_kind() -> String {
    "text".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawContentPart {
    Text(String),
    Object {
        #[serde(rename = "type", default = "default_part_kind")]
        kind: String,
        #[serde(default)]
        text: Option<String>,
    },
    Other(serde_json::Value),
}

impl From<RawContentPart> for ContentPart {
    fn from(raw: RawContentPart) -> Self {
        match raw {
            RawContentPart::Text(text) => ContentPart::text(text),
            RawContentPart::Object { kind, text } => ContentPart { kind, text },
            RawContentPart::Other(serde_json::Value::Null) => ContentPart {
                kind: default_part_kind(),
                text: None,
            },
            RawContentPart::Other(value) => ContentPart::text(value.to_string()),
        }
    }
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: default_part_kind(),
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl MessageContent {
    /// Reduce the content to one string. Parts concatenate in order with no
    /// separator; a part without text contributes nothing.
    pub fn flatten(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|part| part.text.as_deref().unwrap_or_default())
                .collect(),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        MessageContent::Text(value.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        MessageContent::Text(value)
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(value: Vec<ContentPart>) -> Self {
        MessageContent::Parts(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    #[serde(default, deserialize_with = "nullable_content")]
    pub content: MessageContent,
}

/// `"content": null` reads as empty content.
fn nullable_content<'de, D>(deserializer: D) -> Result<MessageContent, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<MessageContent>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Message {
    pub fn new(role: ChatRole, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Ordered list of role-tagged messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation(pub Vec<Message>);

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Single prompt string: each message flattened, joined by newlines.
    ///
    /// Used both for the reasoning-tier `input` and for the usage log, so the
    /// logged prompt does not depend on which schema carried the request.
    pub fn prompt(&self) -> String {
        self.0
            .iter()
            .map(|message| message.content.flatten())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(value: Vec<Message>) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    #[default]
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(LlmError::config(format!(
                "Unknown reasoning effort `{other}` (expected low, medium or high)"
            ))),
        }
    }
}

/// Token counters normalized from either API schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cached_input_tokens: u64,
    pub reasoning_tokens: u64,
}

impl UsageCounters {
    /// Fill in `total_tokens` when the provider left it out.
    pub fn with_derived_total(mut self) -> Self {
        if self.total_tokens == 0 {
            self.total_tokens = self.input_tokens.saturating_add(self.output_tokens);
        }
        self
    }
}

/// Outcome of a successful completion, after any retry or fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    /// Never blank.
    pub text: String,
    pub usage: UsageCounters,
    pub status: Option<String>,
    pub incomplete_reason: Option<String>,
    pub used_retry: bool,
    pub used_fallback: bool,
    pub effective_model: String,
    pub effective_max_tokens: u32,
    /// Temperature actually sent on the final attempt.
    pub temperature: Option<f32>,
}
