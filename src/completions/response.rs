use serde::Deserialize;

use crate::core::UsageCounters;
use crate::responses::OutputPart;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Response {
    pub id: Option<String>,
    pub model: Option<String>,
    pub choices: Option<Vec<Choice>>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChoiceMessage {
    pub content: Option<ChoiceContent>,
    pub refusal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChoiceContent {
    Text(String),
    Parts(Vec<OutputPart>),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
    pub prompt_tokens_details: Option<PromptTokensDetails>,
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PromptTokensDetails {
    pub cached_tokens: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompletionTokensDetails {
    pub reasoning_tokens: Option<u64>,
}

/// Finish reasons that mean the model stopped before finishing its answer.
const INCOMPLETE_FINISH_REASONS: &[&str] = &["length", "content_filter"];

impl Response {
    fn first_choice(&self) -> Option<&Choice> {
        self.choices.as_ref().and_then(|choices| choices.first())
    }

    pub fn text(&self) -> String {
        match self
            .first_choice()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_ref())
        {
            Some(ChoiceContent::Text(text)) => text.clone(),
            Some(ChoiceContent::Parts(parts)) => parts.iter().map(OutputPart::text).collect(),
            None => String::new(),
        }
    }

    /// Chat responses have no status field; derive one from `finish_reason`.
    pub fn status(&self) -> Option<&'static str> {
        let finish_reason = self.first_choice()?.finish_reason.as_deref()?;
        if INCOMPLETE_FINISH_REASONS.contains(&finish_reason) {
            Some("incomplete")
        } else {
            Some("completed")
        }
    }

    pub fn incomplete_reason(&self) -> Option<&str> {
        self.first_choice()
            .and_then(|choice| choice.finish_reason.as_deref())
            .filter(|reason| INCOMPLETE_FINISH_REASONS.contains(reason))
    }

    pub fn usage(&self) -> UsageCounters {
        let Some(usage) = &self.usage else {
            return UsageCounters::default();
        };

        UsageCounters {
            input_tokens: usage.prompt_tokens.unwrap_or_default(),
            output_tokens: usage.completion_tokens.unwrap_or_default(),
            total_tokens: usage.total_tokens.unwrap_or_default(),
            cached_input_tokens: usage
                .prompt_tokens_details
                .as_ref()
                .and_then(|details| details.cached_tokens)
                .unwrap_or_default(),
            reasoning_tokens: usage
                .completion_tokens_details
                .as_ref()
                .and_then(|details| details.reasoning_tokens)
                .unwrap_or_default(),
        }
        .with_derived_total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Response {
        serde_json::from_value(value).expect("response should decode")
    }

    #[test]
    fn test_text_and_completed_status() {
        let response = decode(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hi!" }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 7, "completion_tokens": 2, "total_tokens": 9 }
        }));

        assert_eq!(response.text(), "Hi!");
        assert_eq!(response.status(), Some("completed"));
        assert_eq!(response.incomplete_reason(), None);
        assert_eq!(response.usage().total_tokens, 9);
    }

    #[test]
    fn test_structured_content_and_length_cutoff() {
        let response = decode(json!({
            "choices": [{
                "message": { "content": [{ "type": "text", "text": "par" }, { "type": "text", "text": "tial" }] },
                "finish_reason": "length"
            }]
        }));

        assert_eq!(response.text(), "partial");
        assert_eq!(response.status(), Some("incomplete"));
        assert_eq!(response.incomplete_reason(), Some("length"));
    }

    #[test]
    fn test_refusal_and_null_content_are_blank() {
        let response = decode(json!({
            "choices": [{ "message": { "content": null, "refusal": "I can't help with that." }, "finish_reason": "stop" }]
        }));

        assert_eq!(response.text(), "");
        assert_eq!(decode(json!({ "choices": [] })).text(), "");
        assert_eq!(decode(json!({ "choices": [] })).status(), None);
    }

    #[test]
    fn test_usage_maps_legacy_names_and_derives_total() {
        let response = decode(json!({
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 4,
                "prompt_tokens_details": { "cached_tokens": 8 },
                "completion_tokens_details": { "reasoning_tokens": 1 }
            }
        }));

        assert_eq!(
            response.usage(),
            UsageCounters {
                input_tokens: 12,
                output_tokens: 4,
                total_tokens: 16,
                cached_input_tokens: 8,
                reasoning_tokens: 1,
            }
        );
    }
}
