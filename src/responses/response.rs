//! Defensive decoding of `/responses` bodies.
//!
//! Every field is optional. The provider omits fields depending on model and
//! status, and a missing field must never fail the whole call.

use serde::Deserialize;

use crate::core::UsageCounters;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Response {
    pub id: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
    pub incomplete_details: Option<IncompleteDetails>,
    /// Convenience aggregate some gateways and SDKs populate.
    pub output_text: Option<String>,
    pub output: Option<Vec<OutputItem>>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IncompleteDetails {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub content: Option<Vec<OutputPart>>,
}

/// One element of a content list. Parts arrive either as objects or, from
/// some compatible servers, as bare strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OutputPart {
    Text(String),
    Object(PartObject),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartObject {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub text: Option<String>,
    pub refusal: Option<String>,
}

impl OutputPart {
    /// Text carried by the part; refusals and unknown shapes carry none.
    pub fn text(&self) -> &str {
        match self {
            OutputPart::Text(text) => text,
            OutputPart::Object(part) => part.text.as_deref().unwrap_or_default(),
            OutputPart::Other(_) => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
    pub cached_input_tokens: Option<u64>,
    pub input_tokens_details: Option<InputTokensDetails>,
    pub output_tokens_details: Option<OutputTokensDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputTokensDetails {
    pub cached_tokens: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputTokensDetails {
    pub reasoning_tokens: Option<u64>,
}

impl Response {
    /// Prefer `output_text`; when blank, concatenate every text-bearing part
    /// of every output item.
    pub fn text(&self) -> String {
        if let Some(text) = self.output_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return text.to_string();
        }

        self.output
            .iter()
            .flatten()
            .filter_map(|item| item.content.as_ref())
            .flatten()
            .map(OutputPart::text)
            .collect()
    }

    pub fn incomplete_reason(&self) -> Option<&str> {
        self.incomplete_details
            .as_ref()
            .and_then(|details| details.reason.as_deref())
    }

    pub fn usage(&self) -> UsageCounters {
        let Some(usage) = &self.usage else {
            return UsageCounters::default();
        };

        let cached_input_tokens = usage
            .cached_input_tokens
            .or_else(|| {
                usage
                    .input_tokens_details
                    .as_ref()
                    .and_then(|details| details.cached_tokens)
            })
            .unwrap_or_default();
        let reasoning_tokens = usage
            .output_tokens_details
            .as_ref()
            .and_then(|details| details.reasoning_tokens)
            .unwrap_or_default();

        UsageCounters {
            input_tokens: usage.input_tokens.unwrap_or_default(),
            output_tokens: usage.output_tokens.unwrap_or_default(),
            total_tokens: usage.total_tokens.unwrap_or_default(),
            cached_input_tokens,
            reasoning_tokens,
        }
        .with_derived_total()
    }
}
