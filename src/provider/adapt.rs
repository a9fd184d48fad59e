//! Recovery from "unsupported parameter" rejections.
//!
//! The provider reports these only as free text on a 400 response. All
//! pattern matching on that text lives in [`classify_unsupported_parameter`].

use crate::core::LlmError;

use super::schema::ApiRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedParameter {
    /// Drop `temperature`.
    Temperature,
    /// Chat schema: rename `max_tokens` to `max_completion_tokens`.
    MaxTokens,
    /// Drop the reasoning-effort hint.
    ReasoningEffort,
}

impl UnsupportedParameter {
    pub fn name(&self) -> &'static str {
        match self {
            UnsupportedParameter::Temperature => "temperature",
            UnsupportedParameter::MaxTokens => "max_tokens",
            UnsupportedParameter::ReasoningEffort => "reasoning_effort",
        }
    }
}

/// Lowercased substrings and the parameter each one implicates.
///
/// `"max_output_tokens"` does not contain `"max_tokens"`, so a complaint about
/// the responses budget field is not mistaken for the chat one.
const PATTERNS: &[(&str, UnsupportedParameter)] = &[
    ("temperature", UnsupportedParameter::Temperature),
    ("max_tokens", UnsupportedParameter::MaxTokens),
    ("reasoning_effort", UnsupportedParameter::ReasoningEffort),
    ("reasoning.effort", UnsupportedParameter::ReasoningEffort),
];

/// Parameters named by a provider rejection, if `error` is one.
///
/// Only client errors (400/422) qualify; transport failures and server errors
/// never classify. An empty result means the error is not adaptable.
pub fn classify_unsupported_parameter(error: &LlmError) -> Vec<UnsupportedParameter> {
    let LlmError::Api {
        message,
        status_code: Some(400 | 422),
        ..
    } = error
    else {
        return Vec::new();
    };

    let message = message.to_lowercase();
    let mut found = Vec::new();
    for (pattern, parameter) in PATTERNS {
        if message.contains(pattern) && !found.contains(parameter) {
            found.push(*parameter);
        }
    }
    found
}

impl ApiRequest {
    /// Apply one adaptation in place. Returns whether the request changed.
    pub fn adapt(&mut self, parameter: UnsupportedParameter) -> bool {
        match (self, parameter) {
            (ApiRequest::Responses(request), UnsupportedParameter::Temperature) => {
                request.temperature.take().is_some()
            }
            (ApiRequest::Chat(request), UnsupportedParameter::Temperature) => {
                request.temperature.take().is_some()
            }
            // The responses schema already uses `max_output_tokens`.
            (ApiRequest::Responses(_), UnsupportedParameter::MaxTokens) => false,
            (ApiRequest::Chat(request), UnsupportedParameter::MaxTokens) => {
                match request.max_tokens.take() {
                    Some(tokens) => {
                        request.max_completion_tokens = Some(tokens);
                        true
                    }
                    None => false,
                }
            }
            (ApiRequest::Responses(request), UnsupportedParameter::ReasoningEffort) => {
                request.reasoning.take().is_some()
            }
            (ApiRequest::Chat(request), UnsupportedParameter::ReasoningEffort) => {
                request.reasoning_effort.take().is_some()
            }
        }
    }
}
