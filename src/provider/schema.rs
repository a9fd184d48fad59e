//! The two request/response schemas as one tagged union.

use crate::completions;
use crate::core::{Conversation, ReasoningEffort, UsageCounters};
use crate::responses;

use super::capabilities::ModelCapabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSchema {
    /// `POST /responses`, used by reasoning-tier models.
    Responses,
    /// `POST /chat/completions`, used by everything else.
    ChatCompletions,
}

/// Schema-independent parameters of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    /// `None` for models that reject temperature.
    pub temperature: Option<f32>,
    pub max_output_tokens: u32,
    /// `None` for models without a reasoning-effort knob.
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl CompletionRequest {
    /// Keep only the parameters `model` accepts.
    pub fn new(
        model: impl Into<String>,
        temperature: f32,
        max_output_tokens: u32,
        reasoning_effort: ReasoningEffort,
    ) -> Self {
        let model = model.into();
        let capabilities = ModelCapabilities::for_model(&model);
        Self {
            temperature: capabilities.supports_temperature.then_some(temperature),
            reasoning_effort: capabilities
                .supports_reasoning_effort
                .then_some(reasoning_effort),
            model,
            max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Responses(responses::Request),
    Chat(completions::Request),
}

impl ApiRequest {
    pub fn build(conversation: &Conversation, request: &CompletionRequest) -> Self {
        match ModelCapabilities::for_model(&request.model).schema {
            ApiSchema::Responses => ApiRequest::Responses(responses::Request {
                model: request.model.clone(),
                input: conversation.prompt(),
                max_output_tokens: request.max_output_tokens,
                reasoning: request
                    .reasoning_effort
                    .map(|effort| responses::Reasoning { effort }),
                temperature: request.temperature,
            }),
            ApiSchema::ChatCompletions => ApiRequest::Chat(completions::Request {
                model: request.model.clone(),
                messages: completions::request::convert_messages(conversation),
                max_tokens: Some(request.max_output_tokens),
                max_completion_tokens: None,
                temperature: request.temperature,
                reasoning_effort: request.reasoning_effort,
            }),
        }
    }

    pub fn schema(&self) -> ApiSchema {
        match self {
            ApiRequest::Responses(_) => ApiSchema::Responses,
            ApiRequest::Chat(_) => ApiSchema::ChatCompletions,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ApiRequest::Responses(request) => &request.model,
            ApiRequest::Chat(request) => &request.model,
        }
    }

    pub fn temperature(&self) -> Option<f32> {
        match self {
            ApiRequest::Responses(request) => request.temperature,
            ApiRequest::Chat(request) => request.temperature,
        }
    }

    pub fn max_output_tokens(&self) -> u32 {
        match self {
            ApiRequest::Responses(request) => request.max_output_tokens,
            ApiRequest::Chat(request) => request
                .max_completion_tokens
                .or(request.max_tokens)
                .unwrap_or_default(),
        }
    }

    /// Change the output budget, keeping whichever budget field is in use.
    pub fn set_max_output_tokens(&mut self, tokens: u32) {
        match self {
            ApiRequest::Responses(request) => request.max_output_tokens = tokens,
            ApiRequest::Chat(request) => {
                if request.max_completion_tokens.is_some() {
                    request.max_completion_tokens = Some(tokens);
                } else {
                    request.max_tokens = Some(tokens);
                }
            }
        }
    }
}

/// A decoded provider response of either schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Responses(responses::Response),
    Chat(completions::Response),
}

impl ApiResponse {
    pub fn text(&self) -> String {
        match self {
            ApiResponse::Responses(response) => response.text(),
            ApiResponse::Chat(response) => response.text(),
        }
    }

    pub fn status(&self) -> Option<String> {
        match self {
            ApiResponse::Responses(response) => response.status.clone(),
            ApiResponse::Chat(response) => response.status().map(str::to_string),
        }
    }

    pub fn incomplete_reason(&self) -> Option<String> {
        match self {
            ApiResponse::Responses(response) => response.incomplete_reason().map(str::to_string),
            ApiResponse::Chat(response) => response.incomplete_reason().map(str::to_string),
        }
    }

    pub fn usage(&self) -> UsageCounters {
        match self {
            ApiResponse::Responses(response) => response.usage(),
            ApiResponse::Chat(response) => response.usage(),
        }
    }
}
