use serde::Serialize;

use crate::core::ReasoningEffort;

/// Body of `POST /responses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub model: String,

    /// The flattened conversation.
    pub input: String,

    pub max_output_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,

    /// Only set for models that accept it; reasoning models reject it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reasoning {
    pub effort: ReasoningEffort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reasoning_request_serialization() {
        let request = Request {
            model: "gpt-5-nano".to_string(),
            input: "Hi".to_string(),
            max_output_tokens: 512,
            reasoning: Some(Reasoning {
                effort: ReasoningEffort::Medium,
            }),
            temperature: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-5-nano",
                "input": "Hi",
                "max_output_tokens": 512,
                "reasoning": { "effort": "medium" }
            })
        );
    }
}
