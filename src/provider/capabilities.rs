//! Per-model request capabilities and the tier fallback policy.

use super::schema::ApiSchema;

/// What a model family accepts on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    pub schema: ApiSchema,
    pub supports_temperature: bool,
    pub supports_reasoning_effort: bool,
}

const REASONING_TIER: ModelCapabilities = ModelCapabilities {
    schema: ApiSchema::Responses,
    supports_temperature: false,
    supports_reasoning_effort: true,
};

const CHAT_TIER: ModelCapabilities = ModelCapabilities {
    schema: ApiSchema::ChatCompletions,
    supports_temperature: true,
    supports_reasoning_effort: false,
};

/// Model-name prefixes of reasoning-tier families. Anything unmatched is
/// treated as a chat-tier model.
const CAPABILITY_TABLE: &[(&str, ModelCapabilities)] = &[
    ("gpt-5", REASONING_TIER),
    ("o1", REASONING_TIER),
    ("o3", REASONING_TIER),
    ("o4", REASONING_TIER),
];

impl ModelCapabilities {
    pub fn for_model(model: &str) -> Self {
        CAPABILITY_TABLE
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
            .map(|(_, capabilities)| *capabilities)
            .unwrap_or(CHAT_TIER)
    }

    pub fn is_reasoning_tier(&self) -> bool {
        self.schema == ApiSchema::Responses
    }
}

/// Which model escalates to which when output stays empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    /// Cheapest reasoning-tier model; the only one eligible for fallback.
    pub cheapest_tier: String,
    /// Next tier up, used once the cheapest model keeps returning nothing.
    pub fallback_model: String,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            cheapest_tier: "gpt-5-nano".to_string(),
            fallback_model: "gpt-5-mini".to_string(),
        }
    }
}

impl ModelPolicy {
    pub fn fallback_for(&self, model: &str) -> Option<&str> {
        (model == self.cheapest_tier && self.fallback_model != self.cheapest_tier)
            .then_some(self.fallback_model.as_str())
    }
}
