//! Parameter resolution: overrides, then stored configuration, then defaults.

use std::str::FromStr;

use crate::core::{LlmError, ReasoningEffort};

use super::store::{ConfigStore, ModelCatalog, keys};

pub const DEFAULT_MODEL: &str = "gpt-5-nano";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1800;
pub const DEFAULT_REASONING_EFFORT: ReasoningEffort = ReasoningEffort::Low;

/// Per-call overrides supplied by the caller. `None` means "not overridden".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }
}

/// Typed snapshot of the optional configuration keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl StoredConfig {
    /// Read and parse the optional keys. Blank values count as absent; a
    /// numeric model value is resolved through `catalog` and ignored when the
    /// id is unknown.
    pub fn load(store: &dyn ConfigStore, catalog: &ModelCatalog) -> Result<Self, LlmError> {
        let model = read(store, keys::MODEL).and_then(|value| match value.parse::<u64>() {
            Ok(id) => {
                let name = catalog.name(id).map(str::to_string);
                if name.is_none() {
                    tracing::warn!(id, "Configured model id not found in catalog");
                }
                name
            }
            Err(_) => Some(value),
        });

        Ok(Self {
            model,
            temperature: parse(store, keys::TEMPERATURE)?,
            max_tokens: parse(store, keys::MAX_TOKENS)?,
            reasoning_effort: parse(store, keys::REASONING_EFFORT)?,
        })
    }
}

fn read(store: &dyn ConfigStore, key: &str) -> Option<String> {
    store
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse<T>(store: &dyn ConfigStore, key: &str) -> Result<Option<T>, LlmError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    read(store, key)
        .map(|value| {
            value.parse::<T>().map_err(|e| LlmError::Config {
                message: format!("Invalid value `{value}` for `{key}`"),
                source: Some(Box::new(e)),
            })
        })
        .transpose()
}

/// The API key, or [`LlmError::MissingCredential`] when unset or blank.
pub fn api_key(store: &dyn ConfigStore) -> Result<String, LlmError> {
    read(store, keys::API_KEY).ok_or_else(|| LlmError::MissingCredential {
        key: keys::API_KEY.to_string(),
    })
}

/// Parameters for one completion after merging every source.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParams {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub reasoning_effort: ReasoningEffort,
}

impl Default for EffectiveParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            reasoning_effort: DEFAULT_REASONING_EFFORT,
        }
    }
}

/// Field by field: `overrides` over `stored` over the built-in defaults.
pub fn resolve_parameters(overrides: &Overrides, stored: &StoredConfig) -> EffectiveParams {
    let defaults = EffectiveParams::default();
    EffectiveParams {
        model: overrides
            .model
            .clone()
            .or_else(|| stored.model.clone())
            .unwrap_or(defaults.model),
        temperature: overrides
            .temperature
            .or(stored.temperature)
            .unwrap_or(defaults.temperature),
        max_output_tokens: overrides
            .max_tokens
            .or(stored.max_tokens)
            .unwrap_or(defaults.max_output_tokens),
        reasoning_effort: overrides
            .reasoning_effort
            .or(stored.reasoning_effort)
            .unwrap_or(defaults.reasoning_effort),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;

    #[test]
    fn test_defaults_when_nothing_configured() {
        let stored = StoredConfig::load(&MemoryConfig::new(), &ModelCatalog::new()).unwrap();
        let params = resolve_parameters(&Overrides::new(), &stored);

        assert_eq!(params, EffectiveParams::default());
        assert_eq!(params.model, "gpt-5-nano");
        assert_eq!(params.max_output_tokens, 1800);
    }

    #[test]
    fn test_overrides_beat_stored_beat_defaults() {
        let store = MemoryConfig::new()
            .with(keys::MODEL, "gpt-4o")
            .with(keys::TEMPERATURE, "0.75")
            .with(keys::MAX_TOKENS, "1600");
        let stored = StoredConfig::load(&store, &ModelCatalog::new()).unwrap();

        let params = resolve_parameters(
            &Overrides::new().model("gpt-5-mini").max_tokens(256),
            &stored,
        );

        assert_eq!(params.model, "gpt-5-mini");
        assert_eq!(params.max_output_tokens, 256);
        assert_eq!(params.temperature, 0.75);
        assert_eq!(params.reasoning_effort, ReasoningEffort::Low);
    }

    #[test]
    fn test_numeric_model_resolves_through_catalog() {
        let catalog = ModelCatalog::new().with_entry(7, "gpt-4o-mini");

        let known = MemoryConfig::new().with(keys::MODEL, "7");
        assert_eq!(
            StoredConfig::load(&known, &catalog).unwrap().model.as_deref(),
            Some("gpt-4o-mini")
        );

        let unknown = MemoryConfig::new().with(keys::MODEL, "42");
        assert_eq!(StoredConfig::load(&unknown, &catalog).unwrap().model, None);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let store = MemoryConfig::new()
            .with(keys::MODEL, "  ")
            .with(keys::TEMPERATURE, "")
            .with(keys::API_KEY, " ");
        let stored = StoredConfig::load(&store, &ModelCatalog::new()).unwrap();

        assert_eq!(stored, StoredConfig::default());
        assert!(matches!(
            api_key(&store),
            Err(LlmError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_malformed_values_are_config_errors() {
        let store = MemoryConfig::new().with(keys::MAX_TOKENS, "lots");
        assert!(matches!(
            StoredConfig::load(&store, &ModelCatalog::new()),
            Err(LlmError::Config { .. })
        ));

        let store = MemoryConfig::new().with(keys::REASONING_EFFORT, "maximum");
        assert!(matches!(
            StoredConfig::load(&store, &ModelCatalog::new()),
            Err(LlmError::Config { .. })
        ));
    }

    #[test]
    fn test_stored_reasoning_effort() {
        let store = MemoryConfig::new()
            .with(keys::REASONING_EFFORT, "medium")
            .with(keys::API_KEY, "sk-test");
        let stored = StoredConfig::load(&store, &ModelCatalog::new()).unwrap();

        assert_eq!(stored.reasoning_effort, Some(ReasoningEffort::Medium));
        assert_eq!(api_key(&store).unwrap(), "sk-test");
    }
}
