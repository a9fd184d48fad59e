use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::LlmError;

/// USD per token for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub prompt: f64,
    #[serde(default)]
    pub cached_prompt: f64,
    pub completion: f64,
}

/// Model name to rates. Loaded once and shared read-only; replace the whole
/// table to change rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    #[serde(default)]
    pub version: Option<String>,
    pub models: HashMap<String, PricingEntry>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PricingTable {
    pub fn builtin() -> Self {
        let models = [
            ("gpt-4o", 0.000005, 0.0000025, 0.000015),
            ("gpt-4o-mini", 0.00000015, 0.000000075, 0.0000006),
            ("gpt-5-mini", 0.0000005, 0.00000005, 0.0000015),
            ("gpt-5-nano", 0.0000001, 0.00000001, 0.0000004),
        ]
        .into_iter()
        .map(|(model, prompt, cached_prompt, completion)| {
            (
                model.to_string(),
                PricingEntry {
                    prompt,
                    cached_prompt,
                    completion,
                },
            )
        })
        .collect();

        Self {
            version: Some("builtin".to_string()),
            models,
        }
    }

    pub fn empty() -> Self {
        Self {
            version: None,
            models: HashMap::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, LlmError> {
        let table: Self = serde_json::from_str(json).map_err(|e| LlmError::Config {
            message: "Failed to parse pricing table".to_string(),
            source: Some(Box::new(e)),
        })?;

        if let Some((model, _)) = table.models.iter().find(|(_, entry)| !entry.is_valid()) {
            return Err(LlmError::config(format!(
                "Pricing for `{model}` must be finite and non-negative"
            )));
        }

        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LlmError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| LlmError::Config {
            message: format!("Failed to read pricing table `{}`", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_entry(mut self, model: impl Into<String>, entry: PricingEntry) -> Self {
        self.models.insert(model.into(), entry);
        self
    }

    /// Exact-name lookup; unknown models price at zero.
    pub fn entry(&self, model: &str) -> PricingEntry {
        self.models.get(model).copied().unwrap_or_default()
    }
}

impl PricingEntry {
    fn is_valid(&self) -> bool {
        [self.prompt, self.cached_prompt, self.completion]
            .iter()
            .all(|rate| rate.is_finite() && *rate >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_is_free() {
        assert_eq!(PricingTable::builtin().entry("gpt-99"), PricingEntry::default());
    }

    #[test]
    fn test_load_from_json() {
        let table = PricingTable::from_json_str(
            r#"{
                "version": "2025-09",
                "models": {
                    "gpt-5-mini": { "prompt": 2.5e-7, "cached_prompt": 2.5e-8, "completion": 2e-6 },
                    "gpt-4o": { "prompt": 5e-6, "completion": 1.5e-5 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(table.version.as_deref(), Some("2025-09"));
        assert_eq!(table.entry("gpt-5-mini").completion, 2e-6);
        assert_eq!(table.entry("gpt-4o").cached_prompt, 0.0);
        assert_eq!(table.entry("gpt-5-nano"), PricingEntry::default());
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(
            PricingTable::from_json_str("{ nope"),
            Err(LlmError::Config { .. })
        ));
        assert!(matches!(
            PricingTable::from_json_str(
                r#"{ "models": { "x": { "prompt": -1.0, "completion": 0.0 } } }"#
            ),
            Err(LlmError::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert!(matches!(
            PricingTable::from_path("/nonexistent/pricing.json"),
            Err(LlmError::Config { .. })
        ));
    }
}
