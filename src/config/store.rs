use std::collections::HashMap;

use crate::provider::constants::openai;

/// Keys read from the host application's configuration store.
pub mod keys {
    pub const API_KEY: &str = "gpt_core.openapi_api_key";
    /// A model name, or the numeric id of a [`super::ModelCatalog`] entry.
    pub const MODEL: &str = "gpt_core.chatgpt_model";
    pub const TEMPERATURE: &str = "gpt_core.temperature";
    pub const MAX_TOKENS: &str = "gpt_core.max_tokens";
    pub const REASONING_EFFORT: &str = "gpt_core.reasoning_effort";
}

/// Read-only key/value configuration owned by the host application.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<String, String>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Configuration read from the process environment.
///
/// The API key comes from `OPENAI_API_KEY`; every other key maps to its
/// upper-snake form, e.g. `gpt_core.max_tokens` -> `GPT_CORE_MAX_TOKENS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl EnvConfig {
    pub fn variable_for(key: &str) -> String {
        if key == keys::API_KEY {
            openai::API_KEY_ENV_VAR.to_string()
        } else {
            key.replace('.', "_").to_ascii_uppercase()
        }
    }
}

impl ConfigStore for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::variable_for(key)).ok()
    }
}

/// Numeric model references as stored by the host's model catalog.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: HashMap<u64, String>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, id: u64, name: impl Into<String>) -> Self {
        self.entries.insert(id, name.into());
        self
    }

    pub fn name(&self, id: u64) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }
}
