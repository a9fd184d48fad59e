//! Host configuration access and parameter resolution.

mod params;
mod store;

pub use params::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_REASONING_EFFORT, DEFAULT_TEMPERATURE,
    EffectiveParams, Overrides, StoredConfig, api_key, resolve_parameters,
};
pub use store::{ConfigStore, EnvConfig, MemoryConfig, ModelCatalog, keys};
