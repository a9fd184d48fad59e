mod adapt;
pub mod capabilities;
pub(crate) mod constants;
pub(crate) mod openai;
pub mod schema;

pub use adapt::{UnsupportedParameter, classify_unsupported_parameter};
pub use capabilities::{ModelCapabilities, ModelPolicy};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use schema::{ApiRequest, ApiResponse, ApiSchema, CompletionRequest};
