use async_trait::async_trait;

use super::error::LlmError;
use crate::provider::{ApiRequest, ApiResponse};

/// A hosted completion endpoint that accepts either request schema.
///
/// Implemented by [`crate::provider::OpenAiClient`]; tests substitute scripted
/// stubs.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn send(&self, api_key: &str, request: &ApiRequest) -> Result<ApiResponse, LlmError>;
}
