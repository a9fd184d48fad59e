pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use error::{EmptyOutputDiagnostics, LlmError};
pub use http::{HttpClient, HttpClientConfig, InspectorConfig};
pub use traits::CompletionProvider;
pub use types::{
    ChatRole, CompletionResult, ContentPart, Conversation, Message, MessageContent,
    ReasoningEffort, UsageCounters,
};
