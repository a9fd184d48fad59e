//! Wire types for the legacy `chat/completions` API.

pub mod request;
pub mod response;

pub use request::{ChatMessage, Request};
pub use response::Response;
