//! # gpt-core
//!
//! One entry point for text completions against OpenAI models, whichever
//! request schema the model speaks.
//!
//! Reasoning-tier models (`gpt-5*`, `o1`, `o3`, `o4`) go through `/responses`;
//! everything else goes through `/chat/completions`. Responses of either shape
//! are normalized to plain text plus token counters. Empty answers are retried
//! with a larger budget, and the cheapest tier escalates once to the next
//! model up. Every successful call leaves one priced usage record.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gpt_core::{
//!     Conversation, EnvConfig, GptService, Message, MemoryUsageSink, OpenAiConfig, Overrides,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = GptService::openai(
//!         OpenAiConfig::default(),
//!         Arc::new(EnvConfig),
//!         Arc::new(MemoryUsageSink::new()),
//!     )?;
//!
//!     let conversation = Conversation::new(vec![
//!         Message::system("Answer in one sentence."),
//!         Message::user("What is a borrow checker?"),
//!     ]);
//!     let text = service
//!         .chat_completion(&conversation, &Overrides::new().model("gpt-5-mini"))
//!         .await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```

pub mod completions;
pub mod config;
pub mod core;
pub mod provider;
pub mod responses;
pub mod service;
pub mod usage;

pub use config::{ConfigStore, EffectiveParams, EnvConfig, MemoryConfig, ModelCatalog, Overrides};
pub use core::{
    ChatRole, CompletionProvider, CompletionResult, ContentPart, Conversation,
    EmptyOutputDiagnostics, LlmError, Message, MessageContent, ReasoningEffort, UsageCounters,
};
pub use provider::{ModelPolicy, OpenAiClient, OpenAiConfig};
pub use service::{FailureLogging, GptService};
pub use usage::{
    JsonlUsageSink, MemoryUsageSink, PricingEntry, PricingTable, UsageAccountant, UsageLogRecord,
    UsageSink,
};
