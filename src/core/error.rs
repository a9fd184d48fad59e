use thiserror::Error;

use super::types::UsageCounters;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Missing API key: set `{key}` in the configuration store")]
    MissingCredential { key: String },

    #[error("Provider configuration error: {0}")]
    ProviderConfiguration(String),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The provider rejected a request parameter. Recovered locally by
    /// adapting the request; only surfaces if the adapted request fails again.
    #[error("Unsupported parameter `{parameter}`: {message}")]
    UnsupportedParameter { parameter: String, message: String },

    #[error("Empty output from `{}` after {} attempt(s)", .0.model, .0.attempts)]
    EmptyOutput(Box<EmptyOutputDiagnostics>),

    #[error("Usage sink error: {message}")]
    Sink {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

/// State of the final attempt when the empty-output cascade gives up.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyOutputDiagnostics {
    pub status: Option<String>,
    pub incomplete_reason: Option<String>,
    pub usage: UsageCounters,
    /// Budget sent on the final attempt.
    pub max_output_tokens: u32,
    /// Model used on the final attempt, after any fallback.
    pub model: String,
    pub temperature: Option<f32>,
    pub attempts: u32,
    pub used_retry: bool,
    pub used_fallback: bool,
}

impl LlmError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        LlmError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Diagnostics attached to an [`LlmError::EmptyOutput`].
    pub fn diagnostics(&self) -> Option<&EmptyOutputDiagnostics> {
        match self {
            LlmError::EmptyOutput(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}
