//! Shared HTTP transport for both completion schemas.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::error::LlmError;

/// Configuration for the HTTP transport.
///
/// `timeout` bounds every single attempt, so a stalled provider fails the call
/// instead of hanging it. Transport-level retries only cover 429 and 5xx
/// responses and are off by default; empty-output retries are handled by the
/// service, not here.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    /// Base duration for exponential backoff
    pub initial_retry_delay: Duration,
    /// Cap on the backoff duration
    pub max_retry_delay: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 0,
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(10),
        }
    }
}

pub type Inspector = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Hooks that observe raw request and response bodies.
#[derive(Clone, Default)]
pub struct InspectorConfig {
    pub request_inspector: Option<Inspector>,
    pub response_inspector: Option<Inspector>,
}

impl InspectorConfig {
    pub fn on_request(mut self, f: impl Fn(&serde_json::Value) + Send + Sync + 'static) -> Self {
        self.request_inspector = Some(Arc::new(f));
        self
    }

    pub fn on_response(mut self, f: impl Fn(&serde_json::Value) + Send + Sync + 'static) -> Self {
        self.response_inspector = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for InspectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InspectorConfig")
            .field("request_inspector", &self.request_inspector.is_some())
            .field("response_inspector", &self.response_inspector.is_some())
            .finish()
    }
}

/// HTTP client with optional retry and exponential backoff.
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
    inspector_config: Option<InspectorConfig>,
}

impl HttpClient {
    pub fn new(
        config: HttpClientConfig,
        user_agent: Option<&str>,
        inspector_config: Option<InspectorConfig>,
    ) -> Result<Self, LlmError> {
        let default_ua = format!("gpt-core/{}", env!("CARGO_PKG_VERSION"));
        let ua = user_agent.unwrap_or(&default_ua);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(ua)
            .build()
            .map_err(|e| {
                LlmError::ProviderConfiguration(format!("Failed to build reqwest client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            inspector_config,
        })
    }

    fn inspect_request(&self, value: &serde_json::Value) {
        if let Some(inspector) = self
            .inspector_config
            .as_ref()
            .and_then(|config| config.request_inspector.as_ref())
        {
            inspector(value);
        }
    }

    fn inspect_response(&self, value: &serde_json::Value) {
        if let Some(inspector) = self
            .inspector_config
            .as_ref()
            .and_then(|config| config.response_inspector.as_ref())
        {
            inspector(value);
        }
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// Non-success statuses become [`LlmError::Api`] carrying the provider's
    /// error message, so callers can classify rejected parameters.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, headers, body),
        fields(url = %url),
        err
    )]
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<Res, LlmError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let body_value = serde_json::to_value(body).map_err(|e| LlmError::Parse {
            message: "Failed to serialize request".to_string(),
            source: Box::new(e),
        })?;

        self.inspect_request(&body_value);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.config.max_retries {
            let mut req_builder = self.client.post(url).json(&body_value);
            for (name, value) in headers {
                req_builder = req_builder.header(name, value);
            }

            match req_builder.send().await {
                Err(e) => {
                    warn!(attempt, error = %e, "HTTP request failed");
                    last_error = Some(LlmError::Network {
                        message: format!(
                            "Request failed (attempt {}/{})",
                            attempt + 1,
                            self.config.max_retries + 1
                        ),
                        source: Box::new(e),
                    });
                }
                Ok(res) => {
                    let status = res.status();

                    if status.is_success() {
                        debug!(status = %status, "HTTP request successful");

                        let response_text = res.text().await.map_err(|e| LlmError::Parse {
                            message: "Failed to read response body".to_string(),
                            source: Box::new(e),
                        })?;

                        let response_value: serde_json::Value =
                            serde_json::from_str(&response_text).map_err(|e| LlmError::Parse {
                                message: "Failed to parse response as JSON".to_string(),
                                source: Box::new(e),
                            })?;

                        debug!(response = %response_value, "Raw response");
                        self.inspect_response(&response_value);

                        return serde_json::from_value(response_value).map_err(|e| {
                            LlmError::Parse {
                                message: "Failed to parse API response".to_string(),
                                source: Box::new(e),
                            }
                        });
                    }

                    warn!(attempt, status = %status, "API returned error status");

                    let is_retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error();
                    let error_text = res
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error_value = serde_json::from_str(&error_text).unwrap_or_else(|_| {
                        serde_json::json!({
                            "error": error_text,
                            "status_code": status.as_u16()
                        })
                    });
                    self.inspect_response(&error_value);

                    let error = LlmError::Api {
                        message: provider_error_message(&error_value, &error_text),
                        status_code: Some(status.as_u16()),
                        source: None,
                    };

                    if !is_retryable {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
            }

            if attempt < self.config.max_retries {
                tokio::time::sleep(self.backoff_delay(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Api {
            message: format!(
                "Request failed after {} attempt(s) with unknown error",
                self.config.max_retries + 1
            ),
            status_code: None,
            source: None,
        }))
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_delay =
            self.config.initial_retry_delay.as_millis() as f64 * 2_f64.powi(attempt as i32);

        // +/- 10% jitter
        let jitter_factor = rand::random::<f64>() * 0.2 + 0.9;
        let delay_ms = (base_delay * jitter_factor) as u64;

        Duration::from_millis(delay_ms).min(self.config.max_retry_delay)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the raw text.
fn provider_error_message(value: &serde_json::Value, raw: &str) -> String {
    value
        .get("error")
        .and_then(|error| error.get("message").or(Some(error)))
        .and_then(|message| message.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}
