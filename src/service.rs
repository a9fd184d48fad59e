//! Completion entry point: parameter resolution, the empty-output cascade,
//! and usage recording.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{
    self, ConfigStore, EffectiveParams, ModelCatalog, Overrides, StoredConfig, resolve_parameters,
};
use crate::core::{
    CompletionProvider, CompletionResult, Conversation, EmptyOutputDiagnostics, LlmError,
};
use crate::provider::{
    ApiRequest, ApiResponse, CompletionRequest, ModelPolicy, OpenAiClient, OpenAiConfig,
    classify_unsupported_parameter,
};
use crate::usage::{PricingTable, UsageAccountant, UsageSink};

/// Lower bound for the output budget on the empty-output retry.
pub const MIN_RETRY_OUTPUT_TOKENS: u32 = 128;

/// Whether a call that ends in [`LlmError::EmptyOutput`] leaves a usage record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureLogging {
    /// Only successful calls are recorded.
    #[default]
    Skip,
    /// Also record exhausted calls, with an empty response and the final
    /// attempt's diagnostics.
    Record,
}

pub struct GptService {
    provider: Arc<dyn CompletionProvider>,
    config: Arc<dyn ConfigStore>,
    catalog: ModelCatalog,
    accountant: UsageAccountant,
    policy: ModelPolicy,
    failure_logging: FailureLogging,
}

impl GptService {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        config: Arc<dyn ConfigStore>,
        sink: Arc<dyn UsageSink>,
    ) -> Self {
        Self {
            provider,
            config,
            catalog: ModelCatalog::default(),
            accountant: UsageAccountant::new(Arc::new(PricingTable::builtin()), sink),
            policy: ModelPolicy::default(),
            failure_logging: FailureLogging::default(),
        }
    }

    /// Service backed by [`OpenAiClient`].
    pub fn openai(
        openai_config: OpenAiConfig,
        config: Arc<dyn ConfigStore>,
        sink: Arc<dyn UsageSink>,
    ) -> Result<Self, LlmError> {
        let provider = OpenAiClient::new(openai_config)?;
        Ok(Self::new(Arc::new(provider), config, sink))
    }

    pub fn with_pricing(mut self, pricing: impl Into<Arc<PricingTable>>) -> Self {
        self.accountant = UsageAccountant::new(pricing.into(), self.accountant.sink().clone());
        self
    }

    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_policy(mut self, policy: ModelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_failure_logging(mut self, failure_logging: FailureLogging) -> Self {
        self.failure_logging = failure_logging;
        self
    }

    pub fn accountant(&self) -> &UsageAccountant {
        &self.accountant
    }

    /// Merge `overrides` over a fresh read of the stored configuration.
    pub fn resolve(&self, overrides: &Overrides) -> Result<EffectiveParams, LlmError> {
        let stored = StoredConfig::load(self.config.as_ref(), &self.catalog)?;
        Ok(resolve_parameters(overrides, &stored))
    }

    /// Complete `conversation` and return only the text.
    pub async fn chat_completion(
        &self,
        conversation: &Conversation,
        overrides: &Overrides,
    ) -> Result<String, LlmError> {
        let params = self.resolve(overrides)?;
        let result = self.complete(conversation, &params).await?;
        Ok(result.text)
    }

    /// Run the full attempt sequence for `conversation`.
    ///
    /// At most three sequential attempts: the initial call, one retry with a
    /// budget of at least [`MIN_RETRY_OUTPUT_TOKENS`], and, for the cheapest
    /// tier only, one call to the fallback model. Exactly one usage record is
    /// written on success.
    #[tracing::instrument(
        name = "complete",
        skip(self, conversation, params),
        fields(model = %params.model, max_output_tokens = params.max_output_tokens),
        err
    )]
    pub async fn complete(
        &self,
        conversation: &Conversation,
        params: &EffectiveParams,
    ) -> Result<CompletionResult, LlmError> {
        let api_key = config::api_key(self.config.as_ref())?;

        let mut request = ApiRequest::build(
            conversation,
            &CompletionRequest::new(
                &params.model,
                params.temperature,
                params.max_output_tokens,
                params.reasoning_effort,
            ),
        );
        let mut attempts = 1;
        let mut used_retry = false;
        let mut used_fallback = false;

        let mut response = self.attempt(&api_key, &mut request).await?;

        if is_blank(&response) {
            used_retry = true;
            attempts += 1;
            let retry_tokens = params.max_output_tokens.max(MIN_RETRY_OUTPUT_TOKENS);
            warn!(
                model = %request.model(),
                status = ?response.status(),
                incomplete_reason = ?response.incomplete_reason(),
                retry_tokens,
                "Empty output, retrying"
            );

            request.set_max_output_tokens(retry_tokens);
            response = self.attempt(&api_key, &mut request).await?;

            if is_blank(&response)
                && let Some(fallback) = self.policy.fallback_for(request.model())
            {
                used_fallback = true;
                attempts += 1;
                info!(from = %request.model(), to = %fallback, "Empty output again, falling back");

                request = ApiRequest::build(
                    conversation,
                    &CompletionRequest::new(
                        fallback,
                        params.temperature,
                        retry_tokens,
                        params.reasoning_effort,
                    ),
                );
                response = self.attempt(&api_key, &mut request).await?;
            }
        }

        let usage = response.usage();
        let text = response.text();

        if text.trim().is_empty() {
            let diagnostics = EmptyOutputDiagnostics {
                status: response.status(),
                incomplete_reason: response.incomplete_reason(),
                usage,
                max_output_tokens: request.max_output_tokens(),
                model: request.model().to_string(),
                temperature: request.temperature(),
                attempts,
                used_retry,
                used_fallback,
            };
            warn!(
                model = %diagnostics.model,
                status = ?diagnostics.status,
                incomplete_reason = ?diagnostics.incomplete_reason,
                input_tokens = diagnostics.usage.input_tokens,
                output_tokens = diagnostics.usage.output_tokens,
                reasoning_tokens = diagnostics.usage.reasoning_tokens,
                max_output_tokens = diagnostics.max_output_tokens,
                attempts,
                "Empty output after all attempts"
            );

            if self.failure_logging == FailureLogging::Record
                && let Err(e) = self.accountant.record_failure(conversation, &diagnostics).await
            {
                warn!(error = %e, ?diagnostics, "Failed to record empty-output usage");
            }

            return Err(LlmError::EmptyOutput(Box::new(diagnostics)));
        }

        let result = CompletionResult {
            text,
            usage,
            status: response.status(),
            incomplete_reason: response.incomplete_reason(),
            used_retry,
            used_fallback,
            effective_model: request.model().to_string(),
            effective_max_tokens: request.max_output_tokens(),
            temperature: request.temperature(),
        };
        debug!(
            model = %result.effective_model,
            total_tokens = result.usage.total_tokens,
            used_retry,
            used_fallback,
            "Completion succeeded"
        );

        self.accountant.record_usage(conversation, &result).await?;
        Ok(result)
    }

    /// Send `request`, adapting it once if the provider rejects a parameter.
    /// The adaptation stays on `request` for any later attempt.
    async fn attempt(
        &self,
        api_key: &str,
        request: &mut ApiRequest,
    ) -> Result<ApiResponse, LlmError> {
        match self.provider.send(api_key, request).await {
            Ok(response) => Ok(response),
            Err(error) => {
                let parameters = classify_unsupported_parameter(&error);
                let mut adapted = false;
                for parameter in &parameters {
                    adapted |= request.adapt(*parameter);
                }

                if !adapted {
                    return Err(error);
                }

                info!(
                    error = %error,
                    ?parameters,
                    model = %request.model(),
                    "Adjusted unsupported parameter"
                );
                self.provider
                    .send(api_key, request)
                    .await
                    .map_err(still_unsupported)
            }
        }
    }
}

fn is_blank(response: &ApiResponse) -> bool {
    response.text().trim().is_empty()
}

/// A rejection of the already adapted request surfaces as
/// [`LlmError::UnsupportedParameter`]; anything else passes through.
fn still_unsupported(error: LlmError) -> LlmError {
    let Some(parameter) = classify_unsupported_parameter(&error).first().copied() else {
        return error;
    };

    match error {
        LlmError::Api { message, .. } => LlmError::UnsupportedParameter {
            parameter: parameter.name().to_string(),
            message,
        },
        other => other,
    }
}
