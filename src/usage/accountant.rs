use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{CompletionResult, Conversation, EmptyOutputDiagnostics, LlmError, UsageCounters};

use super::pricing::PricingTable;
use super::sink::UsageSink;

pub const CURRENCY: &str = "USD";

/// Approximate USD cost of one call. Linear in every counter, unrounded, and
/// zero for models missing from `pricing`.
pub fn compute_cost(pricing: &PricingTable, model: &str, usage: &UsageCounters) -> f64 {
    let rate = pricing.entry(model);
    usage.input_tokens as f64 * rate.prompt
        + usage.cached_input_tokens as f64 * rate.cached_prompt
        + usage.output_tokens as f64 * rate.completion
}

/// One persisted usage entry. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLogRecord {
    pub model: String,
    pub status: Option<String>,
    pub incomplete_reason: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub total_tokens: u64,
    pub max_output_tokens: u32,
    pub temperature: Option<f32>,
    pub cost: f64,
    pub currency: String,
    pub prompt: String,
    pub response: String,
    pub used_retry: bool,
    pub used_fallback: bool,
}

struct Outcome<'a> {
    model: &'a str,
    usage: &'a UsageCounters,
    status: Option<&'a str>,
    incomplete_reason: Option<&'a str>,
    max_output_tokens: u32,
    temperature: Option<f32>,
    response: &'a str,
    used_retry: bool,
    used_fallback: bool,
}

/// Prices completed calls and writes their records to a [`UsageSink`].
#[derive(Clone)]
pub struct UsageAccountant {
    pricing: Arc<PricingTable>,
    sink: Arc<dyn UsageSink>,
}

impl UsageAccountant {
    pub fn new(pricing: Arc<PricingTable>, sink: Arc<dyn UsageSink>) -> Self {
        Self { pricing, sink }
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn sink(&self) -> &Arc<dyn UsageSink> {
        &self.sink
    }

    pub fn compute_cost(&self, model: &str, usage: &UsageCounters) -> f64 {
        compute_cost(&self.pricing, model, usage)
    }

    fn build_record(&self, conversation: &Conversation, outcome: Outcome<'_>) -> UsageLogRecord {
        UsageLogRecord {
            model: outcome.model.to_string(),
            status: outcome.status.map(str::to_string),
            incomplete_reason: outcome.incomplete_reason.map(str::to_string),
            input_tokens: outcome.usage.input_tokens,
            output_tokens: outcome.usage.output_tokens,
            reasoning_tokens: outcome.usage.reasoning_tokens,
            total_tokens: outcome.usage.total_tokens,
            max_output_tokens: outcome.max_output_tokens,
            temperature: outcome.temperature,
            cost: self.compute_cost(outcome.model, outcome.usage),
            currency: CURRENCY.to_string(),
            prompt: conversation.prompt(),
            response: outcome.response.to_string(),
            used_retry: outcome.used_retry,
            used_fallback: outcome.used_fallback,
        }
    }

    /// Record a successful completion, priced against the model that
    /// actually produced it.
    pub async fn record_usage(
        &self,
        conversation: &Conversation,
        result: &CompletionResult,
    ) -> Result<UsageLogRecord, LlmError> {
        let record = self.build_record(
            conversation,
            Outcome {
                model: &result.effective_model,
                usage: &result.usage,
                status: result.status.as_deref(),
                incomplete_reason: result.incomplete_reason.as_deref(),
                max_output_tokens: result.effective_max_tokens,
                temperature: result.temperature,
                response: &result.text,
                used_retry: result.used_retry,
                used_fallback: result.used_fallback,
            },
        );
        self.sink.append(record.clone()).await?;
        Ok(record)
    }

    /// Record a call that exhausted every attempt without output.
    pub async fn record_failure(
        &self,
        conversation: &Conversation,
        diagnostics: &EmptyOutputDiagnostics,
    ) -> Result<UsageLogRecord, LlmError> {
        let record = self.build_record(
            conversation,
            Outcome {
                model: &diagnostics.model,
                usage: &diagnostics.usage,
                status: diagnostics.status.as_deref(),
                incomplete_reason: diagnostics.incomplete_reason.as_deref(),
                max_output_tokens: diagnostics.max_output_tokens,
                temperature: diagnostics.temperature,
                response: "",
                used_retry: diagnostics.used_retry,
                used_fallback: diagnostics.used_fallback,
            },
        );
        self.sink.append(record.clone()).await?;
        Ok(record)
    }
}
