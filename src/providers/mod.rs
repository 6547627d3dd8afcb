use crate::core::error::BotError;
use crate::state::ResponseFormat;
use async_trait::async_trait;

pub mod anthropic;
pub mod base_client;
pub mod factory;
pub mod openai;

/// Outcome of the JSON structure check, carried on the reply for rendering
/// and observability. Only meaningful when the requested format was JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    NotApplicable,
    Valid,
    InvalidFallback,
}

/// One model answer, constructed per request/response cycle.
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// Raw text as returned by the provider.
    pub content: String,
    /// Human-readable label for UI rendering.
    pub model_display_name: String,
    /// Echoes what was requested, not necessarily what was produced.
    pub format_used: ResponseFormat,
    pub validation_status: ValidationStatus,
}

/// Uniform interface to a remote LLM behind the proxy endpoint.
///
/// Implementations select the request DTO shape and endpoint for their
/// backend; callers invoke them identically. One outbound call per
/// invocation, no retries at this layer.
#[async_trait]
pub trait ModelProvider: Send + Sync + std::fmt::Debug {
    /// Internal name used in logs (e.g. "gpt", "claude").
    fn name(&self) -> &str;

    /// Display name shown in chat footers and keyboards.
    fn display_name(&self) -> &str;

    /// Single-shot completion. The prompt arrives fully built; `json_mode`
    /// only echoes into the reply metadata.
    async fn generate(&self, prompt: &str, json_mode: bool) -> Result<ModelReply, BotError>;
}
