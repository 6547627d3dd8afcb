use crate::config::ModelId;
use crate::core::error::BotError;
use crate::envelope::{self, ValidationResult};
use crate::features::{InlineControl, OutgoingPayload};
use crate::providers::{ModelProvider, ModelReply, ValidationStatus};
use crate::state::{ResponseFormat, UserStateStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Callback id prefix for model-switch buttons ("llm_gpt", "llm_claude").
pub const MODEL_CALLBACK_PREFIX: &str = "llm_";
/// Callback id prefix for format-switch buttons ("format_text", "format_json").
pub const FORMAT_CALLBACK_PREFIX: &str = "format_";

/// Orchestrates the per-message pipeline: resolve user state, build the
/// prompt, call the selected provider, validate JSON replies and render the
/// outgoing payload. Also serves the model/format switch commands.
pub struct ChatFeature {
    providers: Vec<(ModelId, Arc<dyn ModelProvider>)>,
    store: Arc<UserStateStore>,
}

impl ChatFeature {
    pub fn new(providers: Vec<(ModelId, Arc<dyn ModelProvider>)>, store: Arc<UserStateStore>) -> Self {
        Self { providers, store }
    }

    fn provider(&self, model: ModelId) -> Option<&Arc<dyn ModelProvider>> {
        self.providers
            .iter()
            .find(|(id, _)| *id == model)
            .map(|(_, provider)| provider)
    }

    fn display_name(&self, model: ModelId) -> &str {
        self.provider(model)
            .map(|provider| provider.display_name())
            .unwrap_or_else(|| model.as_str())
    }

    /// One button per registered model, in registration order.
    fn model_controls(&self) -> Vec<InlineControl> {
        self.providers
            .iter()
            .map(|(model, provider)| {
                InlineControl::new(
                    provider.display_name(),
                    format!("{}{}", MODEL_CALLBACK_PREFIX, model.as_str()),
                )
            })
            .collect()
    }

    fn format_controls() -> Vec<InlineControl> {
        vec![
            InlineControl::new(
                "📄 Text format",
                format!("{}{}", FORMAT_CALLBACK_PREFIX, ResponseFormat::Text.as_str()),
            ),
            InlineControl::new(
                "📋 JSON format",
                format!("{}{}", FORMAT_CALLBACK_PREFIX, ResponseFormat::Json.as_str()),
            ),
        ]
    }

    fn reply_controls(&self) -> Vec<InlineControl> {
        let mut controls = self.model_controls();
        controls.extend(Self::format_controls());
        controls
    }

    /// Core pipeline for one user message. Only the provider call awaits.
    pub async fn complete(&self, user_id: i64, text: &str) -> Result<ModelReply, BotError> {
        let state = self.store.state(user_id);
        let provider = self
            .provider(state.selected_model)
            .ok_or_else(|| BotError::InvalidModel(state.selected_model.as_str().to_string()))?;

        let json_mode = state.response_format == ResponseFormat::Json;
        let prompt = if json_mode {
            envelope::format_prompt_for_json(text)
        } else {
            text.to_string()
        };

        info!(user_id, model = %provider.display_name(), json_mode, "generating response");
        let mut reply = provider.generate(&prompt, json_mode).await?;

        if json_mode {
            match envelope::validate_json_response(&reply.content) {
                ValidationResult::Valid(_) => reply.validation_status = ValidationStatus::Valid,
                ValidationResult::Invalid(reason) => {
                    // Availability over structure: the raw answer still goes out.
                    warn!(user_id, %reason, "model reply failed JSON validation, delivering raw content");
                    reply.validation_status = ValidationStatus::InvalidFallback;
                }
            }
        }

        Ok(reply)
    }

    /// Full message handling: never fails, provider errors render as
    /// user-visible error payloads.
    pub async fn handle_message(&self, user_id: i64, text: &str) -> OutgoingPayload {
        match self.complete(user_id, text).await {
            Ok(reply) => self.render_reply(&reply),
            Err(err) => {
                error!(user_id, error = %err, "failed to generate response");
                OutgoingPayload::with_controls(user_error_text(&err), self.model_controls())
            }
        }
    }

    fn render_reply(&self, reply: &ModelReply) -> OutgoingPayload {
        let mut text = format!(
            "{}\n\n---\n🤖 Model: {}",
            reply.content, reply.model_display_name
        );
        if reply.validation_status == ValidationStatus::InvalidFallback {
            text.push_str(
                "\n⚠️ JSON format was requested but the model did not return valid JSON; showing the raw answer.",
            );
        }
        OutgoingPayload::with_controls(text, self.reply_controls())
    }

    /// `/start`: initializes default state and offers the model keyboard.
    pub fn welcome(&self, user_id: i64) -> OutgoingPayload {
        let state = self.store.state(user_id);
        let text = format!(
            "👋 Hi! I am an AI assistant with multi-model support.\n\n\
             Current model: {}\n\n\
             📝 How to use:\n\
             1. Pick a model with the buttons below\n\
             2. Just send your question\n\
             3. The bot answers using the selected model\n\n\
             Use /menu to bring the model keyboard back and /format to switch \
             between text and JSON answers.",
            self.display_name(state.selected_model)
        );
        OutgoingPayload::with_controls(text, self.model_controls())
    }

    /// `/menu`: re-sends the model selection keyboard.
    pub fn menu(&self) -> OutgoingPayload {
        OutgoingPayload::with_controls(
            "🔄 Menu restored\n\nPick a model to chat with:",
            self.model_controls(),
        )
    }

    /// `/format`: shows the current format with toggle buttons.
    pub fn format_menu(&self, user_id: i64) -> OutgoingPayload {
        let state = self.store.state(user_id);
        let (emoji, name) = match state.response_format {
            ResponseFormat::Text => ("📄", "text"),
            ResponseFormat::Json => ("📋", "JSON"),
        };
        OutgoingPayload::with_controls(
            format!("{} Current format: {}\n\nPick a format for the answers:", emoji, name),
            Self::format_controls(),
        )
    }

    /// Model-switch command/callback; invalid ids leave state unchanged.
    pub fn handle_model_switch(&self, user_id: i64, model_id: &str) -> OutgoingPayload {
        let Some(model) = ModelId::from_str(model_id) else {
            let err = BotError::InvalidModel(model_id.to_string());
            warn!(user_id, error = %err, "model switch rejected");
            return OutgoingPayload::text(format!("❌ Unknown model: '{}'", model_id));
        };

        match self.store.set_model(user_id, model) {
            Ok(()) => {
                info!(user_id, model = model.as_str(), "model switched");
                OutgoingPayload::text(format!(
                    "✅ Selected model: {}\n\nSend your question!",
                    self.display_name(model)
                ))
            }
            Err(err) => {
                warn!(user_id, model = model_id, error = %err, "model switch rejected");
                OutgoingPayload::text(format!("❌ Unknown model: '{}'", model_id))
            }
        }
    }

    /// Format-switch command/callback; invalid ids leave state unchanged.
    pub fn handle_format_switch(&self, user_id: i64, format_id: &str) -> OutgoingPayload {
        let Some(format) = ResponseFormat::from_str(format_id) else {
            let err = BotError::InvalidFormat(format_id.to_string());
            warn!(user_id, error = %err, "format switch rejected");
            return OutgoingPayload::text(format!("❌ Unknown format: '{}'", format_id));
        };

        self.store.set_format(user_id, format);
        info!(user_id, format = format.as_str(), "format switched");

        match format {
            ResponseFormat::Text => OutgoingPayload::text(
                "✅ Text format selected.\n\nAll following answers will be plain text.",
            ),
            ResponseFormat::Json => OutgoingPayload::text(
                "✅ JSON format selected.\n\nAll following answers will be JSON, for example:\n\
                 {\"status\": \"success\", \"data\": {\"content\": \"Answer text\"}, \"error\": null}",
            ),
        }
    }
}

fn user_error_text(err: &BotError) -> String {
    match err {
        BotError::ProviderUnavailable(_) => {
            "❌ The model is not responding right now.\n\nPlease try again later.".to_string()
        }
        BotError::ProviderError { status, .. } => format!(
            "❌ The model provider returned an error (status {}).\n\nPlease try again later or pick another model.",
            status
        ),
        BotError::MalformedResponse(_) => {
            "❌ The model provider returned an unexpected answer.\n\nPlease try again later or pick another model."
                .to_string()
        }
        _ => "❌ Something went wrong while generating the answer.\n\nPlease try again later.".to_string(),
    }
}
