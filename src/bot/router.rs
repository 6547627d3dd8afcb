use crate::features::chat::{ChatFeature, FORMAT_CALLBACK_PREFIX, MODEL_CALLBACK_PREFIX};
use crate::features::OutgoingPayload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, user_id: i64, args: &[&str]) -> OutgoingPayload;
    fn help(&self) -> &'static str;
}

/// Maps chat commands ("/start", "/menu", ...) to their handlers.
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: CommandHandler + 'static>(&mut self, name: &str, handler: C) {
        self.handlers.insert(name.to_string(), Arc::new(handler));
    }

    /// Returns `None` for unregistered commands; the caller renders the
    /// rejection.
    pub async fn execute(&self, name: &str, user_id: i64, args: &[&str]) -> Option<OutgoingPayload> {
        let handler = self.handlers.get(name)?;
        Some(handler.execute(user_id, args).await)
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

pub struct StartCommand {
    pub feature: Arc<ChatFeature>,
}

pub struct MenuCommand {
    pub feature: Arc<ChatFeature>,
}

pub struct FormatCommand {
    pub feature: Arc<ChatFeature>,
}

pub struct HelpCommand;

#[async_trait]
impl CommandHandler for StartCommand {
    async fn execute(&self, user_id: i64, _args: &[&str]) -> OutgoingPayload {
        self.feature.welcome(user_id)
    }

    fn help(&self) -> &'static str {
        Self::HELP
    }
}

#[async_trait]
impl CommandHandler for MenuCommand {
    async fn execute(&self, _user_id: i64, _args: &[&str]) -> OutgoingPayload {
        self.feature.menu()
    }

    fn help(&self) -> &'static str {
        Self::HELP
    }
}

#[async_trait]
impl CommandHandler for FormatCommand {
    async fn execute(&self, user_id: i64, args: &[&str]) -> OutgoingPayload {
        // "/format json" switches directly; bare "/format" shows the menu.
        match args.first() {
            Some(format_id) => self.feature.handle_format_switch(user_id, format_id),
            None => self.feature.format_menu(user_id),
        }
    }

    fn help(&self) -> &'static str {
        Self::HELP
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn execute(&self, _user_id: i64, _args: &[&str]) -> OutgoingPayload {
        let help_text = [
            "Available commands:",
            StartCommand::HELP,
            MenuCommand::HELP,
            FormatCommand::HELP,
            HelpCommand::HELP,
        ]
        .join("\n");
        OutgoingPayload::text(help_text)
    }

    fn help(&self) -> &'static str {
        Self::HELP
    }
}

impl StartCommand {
    const HELP: &'static str = "/start - Welcome message and model selection";
}

impl MenuCommand {
    const HELP: &'static str = "/menu - Bring the model keyboard back";
}

impl FormatCommand {
    const HELP: &'static str = "/format [text|json] - Show or switch the answer format";
}

impl HelpCommand {
    const HELP: &'static str = "/help - Show available commands";
}

pub fn default_registry(feature: Arc<ChatFeature>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register(
        "start",
        StartCommand {
            feature: Arc::clone(&feature),
        },
    );
    registry.register(
        "menu",
        MenuCommand {
            feature: Arc::clone(&feature),
        },
    );
    registry.register("format", FormatCommand { feature });
    registry.register("help", HelpCommand);

    registry
}

/// Routes an inline-button press by callback id prefix.
pub fn route_callback(feature: &ChatFeature, user_id: i64, data: &str) -> OutgoingPayload {
    if let Some(model_id) = data.strip_prefix(MODEL_CALLBACK_PREFIX) {
        feature.handle_model_switch(user_id, model_id)
    } else if let Some(format_id) = data.strip_prefix(FORMAT_CALLBACK_PREFIX) {
        feature.handle_format_switch(user_id, format_id)
    } else {
        warn!(user_id, data, "unknown callback id");
        OutgoingPayload::text("❌ Unknown action")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelId;
    use crate::core::error::BotError;
    use crate::providers::{ModelProvider, ModelReply};
    use crate::state::{ResponseFormat, UserStateStore};

    #[derive(Debug)]
    struct StubProvider;

    #[async_trait]
    impl ModelProvider for StubProvider {
        fn name(&self) -> &str {
            "gpt"
        }

        fn display_name(&self) -> &str {
            "GPT-4o Mini"
        }

        async fn generate(&self, _prompt: &str, _json_mode: bool) -> Result<ModelReply, BotError> {
            Err(BotError::ProviderUnavailable("stub".to_string()))
        }
    }

    fn feature() -> Arc<ChatFeature> {
        let providers: Vec<(ModelId, Arc<dyn ModelProvider>)> =
            vec![(ModelId::Gpt, Arc::new(StubProvider))];
        let store = Arc::new(UserStateStore::new(vec![ModelId::Gpt], ModelId::Gpt));
        Arc::new(ChatFeature::new(providers, store))
    }

    #[tokio::test]
    async fn start_command_returns_welcome() {
        let registry = default_registry(feature());
        let payload = registry.execute("start", 1, &[]).await.unwrap();
        assert!(payload.text.contains("GPT-4o Mini"));
        assert!(!payload.controls.is_empty());
    }

    #[tokio::test]
    async fn unknown_command_is_none() {
        let registry = default_registry(feature());
        assert!(registry.execute("frobnicate", 1, &[]).await.is_none());
        assert!(!registry.has("frobnicate"));
        assert!(registry.has("format"));
    }

    #[tokio::test]
    async fn format_command_with_argument_switches_directly() {
        let feature = feature();
        let registry = default_registry(Arc::clone(&feature));
        let payload = registry.execute("format", 1, &["json"]).await.unwrap();
        assert!(payload.text.contains("JSON format selected"));

        let menu = registry.execute("format", 1, &[]).await.unwrap();
        assert!(menu.text.contains("JSON"));
    }

    #[test]
    fn callbacks_route_by_prefix() {
        let feature = feature();

        let payload = route_callback(&feature, 1, "format_json");
        assert!(payload.text.contains("JSON format selected"));

        let payload = route_callback(&feature, 1, "llm_gpt");
        assert!(payload.text.contains("GPT-4o Mini"));

        let payload = route_callback(&feature, 1, "noise");
        assert!(payload.text.contains("Unknown action"));
    }

    #[test]
    fn rejected_callback_leaves_format_unchanged() {
        let feature = feature();
        route_callback(&feature, 1, "format_yaml");
        let menu = feature.format_menu(1);
        assert!(menu.text.contains("text"));
        assert_eq!(
            ResponseFormat::from_str("yaml"),
            None,
        );
    }
}
