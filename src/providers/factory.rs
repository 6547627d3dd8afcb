use crate::config::{Config, ModelId};
use crate::core::error::BotError;
use crate::providers::{anthropic::AnthropicProvider, openai::OpenAiProvider, ModelProvider};
use std::collections::HashMap;
use std::sync::Arc;

type ProviderCreator =
    Box<dyn Fn(&Config) -> Result<Arc<dyn ModelProvider>, BotError> + Send + Sync>;

/// Builds provider adapters from the config, one creator per registered model.
pub struct ProviderFactory {
    creators: HashMap<ModelId, ProviderCreator>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators = HashMap::new();

        creators.insert(
            ModelId::Gpt,
            Box::new(|config: &Config| {
                let settings = config.provider(ModelId::Gpt)?;
                let provider = OpenAiProvider::new(
                    &config.proxyapi_api_key,
                    settings,
                    config.request_timeout(),
                );
                Ok(Arc::new(provider) as Arc<dyn ModelProvider>)
            }) as ProviderCreator,
        );

        creators.insert(
            ModelId::Claude,
            Box::new(|config: &Config| {
                let settings = config.provider(ModelId::Claude)?;
                let provider = AnthropicProvider::new(
                    &config.proxyapi_api_key,
                    settings,
                    config.request_timeout(),
                );
                Ok(Arc::new(provider) as Arc<dyn ModelProvider>)
            }) as ProviderCreator,
        );

        Self { creators }
    }

    pub fn create(
        &self,
        model: ModelId,
        config: &Config,
    ) -> Result<Arc<dyn ModelProvider>, BotError> {
        self.creators
            .get(&model)
            .ok_or_else(|| BotError::InvalidModel(model.as_str().to_string()))
            .and_then(|creator| creator(config))
    }

    /// Instantiates every registered model in registration order.
    pub fn create_all(
        &self,
        config: &Config,
    ) -> Result<Vec<(ModelId, Arc<dyn ModelProvider>)>, BotError> {
        ModelId::all()
            .into_iter()
            .map(|model| Ok((model, self.create(model, config)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.telegram_bot_token = "123:abc".to_string();
        config.proxyapi_api_key = "sk-test".to_string();
        config
    }

    #[test]
    fn creates_every_registered_model() {
        let factory = ProviderFactory::new();
        let providers = factory.create_all(&config()).unwrap();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].0, ModelId::Gpt);
        assert_eq!(providers[0].1.display_name(), "GPT-4o Mini");
        assert_eq!(providers[1].0, ModelId::Claude);
        assert_eq!(providers[1].1.display_name(), "Claude 3.5 Haiku");
    }

    #[test]
    fn display_names_follow_config() {
        let mut config = config();
        if let Some(settings) = config.providers.get_mut(&ModelId::Gpt) {
            settings.display_name = "Custom GPT".to_string();
        }
        let factory = ProviderFactory::new();
        let provider = factory.create(ModelId::Gpt, &config).unwrap();
        assert_eq!(provider.display_name(), "Custom GPT");
    }

    #[test]
    fn missing_settings_is_a_config_error() {
        let mut config = config();
        config.providers.remove(&ModelId::Claude);
        let factory = ProviderFactory::new();
        let err = factory.create(ModelId::Claude, &config).unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }
}
