use crate::core::error::BotError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    Gpt,
    Claude,
}

impl ModelId {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gpt" => Some(ModelId::Gpt),
            "claude" => Some(ModelId::Claude),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt => "gpt",
            ModelId::Claude => "claude",
        }
    }

    /// Registration order; the first entry is the default model for new users.
    pub fn all() -> [ModelId; 2] {
        [ModelId::Gpt, ModelId::Claude]
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::Gpt
    }
}

/// Per-model settings for one proxy endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderSettings {
    pub proxy_url: String,
    pub model: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram_bot_token: String,
    #[serde(default)]
    pub proxyapi_api_key: String,
    #[serde(default)]
    pub default_model: ModelId,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_providers")]
    pub providers: HashMap<ModelId, ProviderSettings>,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_providers() -> HashMap<ModelId, ProviderSettings> {
    let mut providers = HashMap::new();
    providers.insert(
        ModelId::Gpt,
        ProviderSettings {
            proxy_url: "https://api.proxyapi.ru/openai/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            display_name: "GPT-4o Mini".to_string(),
        },
    );
    providers.insert(
        ModelId::Claude,
        ProviderSettings {
            proxy_url: "https://api.proxyapi.ru/anthropic/v1/messages".to_string(),
            model: "claude-3-5-haiku-20241022".to_string(),
            display_name: "Claude 3.5 Haiku".to_string(),
        },
    );
    providers
}

impl Default for Config {
    fn default() -> Self {
        Config {
            telegram_bot_token: String::new(),
            proxyapi_api_key: String::new(),
            default_model: ModelId::default(),
            request_timeout_secs: default_timeout_secs(),
            providers: default_providers(),
        }
    }
}

impl Config {
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tgchat")
            .join("config.yaml")
    }

    /// Load the config file (if any), apply environment overrides and
    /// validate the required credentials.
    pub fn load(path: Option<&Path>) -> Result<Config, BotError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_yml::from_str::<Config>(&contents)
                .map_err(|e| BotError::Config(format!("Parse {}: {}", path.display(), e)))?
        } else {
            Config::default()
        };

        // A partial providers table falls back to the stock ProxyAPI entries.
        for (model, settings) in default_providers() {
            config.providers.entry(model).or_insert(settings);
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| env::var(key).ok());
    }

    fn apply_env_from<F: Fn(&str) -> Option<String>>(&mut self, get: F) {
        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = v;
        }
        if let Some(v) = get("PROXYAPI_API_KEY") {
            self.proxyapi_api_key = v;
        }
        if let Some(v) = get("DEFAULT_MODEL") {
            if let Some(model) = ModelId::from_str(&v) {
                self.default_model = model;
            }
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                self.request_timeout_secs = secs;
            }
        }

        let overrides = [
            (ModelId::Gpt, "OPENAI_PROXY_URL", "OPENAI_MODEL", "OPENAI_DISPLAY_NAME"),
            (
                ModelId::Claude,
                "ANTHROPIC_PROXY_URL",
                "ANTHROPIC_MODEL",
                "ANTHROPIC_DISPLAY_NAME",
            ),
        ];
        for (model, url_var, model_var, display_var) in overrides {
            if let Some(settings) = self.providers.get_mut(&model) {
                if let Some(v) = get(url_var) {
                    settings.proxy_url = v;
                }
                if let Some(v) = get(model_var) {
                    settings.model = v;
                }
                if let Some(v) = get(display_var) {
                    settings.display_name = v;
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), BotError> {
        if self.telegram_bot_token.is_empty() {
            return Err(BotError::Config(
                "TELEGRAM_BOT_TOKEN is required (environment or config file)".to_string(),
            ));
        }
        if self.proxyapi_api_key.is_empty() {
            return Err(BotError::Config(
                "PROXYAPI_API_KEY is required (environment or config file)".to_string(),
            ));
        }
        if !self.providers.contains_key(&self.default_model) {
            return Err(BotError::Config(format!(
                "No provider settings for default model: {}",
                self.default_model.as_str()
            )));
        }
        Ok(())
    }

    pub fn provider(&self, model: ModelId) -> Result<&ProviderSettings, BotError> {
        self.providers
            .get(&model)
            .ok_or_else(|| BotError::Config(format!("No provider settings for model: {}", model.as_str())))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
