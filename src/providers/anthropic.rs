use crate::config::ProviderSettings;
use crate::core::error::BotError;
use crate::providers::base_client::HttpClient;
use crate::providers::{ModelProvider, ModelReply, ValidationStatus};
use crate::state::ResponseFormat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic-style messages API via the proxy endpoint.
#[derive(Debug)]
pub struct AnthropicProvider {
    client: HttpClient,
    model: String,
    display_name: String,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, settings: &ProviderSettings, timeout: Duration) -> Self {
        let mut extra_headers = HashMap::new();
        extra_headers.insert("anthropic-version".to_string(), "2023-06-01".to_string());

        Self {
            client: HttpClient::new(
                settings.proxy_url.clone(),
                ("x-api-key".to_string(), api_key.to_string()),
                Some(extra_headers),
                timeout,
            ),
            model: settings.model.clone(),
            display_name: settings.display_name.clone(),
        }
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "claude"
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn generate(&self, prompt: &str, json_mode: bool) -> Result<ModelReply, BotError> {
        let payload = AnthropicRequest {
            model: self.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: 1000,
            stream: false,
        };

        debug!(model = %self.display_name, json_mode, "sending messages request");
        let response = self.client.post(&payload).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| BotError::MalformedResponse(format!("Anthropic response decode: {}", e)))?;

        let content = parsed
            .content
            .into_iter()
            .next()
            .filter(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                BotError::MalformedResponse("no text content in Anthropic response".to_string())
            })?;

        Ok(ModelReply {
            content,
            model_display_name: self.display_name.clone(),
            format_used: if json_mode {
                ResponseFormat::Json
            } else {
                ResponseFormat::Text
            },
            validation_status: ValidationStatus::NotApplicable,
        })
    }
}
