use crate::config::ProviderSettings;
use crate::core::error::BotError;
use crate::providers::base_client::HttpClient;
use crate::providers::{ModelProvider, ModelReply, ValidationStatus};
use crate::state::ResponseFormat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// OpenAI-style chat completions via the proxy endpoint.
#[derive(Debug)]
pub struct OpenAiProvider {
    client: HttpClient,
    model: String,
    display_name: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, settings: &ProviderSettings, timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(
                settings.proxy_url.clone(),
                ("Authorization".to_string(), format!("Bearer {}", api_key)),
                None,
                timeout,
            ),
            model: settings.model.clone(),
            display_name: settings.display_name.clone(),
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "gpt"
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn generate(&self, prompt: &str, json_mode: bool) -> Result<ModelReply, BotError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatCompletionMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
        };

        debug!(model = %self.display_name, json_mode, "sending chat completion request");
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
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| BotError::MalformedResponse(format!("OpenAI response decode: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BotError::MalformedResponse("no choices in OpenAI response".to_string()))?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(url: &str) -> ProviderSettings {
        ProviderSettings {
            proxy_url: url.to_string(),
            model: "gpt-4o-mini".to_string(),
            display_name: "GPT-4o Mini".to_string(),
        }
    }

    #[test]
    fn request_serializes_flat_messages() {
        let payload = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatCompletionMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            stream: false,
        };
        let body = serde_json::to_string(&payload).unwrap();
        assert!(body.contains(r#""role":"user""#));
        assert!(body.contains(r#""stream":false"#));
    }

    #[tokio::test]
    async fn extracts_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "4"}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("sk-test", &settings(&server.uri()), Duration::from_secs(5));
        let reply = provider.generate("What is 2+2?", false).await.unwrap();
        assert_eq!(reply.content, "4");
        assert_eq!(reply.model_display_name, "GPT-4o Mini");
        assert_eq!(reply.format_used, ResponseFormat::Text);
        assert_eq!(reply.validation_status, ValidationStatus::NotApplicable);
    }

    #[tokio::test]
    async fn non_2xx_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("sk-test", &settings(&server.uri()), Duration::from_secs(5));
        let err = provider.generate("hi", false).await.unwrap_err();
        match err {
            BotError::ProviderError { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected ProviderError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("sk-test", &settings(&server.uri()), Duration::from_secs(5));
        let err = provider.generate("hi", false).await.unwrap_err();
        assert!(matches!(err, BotError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("sk-test", &settings(&server.uri()), Duration::from_secs(5));
        let err = provider.generate("hi", false).await.unwrap_err();
        assert!(matches!(err, BotError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn timeout_maps_to_provider_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let provider =
            OpenAiProvider::new("sk-test", &settings(&server.uri()), Duration::from_millis(200));
        let err = provider.generate("hi", false).await.unwrap_err();
        assert!(matches!(err, BotError::ProviderUnavailable(_)), "got {:?}", err);
    }
}
