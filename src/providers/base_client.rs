use crate::core::error::BotError;
use reqwest::{Client, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Shared HTTP plumbing for the provider adapters: one proxy endpoint, one
/// auth header (scheme differs per backend), optional extra headers and an
/// upper-bound request timeout.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    auth_header: (String, String),
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    pub fn new(
        endpoint: String,
        auth_header: (String, String),
        extra_headers: Option<HashMap<String, String>>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint,
            auth_header,
            extra_headers: extra_headers.unwrap_or_default(),
        }
    }

    /// POSTs the payload to the endpoint. Network failures and timeouts map
    /// to `ProviderUnavailable`; the caller inspects the status code.
    pub async fn post<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Response, BotError> {
        let (name, value) = &self.auth_header;
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(name.as_str(), value.as_str())
            .header("Content-Type", "application/json");

        for (key, header_value) in &self.extra_headers {
            request = request.header(key, header_value);
        }

        let response = request.json(payload).send().await?;
        Ok(response)
    }
}
