use crate::core::error::BotError;
use crate::features::OutgoingPayload;
use crate::telegram::{ApiResponse, InlineKeyboardMarkup, Message, Update};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const LONG_POLL_SECS: u64 = 30;

#[derive(Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
}

#[derive(Serialize)]
struct SendChatActionRequest {
    chat_id: i64,
    action: &'static str,
}

/// Thin Bot API client over the HTTPS endpoint; one method per API call the
/// bot uses.
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_base_url("https://api.telegram.org", token)
    }

    pub fn with_base_url(base: &str, token: &str) -> Self {
        // Timeout must outlast the long poll.
        let client = Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECS + 20))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: format!("{}/bot{}", base, token),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &impl Serialize,
    ) -> Result<T, BotError> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| BotError::Telegram(format!("{}: {}", method, e)))?;

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BotError::Telegram(format!("{}: decode: {}", method, e)))?;

        if !body.ok {
            let description = body.description.unwrap_or_else(|| "unknown error".to_string());
            return Err(BotError::Telegram(format!("{}: {}", method, description)));
        }
        body.result
            .ok_or_else(|| BotError::Telegram(format!("{}: empty result", method)))
    }

    /// Long-polls for the next batch of updates.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: LONG_POLL_SECS,
                allowed_updates: &["message", "callback_query"],
            },
        )
        .await
    }

    /// Sends a payload, rendering its controls as an inline keyboard.
    pub async fn send_payload(&self, chat_id: i64, payload: &OutgoingPayload) -> Result<(), BotError> {
        let reply_markup = (!payload.controls.is_empty())
            .then(|| InlineKeyboardMarkup::from_controls(&payload.controls));

        self.call::<Message>(
            "sendMessage",
            &SendMessageRequest {
                chat_id,
                text: &payload.text,
                reply_markup,
            },
        )
        .await
        .map(|_| ())
    }

    /// Replaces the text of a previously sent message (button confirmations).
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), BotError> {
        self.call::<Value>(
            "editMessageText",
            &EditMessageTextRequest {
                chat_id,
                message_id,
                text,
            },
        )
        .await
        .map(|_| ())
    }

    /// Acknowledges a button press so the client stops its spinner.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), BotError> {
        self.call::<bool>(
            "answerCallbackQuery",
            &AnswerCallbackQueryRequest { callback_query_id },
        )
        .await
        .map(|_| ())
    }

    pub async fn send_typing(&self, chat_id: i64) -> Result<(), BotError> {
        self.call::<bool>(
            "sendChatAction",
            &SendChatActionRequest {
                chat_id,
                action: "typing",
            },
        )
        .await
        .map(|_| ())
    }
}
