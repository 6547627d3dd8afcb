//! Minimal Telegram Bot API surface: the DTO subset the bot consumes and a
//! long-polling client.

use crate::features::InlineControl;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::TelegramClient;

/// Generic Bot API response wrapper.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardMarkup {
    /// One button per row, preserving control order.
    pub fn from_controls(controls: &[InlineControl]) -> Self {
        Self {
            inline_keyboard: controls
                .iter()
                .map(|control| {
                    vec![InlineKeyboardButton {
                        text: control.label.clone(),
                        callback_data: control.callback_id.clone(),
                    }]
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_message_update() {
        let json = r#"{
            "update_id": 1001,
            "message": {
                "message_id": 7,
                "from": {"id": 42, "is_bot": false, "first_name": "Ada"},
                "chat": {"id": 42, "type": "private"},
                "text": "What is 2+2?"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 1001);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.from.unwrap().id, 42);
        assert_eq!(message.text.as_deref(), Some("What is 2+2?"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn decodes_callback_update() {
        let json = r#"{
            "update_id": 1002,
            "callback_query": {
                "id": "cb1",
                "from": {"id": 42, "is_bot": false, "first_name": "Ada"},
                "data": "llm_claude",
                "message": {
                    "message_id": 8,
                    "chat": {"id": 42, "type": "private"}
                }
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let callback = update.callback_query.unwrap();
        assert_eq!(callback.data.as_deref(), Some("llm_claude"));
        assert_eq!(callback.from.id, 42);
        assert_eq!(callback.message.unwrap().message_id, 8);
    }

    #[test]
    fn keyboard_renders_one_button_per_row() {
        let controls = vec![
            InlineControl::new("GPT-4o Mini", "llm_gpt"),
            InlineControl::new("Claude 3.5 Haiku", "llm_claude"),
        ];
        let markup = InlineKeyboardMarkup::from_controls(&controls);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 1);

        let json = serde_json::to_string(&markup).unwrap();
        assert!(json.contains(r#""callback_data":"llm_gpt""#));
    }
}
