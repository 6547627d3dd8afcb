//! Update loop: long-polls Telegram and dispatches each update on its own
//! task.

use crate::features::chat::ChatFeature;
use crate::features::OutgoingPayload;
use crate::telegram::{CallbackQuery, Message, TelegramClient, Update};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

pub mod router;

use router::CommandRegistry;

const POLL_BACKOFF: Duration = Duration::from_secs(5);

pub struct TelegramBot {
    client: Arc<TelegramClient>,
    feature: Arc<ChatFeature>,
    commands: Arc<CommandRegistry>,
}

impl TelegramBot {
    pub fn new(
        client: Arc<TelegramClient>,
        feature: Arc<ChatFeature>,
        commands: Arc<CommandRegistry>,
    ) -> Self {
        Self {
            client,
            feature,
            commands,
        }
    }

    /// Polls until the process is stopped. A failed poll backs off and
    /// retries; a failed update never takes the loop down.
    pub async fn run(&self) {
        info!("bot started, polling for updates");
        let mut offset = 0i64;

        loop {
            let updates = match self.client.get_updates(offset).await {
                Ok(updates) => updates,
                Err(err) => {
                    warn!(error = %err, "getUpdates failed, backing off");
                    sleep(POLL_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let client = Arc::clone(&self.client);
                let feature = Arc::clone(&self.feature);
                let commands = Arc::clone(&self.commands);
                tokio::spawn(async move {
                    handle_update(client, feature, commands, update).await;
                });
            }
        }
    }
}

async fn handle_update(
    client: Arc<TelegramClient>,
    feature: Arc<ChatFeature>,
    commands: Arc<CommandRegistry>,
    update: Update,
) {
    if let Some(message) = update.message {
        handle_message(&client, &feature, &commands, message).await;
    } else if let Some(callback) = update.callback_query {
        handle_callback(&client, &feature, callback).await;
    }
}

async fn handle_message(
    client: &TelegramClient,
    feature: &ChatFeature,
    commands: &CommandRegistry,
    message: Message,
) {
    let (Some(text), Some(from)) = (message.text, message.from) else {
        return;
    };
    let chat_id = message.chat.id;

    let payload = if let Some(rest) = text.strip_prefix('/') {
        dispatch_command(commands, from.id, rest).await
    } else {
        if let Err(err) = client.send_typing(chat_id).await {
            warn!(chat_id, error = %err, "failed to send typing indicator");
        }
        feature.handle_message(from.id, &text).await
    };

    if let Err(err) = client.send_payload(chat_id, &payload).await {
        error!(chat_id, error = %err, "failed to send reply");
    }
}

async fn dispatch_command(commands: &CommandRegistry, user_id: i64, input: &str) -> OutgoingPayload {
    let mut parts = input.split_whitespace();
    // Group chats address commands as "/start@botname".
    let name = parts
        .next()
        .unwrap_or_default()
        .split('@')
        .next()
        .unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match commands.execute(name, user_id, &args).await {
        Some(payload) => payload,
        None => {
            warn!(user_id, command = name, "unknown command");
            OutgoingPayload::text(format!("❌ Unknown command: /{}\n\nTry /help.", name))
        }
    }
}

async fn handle_callback(client: &TelegramClient, feature: &ChatFeature, callback: CallbackQuery) {
    if let Err(err) = client.answer_callback_query(&callback.id).await {
        warn!(callback_id = %callback.id, error = %err, "failed to answer callback query");
    }

    let Some(data) = callback.data else {
        return;
    };
    let payload = router::route_callback(feature, callback.from.id, &data);

    // Confirmations replace the keyboard message in place; fall back to a
    // fresh message when the original is too old to edit.
    match callback.message {
        Some(message) => {
            if let Err(err) = client
                .edit_message_text(message.chat.id, message.message_id, &payload.text)
                .await
            {
                warn!(chat_id = message.chat.id, error = %err, "edit failed, sending new message");
                if let Err(err) = client.send_payload(message.chat.id, &payload).await {
                    error!(chat_id = message.chat.id, error = %err, "failed to send confirmation");
                }
            }
        }
        None => {
            if let Err(err) = client.send_payload(callback.from.id, &payload).await {
                error!(user_id = callback.from.id, error = %err, "failed to send confirmation");
            }
        }
    }
}
