use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod bot;
mod cli;
mod config;
mod core;
mod envelope;
mod features;
mod providers;
mod state;
mod telegram;

use crate::bot::{router, TelegramBot};
use crate::cli::Args;
use crate::config::{Config, ModelId};
use crate::core::error::BotError;
use crate::features::chat::ChatFeature;
use crate::providers::factory::ProviderFactory;
use crate::state::UserStateStore;
use crate::telegram::TelegramClient;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        error!(error = %err, "fatal error");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), BotError> {
    let config = Config::load(args.config.as_deref())?;
    info!("configuration loaded");

    let factory = ProviderFactory::new();
    let providers = factory.create_all(&config)?;
    for (model, provider) in &providers {
        info!(model = model.as_str(), display = provider.display_name(), "initialized provider");
    }

    let registered: Vec<ModelId> = providers.iter().map(|(model, _)| *model).collect();
    let store = Arc::new(UserStateStore::new(registered, config.default_model));
    let feature = Arc::new(ChatFeature::new(providers, store));
    let commands = Arc::new(router::default_registry(Arc::clone(&feature)));
    let client = Arc::new(TelegramClient::new(&config.telegram_bot_token));

    let bot = TelegramBot::new(client, feature, commands);
    bot.run().await;
    Ok(())
}
