//! cryptmoney bot
//!
//! Posts Coinbase portfolio summaries to Slack, either on a timer or in
//! answer to keyword commands. Configuration comes from the environment
//! (and `.env`, when present).

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cryptmoney_core::{
    ChatClient, CommandListener, TimerDriver, TriggerDriver, TriggerMode, WalletClient, WalletService,
    wallet::MockWalletClient,
};
use cryptmoney_runtime::{CoinbaseClient, SlackClient};

use crate::config::{BotConfig, WalletProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::from_env().context("invalid bot configuration")?;

    let wallet: Arc<dyn WalletClient> = match config.wallet_provider {
        WalletProvider::Coinbase => {
            Arc::new(CoinbaseClient::from_env().context("could not set up the Coinbase client")?)
        }
        WalletProvider::Mock => {
            tracing::warn!("Using the in-memory demo wallet");
            Arc::new(MockWalletClient::demo())
        }
    };
    let chat: Arc<dyn ChatClient> =
        Arc::new(SlackClient::from_env().context("could not set up the Slack client")?);

    tracing::info!(
        mode = %config.mode,
        wallet = wallet.name(),
        chat = chat.name(),
        channel = %config.channel,
        "Starting cryptmoney"
    );

    let service = WalletService::new(wallet, chat, config.post_settings());
    let mut driver: Box<dyn TriggerDriver> = match config.mode {
        TriggerMode::Timer => Box::new(TimerDriver::new(service, config.poll_interval)),
        TriggerMode::Command => Box::new(CommandListener::new(service, config.wake_word.clone())),
    };

    driver
        .run()
        .await
        .with_context(|| format!("{} driver stopped", driver.mode()))?;

    Ok(())
}
