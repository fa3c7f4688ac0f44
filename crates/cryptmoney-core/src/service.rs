//! Wallet Service
//!
//! The single stateful object of the bot: it owns the aggregator, the change
//! detector and the chat client, and is handed to whichever trigger driver
//! is configured.

use std::sync::Arc;

use tracing::{info, warn};

use crate::chat::{ChatClient, OutgoingMessage};
use crate::command::Command;
use crate::error::{BotError, Result};
use crate::format::SummaryFormatter;
use crate::model::Summary;
use crate::portfolio::{ChangeDetector, PortfolioAggregator};
use crate::wallet::WalletClient;

/// Moves at least this large (in percent) are logged as warnings
pub const LARGE_MOVE_PERCENT: f64 = 10.0;

/// Where and as whom the bot posts
#[derive(Clone, Debug)]
pub struct PostSettings {
    /// Target channel (e.g. "#crypt_o_wallet")
    pub channel: String,

    /// Display name override
    pub username: Option<String>,

    /// Avatar override
    pub icon_url: Option<String>,
}

impl PostSettings {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            username: None,
            icon_url: None,
        }
    }

    #[must_use]
    pub fn with_identity(mut self, username: impl Into<String>, icon_url: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.icon_url = Some(icon_url.into());
        self
    }
}

/// Result of one aggregation cycle
#[derive(Clone, Debug)]
pub struct Refresh {
    pub summary: Summary,

    /// Whether the diff moved since the previous cycle
    pub changed: bool,
}

/// Portfolio service with injected wallet and chat adapters
pub struct WalletService {
    aggregator: PortfolioAggregator,
    chat: Arc<dyn ChatClient>,
    detector: ChangeDetector,
    formatter: SummaryFormatter,
    settings: PostSettings,
}

impl WalletService {
    pub fn new(wallet: Arc<dyn WalletClient>, chat: Arc<dyn ChatClient>, settings: PostSettings) -> Self {
        Self {
            aggregator: PortfolioAggregator::new(wallet),
            chat,
            detector: ChangeDetector::new(),
            formatter: SummaryFormatter::new(),
            settings,
        }
    }

    pub const fn settings(&self) -> &PostSettings {
        &self.settings
    }

    pub const fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn chat(&self) -> Arc<dyn ChatClient> {
        Arc::clone(&self.chat)
    }

    /// Compute a fresh summary and feed its diff to the change detector
    pub async fn refresh(&mut self) -> Result<Refresh> {
        let summary = self.aggregator.compute_summary().await?;
        let changed = self.detector.observe(summary.diff);

        if let Some(percent) = summary.percent_change {
            if percent.abs() >= LARGE_MOVE_PERCENT {
                warn!(percent, diff = %summary.diff, "Portfolio moved past the large-move threshold");
            }
        }

        Ok(Refresh { summary, changed })
    }

    /// Compute a summary without touching the change detector
    pub async fn summary_now(&self) -> Result<Summary> {
        self.aggregator.compute_summary().await
    }

    pub async fn post_summary(&self, summary: &Summary) -> Result<()> {
        let message = self
            .message("")
            .with_attachment(self.formatter.summary_attachment(summary));
        self.chat.post_message(&message).await?;

        info!(channel = %self.settings.channel, diff = %summary.diff, "Posted summary");
        Ok(())
    }

    /// Post one message per funded account; returns how many were posted
    pub async fn post_account_details(&self) -> Result<usize> {
        let accounts = self.aggregator.active_accounts().await?;

        if accounts.is_empty() {
            self.chat.post_message(&self.message("No funded accounts.")).await?;
            return Ok(0);
        }

        for account in &accounts {
            let message = self
                .message("")
                .with_attachment(self.formatter.account_attachment(account));
            self.chat.post_message(&message).await?;
        }

        info!(accounts = accounts.len(), "Posted account details");
        Ok(accounts.len())
    }

    /// Report a failed command back to the channel
    pub async fn post_error(&self, command: Command, err: &BotError) -> Result<()> {
        let text = format!("Sorry, `{command}` failed. {}", err.user_message());
        let message = self
            .message(text)
            .with_attachment(self.formatter.error_attachment(err));
        self.chat.post_message(&message).await
    }

    pub async fn post_help(&self, wake_word: &str) -> Result<()> {
        let mut text = format!("Mention `{wake_word}` with one of:");
        for command in Command::ALL {
            text.push_str(&format!("\n• `{}`: {}", command.keyword(), command.description()));
        }
        self.chat.post_message(&self.message(text)).await
    }

    fn message(&self, text: impl Into<String>) -> OutgoingMessage {
        OutgoingMessage::new(self.settings.channel.clone(), text)
            .with_identity(self.settings.username.clone(), self.settings.icon_url.clone())
    }
}
