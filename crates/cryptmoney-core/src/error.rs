//! Error Types for the Wallet Bot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed amount '{value}': {reason}")]
    Parse { value: String, reason: String },

    #[error("Realtime connection failed: {0}")]
    RealtimeConnect(String),

    #[error("Realtime stream disconnected: {0}")]
    Disconnected(String),

    #[error("Account not found: {0}")]
    UnknownAccount(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BotError {
    /// Check if the failed call is worth retrying
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Disconnected(_) | Self::RealtimeConnect(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short message suitable for posting in the channel
    pub fn user_message(&self) -> String {
        match self {
            Self::Wallet(_) | Self::Api { .. } | Self::Network(_) => {
                "Could not reach the wallet provider.".into()
            }
            Self::Parse { value, .. } => format!("The wallet returned an unreadable amount: {value}"),
            Self::Chat(_) | Self::RealtimeConnect(_) | Self::Disconnected(_) => {
                "Lost contact with the chat service.".into()
            }
            Self::UnknownAccount(id) => format!("Account {id} does not exist."),
            Self::Config(_) => "The bot is misconfigured.".into(),
            Self::Serialization(_) => "An unexpected error occurred.".into(),
        }
    }
}
