//! # cryptmoney-runtime
//!
//! Production adapters for the cryptmoney bot.
//!
//! ## Adapters
//!
//! - **Coinbase** (default): `WalletClient` over the signed v2 REST API
//! - **Slack** (default): `ChatClient` over the Web API and RTM websocket
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cryptmoney_runtime::{CoinbaseClient, SlackClient};
//!
//! let wallet = Arc::new(CoinbaseClient::from_env()?);
//! let chat = Arc::new(SlackClient::from_env()?);
//! let service = WalletService::new(wallet, chat, PostSettings::new("#crypt_o_wallet"));
//! ```

#[cfg(feature = "coinbase")]
pub mod coinbase;

#[cfg(feature = "slack")]
pub mod slack;

#[cfg(feature = "coinbase")]
pub use coinbase::{CoinbaseClient, CoinbaseConfig};

#[cfg(feature = "slack")]
pub use slack::{SlackClient, SlackConfig};

// Re-export core types for convenience
pub use cryptmoney_core::{BotError, ChatClient, Result, WalletClient};
