//! # cryptmoney-core
//!
//! Portfolio tracking for a crypto wallet, reported to a team chat channel.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌────────────┐   ┌───────────┐   ┌────────────┐
//! │ TriggerDriver│──▶│ WalletService │──▶│ Aggregator │──▶│  Change   │──▶│ Formatter  │──▶ ChatClient
//! │ timer/command│   │               │   │ (wallet)   │   │ Detector  │   │            │
//! └──────────────┘   └───────────────┘   └────────────┘   └───────────┘   └────────────┘
//! ```
//!
//! Every cycle recomputes the portfolio from scratch:
//!
//! - **invested** - sum of native transaction amounts of every funded account
//! - **balance** - sum of native balances of every account
//! - **diff** - `balance - invested`
//! - **percent change** - `diff / |invested| * 100`, undefined for zero invested
//!
//! Wallet and chat backends sit behind the [`WalletClient`] and [`ChatClient`]
//! traits so the whole pipeline runs against in-memory mocks in tests.

pub mod chat;
pub mod command;
pub mod env;
pub mod error;
pub mod format;
pub mod model;
pub mod portfolio;
pub mod service;
pub mod trigger;
pub mod wallet;

pub use chat::{Attachment, ChatClient, ChatEvent, Field, OutgoingMessage};
pub use command::{Command, CommandMatcher};
pub use error::{BotError, Result};
pub use format::SummaryFormatter;
pub use model::{Account, Money, Summary, Transaction};
pub use portfolio::{ChangeDetector, PortfolioAggregator};
pub use service::{PostSettings, WalletService};
pub use trigger::{CommandListener, TimerDriver, TriggerDriver, TriggerMode};
pub use wallet::WalletClient;
