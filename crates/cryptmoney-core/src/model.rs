//! Domain Models
//!
//! Accounts and transactions as the wallet provider reports them, and the
//! portfolio summary derived from them on every cycle.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// A monetary amount exactly as the provider sent it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount string, possibly carrying a currency unit (e.g. "10.50" or "10.50 USD")
    pub amount: String,

    /// Currency code (e.g. "USD", "BTC")
    pub currency: String,
}

impl Money {
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into().to_uppercase(),
        }
    }

    /// Parse the amount into an exact decimal
    pub fn to_decimal(&self) -> Result<Decimal> {
        parse_amount(&self.amount)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match parse_amount(&self.amount) {
            Ok(amount) => write!(f, "{amount} {}", self.currency),
            Err(_) => write!(f, "{} {}", self.amount, self.currency),
        }
    }
}

/// Parse a provider amount, stripping any currency unit around the number.
///
/// `"1500.00 USD"`, `"USD 1500.00"` and `"1500.00"` all parse to `1500.00`.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let number = raw.trim_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace());

    if number.is_empty() {
        return Err(BotError::Parse {
            value: raw.to_string(),
            reason: "no numeric amount".into(),
        });
    }

    Decimal::from_str(number).map_err(|e| BotError::Parse {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// A wallet account held with the provider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    /// Provider account identifier
    pub id: String,

    /// Display name (e.g. "BTC Wallet")
    pub name: String,

    /// Currency code of the account (e.g. "BTC")
    pub currency: String,

    /// Balance in the account's own unit
    pub balance: Money,

    /// Balance in the user's home currency
    pub native_balance: Money,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        currency: impl Into<String>,
        balance: Money,
        native_balance: Money,
    ) -> Self {
        let currency = currency.into().to_uppercase();
        Self {
            id: id.into(),
            name: format!("{currency} Wallet"),
            currency,
            balance,
            native_balance,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Native balance as an exact decimal
    pub fn native_amount(&self) -> Result<Decimal> {
        self.native_balance.to_decimal()
    }
}

/// A single account transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    /// Provider transaction identifier
    pub id: String,

    /// Transaction type (buy, sell, send, ...)
    pub kind: String,

    /// Amount in the account's own unit
    pub amount: Money,

    /// Signed amount in the user's home currency
    pub native_amount: Money,

    /// When the transaction was created, if reported
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, amount: Money, native_amount: Money) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            amount,
            native_amount,
            created_at: None,
        }
    }
}

/// Aggregate portfolio figures for one cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Summary {
    /// Sum of native transaction amounts across active accounts
    pub invested: Decimal,

    /// Sum of native balances across all accounts
    pub balance: Decimal,

    /// `balance - invested`
    pub diff: Decimal,

    /// Percentage change against invested; `None` when nothing was invested
    pub percent_change: Option<f64>,

    /// When the figures were computed
    pub computed_at: DateTime<Utc>,
}

impl Summary {
    pub fn new(invested: Decimal, balance: Decimal) -> Self {
        Self {
            invested,
            balance,
            diff: balance - invested,
            percent_change: percent_change(balance, invested),
            computed_at: Utc::now(),
        }
    }

    /// Whether the portfolio is worth more than was put in
    pub fn gained(&self) -> bool {
        gained(self.balance, self.invested)
    }
}

/// True iff `invested - balance < 0`
pub fn gained(balance: Decimal, invested: Decimal) -> bool {
    invested - balance < Decimal::ZERO
}

/// `(balance - invested) / |invested| * 100`, or `None` for zero invested
/// and for ratios too large to represent
pub fn percent_change(balance: Decimal, invested: Decimal) -> Option<f64> {
    if invested.is_zero() {
        return None;
    }
    balance
        .checked_sub(invested)?
        .checked_div(invested.abs())?
        .checked_mul(dec!(100))?
        .to_f64()
}
