//! Portfolio Aggregator
//!
//! Reduces the provider's accounts and transactions to the invested and
//! balance totals of a `Summary`.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::Result;
use crate::model::{Account, Summary};
use crate::wallet::WalletClient;

/// Computes portfolio totals from a wallet provider
pub struct PortfolioAggregator {
    wallet: Arc<dyn WalletClient>,
}

impl PortfolioAggregator {
    pub fn new(wallet: Arc<dyn WalletClient>) -> Self {
        Self { wallet }
    }

    /// Accounts whose native balance is not zero
    pub async fn active_accounts(&self) -> Result<Vec<Account>> {
        let mut active = Vec::new();
        for account in self.wallet.list_accounts().await? {
            if !account.native_amount()?.is_zero() {
                active.push(account);
            }
        }
        Ok(active)
    }

    /// Sum of every native transaction amount across active accounts
    pub async fn compute_invested(&self) -> Result<Decimal> {
        let mut total = Decimal::ZERO;

        for account in self.active_accounts().await? {
            let transactions = self.wallet.list_transactions(&account.id).await?;
            debug!(
                account = %account.id,
                currency = %account.currency,
                transactions = transactions.len(),
                "Fetched transactions"
            );
            for tx in &transactions {
                total += tx.native_amount.to_decimal()?;
            }
        }

        Ok(total)
    }

    /// Sum of native balances across all accounts, zero-balance included
    pub async fn compute_balance(&self) -> Result<Decimal> {
        let mut total = Decimal::ZERO;
        for account in self.wallet.list_accounts().await? {
            total += account.native_amount()?;
        }
        Ok(total)
    }

    /// Recompute the whole summary from scratch
    pub async fn compute_summary(&self) -> Result<Summary> {
        let invested = self.compute_invested().await?;
        let balance = self.compute_balance().await?;
        let summary = Summary::new(invested, balance);

        debug!(
            provider = self.wallet.name(),
            invested = %summary.invested,
            balance = %summary.balance,
            diff = %summary.diff,
            "Computed portfolio summary"
        );

        Ok(summary)
    }
}
