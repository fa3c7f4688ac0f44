//! Wallet Integration
//!
//! Abstraction over the wallet provider's account API.

mod mock;

pub use mock::MockWalletClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Account, Transaction};

/// Wallet client trait (Strategy pattern)
///
/// Implement this for each provider: Coinbase, or a test double.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// List every account, including zero-balance ones
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// List all transactions of one account
    async fn list_transactions(&self, account_id: &str) -> Result<Vec<Transaction>>;

    /// Provider name
    fn name(&self) -> &str;
}
