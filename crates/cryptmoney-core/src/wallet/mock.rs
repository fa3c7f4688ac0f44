//! Mock Wallet Client
//!
//! For testing and dry runs. Serves a fixed set of accounts and records
//! which accounts had their transactions fetched.

use std::sync::RwLock;

use async_trait::async_trait;

use super::WalletClient;
use crate::error::{BotError, Result};
use crate::model::{Account, Money, Transaction};

struct MockAccount {
    account: Account,
    transactions: Vec<Transaction>,
}

/// In-memory wallet with scripted accounts
#[derive(Default)]
pub struct MockWalletClient {
    accounts: RwLock<Vec<MockAccount>>,
    transaction_calls: RwLock<Vec<String>>,
    outage: RwLock<Option<String>>,
}

impl MockWalletClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account together with its transactions
    #[must_use]
    pub fn with_account(self, account: Account, transactions: Vec<Transaction>) -> Self {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.push(MockAccount { account, transactions });
        }
        self
    }

    /// A small two-account portfolio for dry runs
    pub fn demo() -> Self {
        Self::new()
            .with_account(
                Account::new("btc-demo", "BTC", Money::new("0.015", "BTC"), Money::new("1000.00", "USD"))
                    .with_name("BTC Wallet"),
                vec![
                    Transaction::new("tx-1", "buy", Money::new("0.01", "BTC"), Money::new("600.00", "USD")),
                    Transaction::new("tx-2", "buy", Money::new("0.005", "BTC"), Money::new("300.00", "USD")),
                ],
            )
            .with_account(
                Account::new("eth-demo", "ETH", Money::new("0.2", "ETH"), Money::new("500.00", "USD"))
                    .with_name("ETH Wallet"),
                vec![Transaction::new("tx-3", "buy", Money::new("0.2", "ETH"), Money::new("300.00", "USD"))],
            )
    }

    /// Replace the native balance of an existing account
    pub fn set_native_balance(&self, account_id: &str, amount: &str) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| BotError::Wallet("mock wallet lock poisoned".into()))?;

        let entry = accounts
            .iter_mut()
            .find(|a| a.account.id == account_id)
            .ok_or_else(|| BotError::UnknownAccount(account_id.to_string()))?;

        entry.account.native_balance.amount = amount.to_string();
        Ok(())
    }

    /// Make every subsequent call fail with `reason` (`None` restores service)
    pub fn set_outage(&self, reason: Option<&str>) {
        if let Ok(mut outage) = self.outage.write() {
            *outage = reason.map(str::to_string);
        }
    }

    fn check_outage(&self) -> Result<()> {
        match self.outage.read() {
            Ok(outage) => outage.as_ref().map_or(Ok(()), |reason| Err(BotError::Wallet(reason.clone()))),
            Err(_) => Err(BotError::Wallet("mock wallet lock poisoned".into())),
        }
    }

    /// Account ids whose transactions were requested, in call order
    pub fn transaction_calls(&self) -> Vec<String> {
        self.transaction_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WalletClient for MockWalletClient {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.check_outage()?;
        let accounts = self
            .accounts
            .read()
            .map_err(|_| BotError::Wallet("mock wallet lock poisoned".into()))?;
        Ok(accounts.iter().map(|a| a.account.clone()).collect())
    }

    async fn list_transactions(&self, account_id: &str) -> Result<Vec<Transaction>> {
        if let Ok(mut calls) = self.transaction_calls.write() {
            calls.push(account_id.to_string());
        }
        self.check_outage()?;

        let accounts = self
            .accounts
            .read()
            .map_err(|_| BotError::Wallet("mock wallet lock poisoned".into()))?;

        accounts
            .iter()
            .find(|a| a.account.id == account_id)
            .map(|a| a.transactions.clone())
            .ok_or_else(|| BotError::UnknownAccount(account_id.to_string()))
    }

    fn name(&self) -> &str {
        "MockWallet"
    }
}
