//! Bot Configuration
//!
//! Process-level settings. Adapter credentials are read by the adapters
//! themselves (`CoinbaseConfig`, `SlackConfig`).

use std::str::FromStr;
use std::time::Duration;

use cryptmoney_core::{
    BotError, PostSettings, Result, TriggerMode,
    env::{self, Lookup},
};

pub const DEFAULT_CHANNEL: &str = "#crypt_o_wallet";
pub const DEFAULT_USERNAME: &str = "CryptMoney";
pub const DEFAULT_ICON_URL: &str =
    "https://cdn.pixabay.com/photo/2013/12/08/12/12/bitcoin-225079_960_720.png";
pub const DEFAULT_WAKE_WORD: &str = "cryptobot";
pub const DEFAULT_POLL_SECS: u64 = 15;

/// Where the wallet data comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalletProvider {
    #[default]
    Coinbase,
    /// In-memory demo portfolio
    Mock,
}

impl FromStr for WalletProvider {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "coinbase" => Ok(Self::Coinbase),
            "mock" | "demo" => Ok(Self::Mock),
            other => Err(BotError::Config(format!(
                "unknown wallet provider '{other}' (expected 'coinbase' or 'mock')"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub mode: TriggerMode,
    pub poll_interval: Duration,
    pub wake_word: String,
    pub channel: String,
    pub username: String,
    pub icon_url: String,
    pub wallet_provider: WalletProvider,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env::process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let mode = env::optional(lookup, "TRIGGER_MODE", TriggerMode::Timer.as_str()).parse()?;
        let wallet_provider = env::optional(lookup, "WALLET_PROVIDER", "coinbase").parse()?;
        let wake_word = env::optional(lookup, "WAKE_WORD", DEFAULT_WAKE_WORD);

        if wake_word.trim().is_empty() {
            return Err(BotError::Config("WAKE_WORD must not be blank".into()));
        }

        Ok(Self {
            mode,
            poll_interval: Duration::from_secs(env::seconds(lookup, "POLL_INTERVAL_SECS", DEFAULT_POLL_SECS)?),
            wake_word: wake_word.trim().to_string(),
            channel: env::optional(lookup, "SLACK_CHANNEL", DEFAULT_CHANNEL),
            username: env::optional(lookup, "SLACK_USERNAME", DEFAULT_USERNAME),
            icon_url: env::optional(lookup, "SLACK_ICON_URL", DEFAULT_ICON_URL),
            wallet_provider,
        })
    }

    pub fn post_settings(&self) -> PostSettings {
        PostSettings::new(self.channel.clone()).with_identity(self.username.clone(), self.icon_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<BotConfig> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        BotConfig::from_lookup(&|k: &str| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.mode, TriggerMode::Timer);
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.wake_word, "cryptobot");
        assert_eq!(config.channel, "#crypt_o_wallet");
        assert_eq!(config.wallet_provider, WalletProvider::Coinbase);

        let settings = config.post_settings();
        assert_eq!(settings.username.as_deref(), Some("CryptMoney"));
        assert_eq!(settings.icon_url.as_deref(), Some(DEFAULT_ICON_URL));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TRIGGER_MODE", "command"),
            ("POLL_INTERVAL_SECS", "60"),
            ("WAKE_WORD", "moneybot"),
            ("SLACK_CHANNEL", "#wallet"),
            ("WALLET_PROVIDER", "mock"),
        ])
        .unwrap();

        assert_eq!(config.mode, TriggerMode::Command);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.wake_word, "moneybot");
        assert_eq!(config.channel, "#wallet");
        assert_eq!(config.wallet_provider, WalletProvider::Mock);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(load(&[("TRIGGER_MODE", "cron")]), Err(BotError::Config(_))));
        assert!(matches!(load(&[("POLL_INTERVAL_SECS", "0")]), Err(BotError::Config(_))));
        assert!(matches!(load(&[("POLL_INTERVAL_SECS", "soon")]), Err(BotError::Config(_))));
        assert!(matches!(load(&[("WALLET_PROVIDER", "kraken")]), Err(BotError::Config(_))));
    }
}
