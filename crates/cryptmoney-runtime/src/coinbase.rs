//! Coinbase Wallet Client
//!
//! Implementation of `WalletClient` against the Coinbase v2 REST API,
//! authenticated with an API key and HMAC-signed requests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cryptmoney_core::{
    env::{self, Lookup},
    error::{BotError, Result},
    model::{Account, Money, Transaction},
    wallet::WalletClient,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_API_URL: &str = "https://api.coinbase.com";

/// Value sent in the `CB-VERSION` header
pub const API_VERSION: &str = "2017-08-07";

const PAGE_LIMIT: u32 = 100;

/// Coinbase client configuration
#[derive(Clone, Debug)]
pub struct CoinbaseConfig {
    pub api_key: String,

    pub api_secret: String,

    /// API root, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl CoinbaseConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: DEFAULT_API_URL.into(),
            timeout_secs: 30,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env::process_env)
    }

    /// Reads `COINBASE_KEY`, `COINBASE_SECRET`, `COINBASE_API_URL` and `HTTP_TIMEOUT_SECS`
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            api_key: env::required(lookup, "COINBASE_KEY")?,
            api_secret: env::required(lookup, "COINBASE_SECRET")?,
            base_url: env::optional(lookup, "COINBASE_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: env::seconds(lookup, "HTTP_TIMEOUT_SECS", 30)?,
        })
    }
}

/// HMAC-SHA256 of `timestamp + METHOD + path + body`, hex encoded
pub fn sign_request(secret: &str, timestamp: i64, method: &str, path: &str, body: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::Config(format!("invalid Coinbase secret: {e}")))?;
    mac.update(format!("{timestamp}{}{path}{body}", method.to_uppercase()).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

// --- Wire types ---

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default)]
    pagination: Option<Pagination>,
    data: Vec<T>,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(default)]
    next_uri: Option<String>,
}

#[derive(Deserialize)]
struct WireMoney {
    amount: String,
    currency: String,
}

impl From<WireMoney> for Money {
    fn from(m: WireMoney) -> Self {
        Self::new(m.amount, m.currency)
    }
}

/// Older API versions send a bare code, newer ones an object
#[derive(Deserialize)]
#[serde(untagged)]
enum WireCurrency {
    Code(String),
    Detail { code: String },
}

impl WireCurrency {
    fn into_code(self) -> String {
        match self {
            Self::Code(code) | Self::Detail { code } => code,
        }
    }
}

#[derive(Deserialize)]
struct WireAccount {
    id: String,
    #[serde(default)]
    name: Option<String>,
    currency: WireCurrency,
    balance: WireMoney,
    native_balance: WireMoney,
}

impl From<WireAccount> for Account {
    fn from(a: WireAccount) -> Self {
        let account = Self::new(a.id, a.currency.into_code(), a.balance.into(), a.native_balance.into());
        match a.name {
            Some(name) => account.with_name(name),
            None => account,
        }
    }
}

#[derive(Deserialize)]
struct WireTransaction {
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    amount: WireMoney,
    native_amount: WireMoney,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<WireTransaction> for Transaction {
    fn from(t: WireTransaction) -> Self {
        let mut tx = Self::new(t.id, t.kind, t.amount.into(), t.native_amount.into());
        tx.created_at = t.created_at;
        tx
    }
}

/// Coinbase v2 wallet client
pub struct CoinbaseClient {
    http: reqwest::Client,
    config: CoinbaseConfig,
}

impl CoinbaseClient {
    pub fn new(config: CoinbaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(CoinbaseConfig::from_env()?)
    }

    /// Fetch every page starting at `path`, following `next_uri`
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(path.to_string());

        while let Some(path) = next {
            let page: Page<T> = self.get(&path).await?;
            debug!(path = %path, items = page.data.len(), "Fetched Coinbase page");
            items.extend(page.data);
            next = page
                .pagination
                .and_then(|p| p.next_uri)
                .filter(|uri| !uri.is_empty());
        }

        Ok(items)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let timestamp = Utc::now().timestamp();
        let signature = sign_request(&self.config.api_secret, timestamp, "GET", path, "")?;

        let response = self
            .http
            .get(format!("{}{path}", self.config.base_url))
            .header("CB-ACCESS-KEY", &self.config.api_key)
            .header("CB-ACCESS-SIGN", signature)
            .header("CB-ACCESS-TIMESTAMP", timestamp.to_string())
            .header("CB-VERSION", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BotError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WalletClient for CoinbaseClient {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let accounts: Vec<WireAccount> = self.get_all(&format!("/v2/accounts?limit={PAGE_LIMIT}")).await?;
        Ok(accounts.into_iter().map(Account::from).collect())
    }

    async fn list_transactions(&self, account_id: &str) -> Result<Vec<Transaction>> {
        let path = format!("/v2/accounts/{account_id}/transactions?limit={PAGE_LIMIT}");
        let transactions: Vec<WireTransaction> = self.get_all(&path).await?;
        Ok(transactions.into_iter().map(Transaction::from).collect())
    }

    fn name(&self) -> &str {
        "Coinbase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CoinbaseClient {
        let mut config = CoinbaseConfig::new("test-key", "test-secret");
        config.base_url = server.uri();
        CoinbaseClient::new(config).unwrap()
    }

    fn account_json(id: &str, currency: serde_json::Value, native: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": format!("{id} wallet"),
            "currency": currency,
            "balance": { "amount": "1.5", "currency": "BTC" },
            "native_balance": { "amount": native, "currency": "USD" }
        })
    }

    #[test]
    fn test_signature() {
        let sig = sign_request("test-secret", 1_700_000_000, "get", "/v2/accounts?limit=100", "").unwrap();
        assert_eq!(sig, "ad61819beedcd185685777188935e51ebc1c6ec80faf65e5a770264b84194a1e");
    }

    #[test]
    fn test_config_from_lookup() {
        let lookup = |k: &str| match k {
            "COINBASE_KEY" => Some("k".to_string()),
            "COINBASE_SECRET" => Some("s".to_string()),
            "COINBASE_API_URL" => Some("http://localhost:9000/".to_string()),
            _ => None,
        };
        let config = CoinbaseConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, 30);

        let missing = |_: &str| None;
        assert!(matches!(CoinbaseConfig::from_lookup(&missing), Err(BotError::Config(_))));
    }

    #[tokio::test]
    async fn test_list_accounts_follows_pagination() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts"))
            .and(query_param("starting_after", "a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pagination": { "next_uri": null },
                "data": [account_json("a2", serde_json::json!({ "code": "ETH" }), "500.00")]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts"))
            .and(query_param("limit", "100"))
            .and(query_param_is_missing("starting_after"))
            .and(header("CB-ACCESS-KEY", "test-key"))
            .and(header("CB-VERSION", API_VERSION))
            .and(header_exists("CB-ACCESS-SIGN"))
            .and(header_exists("CB-ACCESS-TIMESTAMP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pagination": { "next_uri": "/v2/accounts?limit=100&starting_after=a1" },
                "data": [account_json("a1", serde_json::json!("btc"), "1000.00")]
            })))
            .mount(&server)
            .await;

        let accounts = client(&server).list_accounts().await.unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, "a1");
        assert_eq!(accounts[0].currency, "BTC");
        assert_eq!(accounts[0].name, "a1 wallet");
        assert_eq!(accounts[1].currency, "ETH");
        assert_eq!(accounts[1].native_balance, Money::new("500.00", "USD"));
    }

    #[tokio::test]
    async fn test_list_transactions() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts/a1/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pagination": { "next_uri": null },
                "data": [{
                    "id": "t1",
                    "type": "buy",
                    "amount": { "amount": "0.01", "currency": "BTC" },
                    "native_amount": { "amount": "450.10", "currency": "USD" },
                    "created_at": "2018-01-05T17:05:42Z"
                }]
            })))
            .mount(&server)
            .await;

        let txs = client(&server).list_transactions("a1").await.unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, "buy");
        assert_eq!(txs[0].native_amount.amount, "450.10");
        assert!(txs[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_http_error_becomes_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid signature"))
            .mount(&server)
            .await;

        match client(&server).list_accounts().await {
            Err(BotError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid signature");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = client(&server).list_accounts().await;
        assert!(matches!(result, Err(BotError::Serialization(_))));
    }
}
