//! End-to-end runs of the service against in-memory wallet and chat backends.

use std::sync::Arc;
use std::time::Duration;

use cryptmoney_core::chat::MockChatClient;
use cryptmoney_core::format::{NEGATIVE_COLOR, POSITIVE_COLOR};
use cryptmoney_core::wallet::MockWalletClient;
use cryptmoney_core::{
    Account, ChatEvent, CommandListener, Money, PostSettings, TimerDriver, Transaction, WalletService,
};
use rust_decimal_macros::dec;

const CHANNEL: &str = "#crypt_o_wallet";

fn portfolio() -> MockWalletClient {
    MockWalletClient::new()
        .with_account(
            Account::new("btc", "BTC", Money::new("0.02", "BTC"), Money::new("1000", "USD")),
            vec![
                Transaction::new("b1", "buy", Money::new("0.01", "BTC"), Money::new("450", "USD")),
                Transaction::new("b2", "buy", Money::new("0.01", "BTC"), Money::new("450", "USD")),
            ],
        )
        .with_account(
            Account::new("eth", "ETH", Money::new("0.3", "ETH"), Money::new("500", "USD")),
            vec![Transaction::new("e1", "buy", Money::new("0.3", "ETH"), Money::new("300", "USD"))],
        )
        .with_account(
            Account::new("ltc", "LTC", Money::new("0", "LTC"), Money::new("0.00", "USD")),
            vec![Transaction::new("l1", "buy", Money::new("1", "LTC"), Money::new("80", "USD"))],
        )
}

fn service(wallet: Arc<MockWalletClient>, chat: Arc<MockChatClient>) -> WalletService {
    WalletService::new(wallet, chat, PostSettings::new(CHANNEL))
}

#[tokio::test]
async fn summary_matches_expected_figures() {
    let wallet = Arc::new(portfolio());
    let chat = Arc::new(MockChatClient::new());
    let mut service = service(wallet.clone(), chat.clone());

    let refresh = service.refresh().await.unwrap();
    let summary = refresh.summary;

    assert_eq!(summary.invested, dec!(1200));
    assert_eq!(summary.balance, dec!(1500));
    assert_eq!(summary.diff, dec!(300));
    assert_eq!(summary.percent_change, Some(25.0));
    assert!(!wallet.transaction_calls().contains(&"ltc".to_string()));

    service.post_summary(&summary).await.unwrap();
    let posted = chat.posted();
    assert_eq!(posted[0].attachments[0].color.as_deref(), Some(POSITIVE_COLOR));
    assert_eq!(posted[0].attachments[0].fields[3].value, "25.00%");
}

#[tokio::test]
async fn timer_reports_a_drop() {
    let wallet = Arc::new(portfolio());
    let chat = Arc::new(MockChatClient::new());
    let mut driver = TimerDriver::new(service(wallet.clone(), chat.clone()), Duration::from_secs(60));

    driver.tick().await.unwrap();
    wallet.set_native_balance("btc", "400").unwrap();
    driver.tick().await.unwrap();

    let posted = chat.posted();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[1].attachments[0].color.as_deref(), Some(NEGATIVE_COLOR));
    assert_eq!(posted[1].attachments[0].fields[2].value, "$-300.00");
}

#[tokio::test]
async fn listener_answers_commands_from_the_stream() {
    use cryptmoney_core::TriggerDriver;

    let chat = Arc::new(
        MockChatClient::new()
            .with_events(vec![ChatEvent::message(CHANNEL, "cryptobot please get details now")])
            .with_events(vec![ChatEvent::message("#random", "cryptobot get summary")]),
    );
    let mut listener = CommandListener::new(service(Arc::new(portfolio()), chat.clone()), "cryptobot");

    assert!(listener.run().await.is_err());

    // Two funded accounts, nothing for the other channel
    assert_eq!(chat.posted().len(), 2);
}
