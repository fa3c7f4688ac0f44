//! Command Listener
//!
//! Reads the chat backend's realtime stream and dispatches keyword commands.
//!
//! ```text
//!  Disconnected ──connect──▶ Idle ──matching event──▶ Dispatching
//!                             ▲                            │
//!                             └──── handler done / error ──┘
//! ```
//!
//! A failed connection or a closed stream ends `run()`; handler failures are
//! reported in the channel and never stop the loop.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{TriggerDriver, TriggerMode};
use crate::chat::{ChatClient, ChatEvent};
use crate::command::{Command, CommandMatcher};
use crate::error::{BotError, Result};
use crate::service::WalletService;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Disconnected,
    Idle,
    Dispatching(Command),
}

pub struct CommandListener {
    service: WalletService,
    chat: Arc<dyn ChatClient>,
    matcher: CommandMatcher,
    state: ListenerState,
}

impl CommandListener {
    pub fn new(service: WalletService, wake_word: impl Into<String>) -> Self {
        let matcher = CommandMatcher::new(wake_word, service.settings().channel.clone());
        Self {
            chat: service.chat(),
            service,
            matcher,
            state: ListenerState::Disconnected,
        }
    }

    pub const fn state(&self) -> ListenerState {
        self.state
    }

    /// Open the realtime stream and learn how it identifies our channel
    pub async fn connect(&mut self) -> Result<()> {
        match self.open_stream().await {
            Ok(channel_id) => {
                info!(backend = self.chat.name(), channel_id = %channel_id, "Connected to realtime stream");
                self.matcher.set_channel_id(channel_id);
                self.state = ListenerState::Idle;
                Ok(())
            }
            Err(e) => {
                self.state = ListenerState::Disconnected;
                error!(backend = self.chat.name(), error = %e, "Could not connect to realtime stream");
                Err(match e {
                    BotError::RealtimeConnect(_) => e,
                    other => BotError::RealtimeConnect(other.to_string()),
                })
            }
        }
    }

    async fn open_stream(&self) -> Result<String> {
        self.chat.connect_realtime().await?;
        self.chat.resolve_channel(self.matcher.channel()).await
    }

    /// Read one batch of events and handle each; returns how many commands ran
    pub async fn poll(&mut self) -> Result<usize> {
        let events = match self.chat.read_events().await {
            Ok(events) => events,
            Err(e) => {
                if matches!(e, BotError::Disconnected(_)) {
                    self.state = ListenerState::Disconnected;
                }
                return Err(e);
            }
        };

        let mut handled = 0;
        for event in &events {
            if self.handle_event(event).await.is_some() {
                handled += 1;
            }
        }
        Ok(handled)
    }

    /// Dispatch a single event; returns the command it triggered, if any
    pub async fn handle_event(&mut self, event: &ChatEvent) -> Option<Command> {
        let command = self.matcher.match_event(event)?;

        self.state = ListenerState::Dispatching(command);
        info!(%command, user = ?event.user, "Dispatching command");

        if let Err(e) = self.dispatch(command).await {
            error!(%command, error = %e, "Command failed");
            if let Err(report_err) = self.service.post_error(command, &e).await {
                warn!(error = %report_err, "Could not report command failure to the channel");
            }
        }

        self.state = ListenerState::Idle;
        Some(command)
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::Details => {
                self.service.post_account_details().await?;
            }
            Command::Summary => {
                let summary = self.service.summary_now().await?;
                self.service.post_summary(&summary).await?;
            }
            Command::Help => {
                self.service.post_help(self.matcher.wake_word()).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TriggerDriver for CommandListener {
    fn mode(&self) -> TriggerMode {
        TriggerMode::Command
    }

    async fn run(&mut self) -> Result<()> {
        self.connect().await?;
        info!(wake_word = self.matcher.wake_word(), "Listening for commands");

        loop {
            match self.poll().await {
                Ok(0) => {}
                Ok(handled) => debug!(handled, "Handled commands"),
                Err(e) => {
                    error!(error = %e, "Realtime stream failed");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MockChatClient;
    use crate::service::PostSettings;
    use crate::wallet::MockWalletClient;

    const CHANNEL: &str = "#crypt_o_wallet";

    fn listener(wallet: Arc<MockWalletClient>, chat: Arc<MockChatClient>) -> CommandListener {
        let service = WalletService::new(wallet, chat, PostSettings::new(CHANNEL));
        CommandListener::new(service, "cryptobot")
    }

    #[tokio::test]
    async fn test_details_command_runs_once() {
        let chat = Arc::new(MockChatClient::new());
        let mut listener = listener(Arc::new(MockWalletClient::demo()), chat.clone());

        let event = ChatEvent::message(CHANNEL, "cryptobot please get details now");
        assert_eq!(listener.handle_event(&event).await, Some(Command::Details));

        // Demo wallet has two funded accounts: one message each
        let posted = chat.posted();
        assert_eq!(posted.len(), 2);
        assert!(posted.iter().all(|m| m.attachments.len() == 1));
        assert_eq!(listener.state(), ListenerState::Idle);
    }

    #[tokio::test]
    async fn test_events_tagged_with_channel_id_are_dispatched() {
        let event = ChatEvent {
            channel: Some("C024BE91L".into()),
            text: Some("cryptobot please get details now".into()),
            user: Some("U061F7AUR".into()),
        };
        let chat = Arc::new(
            MockChatClient::new()
                .with_channel_id(CHANNEL, "C024BE91L")
                .with_events(vec![event, ChatEvent::message("C0OTHER00", "cryptobot help")]),
        );
        let mut listener = listener(Arc::new(MockWalletClient::demo()), chat.clone());

        listener.connect().await.unwrap();
        assert_eq!(listener.poll().await.unwrap(), 1);
        assert_eq!(chat.posted().len(), 2);
    }

    #[tokio::test]
    async fn test_non_matching_events_do_nothing() {
        let chat = Arc::new(MockChatClient::new());
        let mut listener = listener(Arc::new(MockWalletClient::demo()), chat.clone());

        let elsewhere = ChatEvent::message("#general", "cryptobot please get details now");
        let no_wake = ChatEvent::message(CHANNEL, "please get details now");

        assert_eq!(listener.handle_event(&elsewhere).await, None);
        assert_eq!(listener.handle_event(&no_wake).await, None);
        assert!(chat.posted().is_empty());
    }

    #[tokio::test]
    async fn test_summary_command_bypasses_change_gate() {
        let chat = Arc::new(MockChatClient::new());
        let mut listener = listener(Arc::new(MockWalletClient::demo()), chat.clone());

        let event = ChatEvent::message(CHANNEL, "cryptobot get summary");
        listener.handle_event(&event).await;
        listener.handle_event(&event).await;

        assert_eq!(chat.posted().len(), 2);
    }

    #[tokio::test]
    async fn test_handler_error_is_reported_in_channel() {
        let wallet = Arc::new(MockWalletClient::demo());
        wallet.set_outage(Some("upstream returned 503"));
        let chat = Arc::new(MockChatClient::new());
        let mut listener = listener(wallet, chat.clone());

        let event = ChatEvent::message(CHANNEL, "cryptobot get details");
        assert_eq!(listener.handle_event(&event).await, Some(Command::Details));

        let posted = chat.posted();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].text.contains("`get details` failed"));
        let trace = posted[0].attachments[0].text.as_deref().unwrap();
        assert!(trace.contains("upstream returned 503"));
        assert_eq!(listener.state(), ListenerState::Idle);
    }

    #[tokio::test]
    async fn test_run_dispatches_until_stream_closes() {
        let chat = Arc::new(
            MockChatClient::new()
                .with_events(vec![
                    ChatEvent::message(CHANNEL, "cryptobot help"),
                    ChatEvent::message(CHANNEL, "just chatting"),
                ])
                .with_events(vec![])
                .with_events(vec![ChatEvent::message(CHANNEL, "cryptobot get summary")]),
        );
        let mut listener = listener(Arc::new(MockWalletClient::demo()), chat.clone());

        let result = listener.run().await;

        assert!(matches!(result, Err(BotError::Disconnected(_))));
        assert_eq!(listener.state(), ListenerState::Disconnected);
        assert_eq!(chat.posted().len(), 2);
    }

    #[tokio::test]
    async fn test_connection_failure_is_fatal() {
        let chat = Arc::new(MockChatClient::unreachable());
        let mut listener = listener(Arc::new(MockWalletClient::demo()), chat);

        assert!(matches!(listener.run().await, Err(BotError::RealtimeConnect(_))));
        assert_eq!(listener.state(), ListenerState::Disconnected);
    }
}
