//! Chat Commands
//!
//! Keyword commands understood by the listener. Matching walks
//! [`Command::ALL`] in order and the first keyword found in the text wins.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatEvent, same_channel};

/// Commands the bot responds to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Post one message per active account
    Details,
    /// Post the portfolio summary immediately
    Summary,
    /// List the keywords
    Help,
}

impl Command {
    /// Match priority, highest first
    pub const ALL: [Self; 3] = [Self::Details, Self::Summary, Self::Help];

    /// Keyword that triggers the command
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Details => "get details",
            Self::Summary => "get summary",
            Self::Help => "help",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Details => "balances of every funded account",
            Self::Summary => "invested, balance and profit right now",
            Self::Help => "this list",
        }
    }

    /// First command whose keyword appears in `text`
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| text.contains(c.keyword()))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Decides which events are addressed to the bot
#[derive(Clone, Debug)]
pub struct CommandMatcher {
    wake_word: String,
    channel: String,
    channel_id: Option<String>,
}

impl CommandMatcher {
    pub fn new(wake_word: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            wake_word: wake_word.into(),
            channel: channel.into(),
            channel_id: None,
        }
    }

    #[must_use]
    pub fn with_channel_id(mut self, id: impl Into<String>) -> Self {
        self.set_channel_id(id);
        self
    }

    /// Also accept events tagged with the channel's backend id (e.g. "C024BE91L")
    pub fn set_channel_id(&mut self, id: impl Into<String>) {
        self.channel_id = Some(id.into());
    }

    pub fn wake_word(&self) -> &str {
        &self.wake_word
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The command an event asks for, if it carries text containing the
    /// wake word and was posted in the configured channel
    pub fn match_event(&self, event: &ChatEvent) -> Option<Command> {
        let text = event.text.as_deref()?;
        if !text.contains(&self.wake_word) {
            return None;
        }
        let channel = event.channel.as_deref()?;
        let by_id = self.channel_id.as_deref().is_some_and(|id| id == channel);
        if !by_id && !same_channel(channel, &self.channel) {
            return None;
        }
        Command::parse(text)
    }
}
