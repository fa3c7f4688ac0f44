//! Trigger Drivers
//!
//! What makes the bot post: a fixed-interval timer, or chat commands read
//! from the realtime stream. Exactly one driver runs per process.

mod listener;
mod timer;

pub use listener::{CommandListener, ListenerState};
pub use timer::TimerDriver;

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// Which driver to run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Post on a fixed interval when the diff changes
    #[default]
    Timer,
    /// Answer keyword commands in the channel
    Command,
}

impl TriggerMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Command => "command",
        }
    }
}

impl std::fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerMode {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "timer" | "schedule" => Ok(Self::Timer),
            "command" | "commands" | "listen" => Ok(Self::Command),
            other => Err(BotError::Config(format!(
                "unknown trigger mode '{other}' (expected 'timer' or 'command')"
            ))),
        }
    }
}

/// A loop that drives the wallet service until the process is killed
#[async_trait]
pub trait TriggerDriver: Send {
    fn mode(&self) -> TriggerMode;

    /// Run forever; returning at all means the driver hit a fatal error
    async fn run(&mut self) -> Result<()>;
}
