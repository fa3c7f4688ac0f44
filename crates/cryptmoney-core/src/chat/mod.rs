//! Chat Integration
//!
//! Message types posted to the team channel, events read back from its
//! realtime stream, and the client trait every chat backend implements.

mod mock;

pub use mock::MockChatClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A labelled value inside an attachment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
}

impl Field {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// Rich attachment rendered under a message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Accent color (e.g. "#36a64f")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Free text body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Labelled fields
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Small print under the fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Attachment {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, title: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field::new(title, value));
        self
    }

    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// A message to post to a channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Channel name or id (e.g. "#crypt_o_wallet")
    pub channel: String,

    /// Plain text; may be empty when attachments carry the content
    pub text: String,

    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Display name override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Avatar override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl OutgoingMessage {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            attachments: Vec::new(),
            username: None,
            icon_url: None,
        }
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    #[must_use]
    pub fn with_identity(mut self, username: Option<String>, icon_url: Option<String>) -> Self {
        self.username = username;
        self.icon_url = icon_url;
        self
    }
}

/// An event read from the realtime stream
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Channel the event happened in
    #[serde(default)]
    pub channel: Option<String>,

    /// Message text, when the event carries one
    #[serde(default)]
    pub text: Option<String>,

    /// Author id
    #[serde(default)]
    pub user: Option<String>,
}

impl ChatEvent {
    pub fn message(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            text: Some(text.into()),
            user: None,
        }
    }
}

/// Chat client trait (Strategy pattern)
///
/// Implement this for each backend: Slack, or a test double.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post a message to `message.channel`
    async fn post_message(&self, message: &OutgoingMessage) -> Result<()>;

    /// Open the realtime event stream
    async fn connect_realtime(&self) -> Result<()>;

    /// Identifier the realtime stream uses for a configured channel.
    ///
    /// Backends whose events carry channel names keep the name as is.
    async fn resolve_channel(&self, channel: &str) -> Result<String> {
        Ok(channel.to_string())
    }

    /// Wait for the next batch of events from the realtime stream.
    ///
    /// A closed stream is reported as `BotError::Disconnected`.
    async fn read_events(&self) -> Result<Vec<ChatEvent>>;

    /// Backend name
    fn name(&self) -> &str;
}

/// Compare channel names, ignoring a leading `#`
pub fn same_channel(a: &str, b: &str) -> bool {
    a.trim_start_matches('#') == b.trim_start_matches('#')
}
