//! Slack Chat Client
//!
//! Implementation of `ChatClient` using the Slack Web API for posting and
//! the RTM websocket for reading channel messages.

use std::time::Duration;

use async_trait::async_trait;
use cryptmoney_core::{
    chat::{Attachment, ChatClient, ChatEvent, OutgoingMessage},
    env::{self, Lookup},
    error::{BotError, Result},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

type RtmStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Slack client configuration
#[derive(Clone, Debug)]
pub struct SlackConfig {
    /// Bot token (xoxb-...)
    pub token: String,

    /// Web API root, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_API_URL.into(),
            timeout_secs: 30,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env::process_env)
    }

    /// Reads `SLACK_TOKEN`, `SLACK_API_URL` and `HTTP_TIMEOUT_SECS`
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            token: env::required(lookup, "SLACK_TOKEN")?,
            base_url: env::optional(lookup, "SLACK_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: env::seconds(lookup, "HTTP_TIMEOUT_SECS", 30)?,
        })
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    channels: Vec<WireChannel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct WireChannel {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Page size for `conversations.list`
const CHANNEL_PAGE_LIMIT: &str = "200";

/// Slack Web API + RTM client
pub struct SlackClient {
    http: reqwest::Client,
    config: SlackConfig,
    rtm: Mutex<Option<RtmStream>>,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            rtm: Mutex::new(None),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(SlackConfig::from_env()?)
    }

    /// Call a Web API method and check Slack's `ok` flag
    async fn call(&self, api_method: &str, body: &Value) -> Result<ApiResponse> {
        let request = self
            .http
            .post(format!("{}/{api_method}", self.config.base_url))
            .json(body);
        self.send(api_method, request).await
    }

    /// Call a read method that takes query arguments
    async fn call_get(&self, api_method: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        let request = self
            .http
            .get(format!("{}/{api_method}", self.config.base_url))
            .query(query);
        self.send(api_method, request).await
    }

    async fn send(&self, api_method: &str, request: reqwest::RequestBuilder) -> Result<ApiResponse> {
        let response = request.bearer_auth(&self.config.token).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BotError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ApiResponse = serde_json::from_str(&text)?;
        if !parsed.ok {
            let reason = parsed.error.unwrap_or_else(|| "unknown_error".into());
            return Err(BotError::Chat(format!("{api_method}: {reason}")));
        }
        Ok(parsed)
    }

    /// Id of the channel called `name`, walking `conversations.list` pages
    pub async fn channel_id(&self, name: &str) -> Result<String> {
        let wanted = name.trim_start_matches('#');
        let mut cursor = String::new();

        loop {
            let mut query = vec![
                ("types", "public_channel,private_channel"),
                ("exclude_archived", "true"),
                ("limit", CHANNEL_PAGE_LIMIT),
            ];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.as_str()));
            }

            let page = self.call_get("conversations.list", &query).await?;
            if let Some(channel) = page.channels.into_iter().find(|c| c.name == wanted) {
                debug!(name = wanted, id = %channel.id, "Resolved Slack channel");
                return Ok(channel.id);
            }

            match page.response_metadata.and_then(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = next,
                _ => return Err(BotError::Chat(format!("channel #{wanted} not found"))),
            }
        }
    }

    /// Ask Slack for a fresh RTM websocket URL
    pub async fn rtm_url(&self) -> Result<String> {
        self.call("rtm.connect", &json!({}))
            .await?
            .url
            .ok_or_else(|| BotError::RealtimeConnect("rtm.connect returned no url".into()))
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    async fn post_message(&self, message: &OutgoingMessage) -> Result<()> {
        self.call("chat.postMessage", &message_payload(message)).await?;
        debug!(channel = %message.channel, attachments = message.attachments.len(), "Posted Slack message");
        Ok(())
    }

    async fn connect_realtime(&self) -> Result<()> {
        let url = self
            .rtm_url()
            .await
            .map_err(|e| BotError::RealtimeConnect(e.to_string()))?;

        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| BotError::RealtimeConnect(e.to_string()))?;

        *self.rtm.lock().await = Some(stream);
        info!("Slack RTM connected");
        Ok(())
    }

    async fn resolve_channel(&self, channel: &str) -> Result<String> {
        if looks_like_channel_id(channel) {
            return Ok(channel.to_string());
        }
        self.channel_id(channel).await
    }

    async fn read_events(&self) -> Result<Vec<ChatEvent>> {
        let mut guard = self.rtm.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| BotError::Disconnected("RTM not connected".into()))?;

        match stream.next().await {
            Some(Ok(Message::Text(text))) => Ok(parse_event(&text).into_iter().collect()),
            Some(Ok(Message::Ping(data))) => {
                if let Err(e) = stream.send(Message::Pong(data)).await {
                    warn!(error = %e, "Failed to answer RTM ping");
                }
                Ok(Vec::new())
            }
            Some(Ok(Message::Close(frame))) => {
                *guard = None;
                Err(BotError::Disconnected(format!("closed by Slack: {frame:?}")))
            }
            Some(Ok(_)) => Ok(Vec::new()),
            Some(Err(e)) => {
                *guard = None;
                Err(BotError::Disconnected(e.to_string()))
            }
            None => {
                *guard = None;
                Err(BotError::Disconnected("stream ended".into()))
            }
        }
    }

    fn name(&self) -> &str {
        "Slack"
    }
}

/// Slack ids are upper-case alphanumerics starting with C (public), G (private) or D (direct)
fn looks_like_channel_id(channel: &str) -> bool {
    channel.len() >= 9
        && channel.starts_with(['C', 'G', 'D'])
        && channel.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// `chat.postMessage` body, with attachments rendered as section blocks
pub fn message_payload(message: &OutgoingMessage) -> Value {
    let mut payload = json!({
        "channel": message.channel,
        "text": message.text,
        "attachments": message.attachments.iter().map(attachment_json).collect::<Vec<_>>(),
    });

    if let Some(username) = &message.username {
        payload["username"] = json!(username);
    }
    if let Some(icon_url) = &message.icon_url {
        payload["icon_url"] = json!(icon_url);
    }
    payload
}

fn attachment_json(attachment: &Attachment) -> Value {
    let mut blocks = Vec::new();

    if let Some(text) = &attachment.text {
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": text }
        }));
    }

    if !attachment.fields.is_empty() {
        let fields: Vec<Value> = attachment
            .fields
            .iter()
            .map(|f| json!({ "type": "mrkdwn", "text": format!("*{}:*\n{}", f.title, f.value) }))
            .collect();
        blocks.push(json!({ "type": "section", "fields": fields }));
    }

    if let Some(footer) = &attachment.footer {
        blocks.push(json!({
            "type": "context",
            "elements": [{ "type": "mrkdwn", "text": footer }]
        }));
    }

    let mut value = json!({ "blocks": blocks });
    if let Some(color) = &attachment.color {
        value["color"] = json!(color);
    }
    value
}

#[derive(Deserialize)]
struct RtmFrame {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Plain user messages become events; everything else is dropped
fn parse_event(raw: &str) -> Option<ChatEvent> {
    let frame: RtmFrame = match serde_json::from_str(raw) {
        Ok(frame) => frame,
        Err(_) => {
            debug!(frame = raw, "Unparseable RTM frame");
            return None;
        }
    };

    if frame.kind != "message" || frame.subtype.is_some() || frame.bot_id.is_some() {
        return None;
    }

    Some(ChatEvent {
        channel: frame.channel,
        text: frame.text,
        user: frame.user,
    })
}
