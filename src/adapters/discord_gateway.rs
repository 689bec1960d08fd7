//! Minimal Discord gateway client.
//!
//! Connects the WebSocket, identifies, keeps the heartbeat alive, and feeds
//! MESSAGE_CREATE events into a channel. Reconnects with capped backoff and
//! jitter; everything else the gateway can do is out of scope for a
//! single-guild command bot.

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::chat::Member;
use crate::error::{BotError, Result};

/// GUILDS | GUILD_MEMBERS | GUILD_MESSAGES | MESSAGE_CONTENT
const INTENTS: u64 = (1 << 0) | (1 << 1) | (1 << 9) | (1 << 15);

/// Maximum reconnection delay
const MAX_RECONNECT_DELAY_SECS: u64 = 60;

/// A chat message as delivered by the gateway.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub content: String,
    pub author: Member,
    pub author_is_bot: bool,
}

#[derive(Debug, Deserialize)]
struct GatewayFrame {
    op: u8,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    d: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AuthorPayload {
    id: String,
    username: String,
    #[serde(default)]
    discriminator: String,
    #[serde(default)]
    bot: bool,
}

#[derive(Debug, Deserialize)]
struct PartialMemberPayload {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MessageCreatePayload {
    #[serde(default)]
    guild_id: Option<String>,
    channel_id: String,
    content: String,
    author: AuthorPayload,
    #[serde(default)]
    member: Option<PartialMemberPayload>,
}

pub struct DiscordGateway {
    url: String,
    token: String,
    message_tx: mpsc::Sender<InboundMessage>,
    reconnect_delay: Duration,
}

impl DiscordGateway {
    pub fn new(url: &str, token: &str, message_tx: mpsc::Sender<InboundMessage>) -> Self {
        Self {
            url: url.to_string(),
            token: token.to_string(),
            message_tx,
            reconnect_delay: Duration::from_secs(1),
        }
    }

    /// Run the gateway connection with automatic reconnection.
    pub async fn run(&self) -> Result<()> {
        let mut attempt: u32 = 0;
        let max_delay = Duration::from_secs(MAX_RECONNECT_DELAY_SECS);

        loop {
            match self.connect_and_stream().await {
                Ok(()) => {
                    info!("gateway connection closed, reconnecting");
                    attempt = 0;
                }
                Err(e) => {
                    attempt += 1;
                    error!(attempt, error = %e, "gateway connection error");
                }
            }

            let base_delay = self.reconnect_delay * attempt.max(1).min(10);
            let delay = base_delay.min(max_delay);
            let jitter_ms = rand::thread_rng().gen_range(0..=delay.as_millis() as u64 / 4);
            let final_delay = delay + Duration::from_millis(jitter_ms);

            info!(delay = ?final_delay, "reconnecting to gateway");
            tokio::time::sleep(final_delay).await;
        }
    }

    async fn connect_and_stream(&self) -> Result<()> {
        let url = url::Url::parse(&self.url)
            .map_err(|e| BotError::Gateway(format!("invalid gateway URL: {e}")))?;

        info!(%url, "connecting to Discord gateway");
        let (ws_stream, _) =
            tokio::time::timeout(Duration::from_secs(10), connect_async(url.as_str()))
            .await
            .map_err(|_| BotError::Gateway("gateway connection timeout".to_string()))?
            .map_err(BotError::WebSocket)?;

        let (mut write, mut read) = ws_stream.split();

        // HELLO must arrive first and carries the heartbeat interval.
        let heartbeat_ms = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => {
                    let frame: GatewayFrame = serde_json::from_str(&text)?;
                    if frame.op == 10 {
                        let ms = frame
                            .d
                            .as_ref()
                            .and_then(|d| d.get("heartbeat_interval"))
                            .and_then(Value::as_u64)
                            .ok_or_else(|| {
                                BotError::Gateway("HELLO without heartbeat_interval".to_string())
                            })?;
                        break ms;
                    }
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Err(BotError::Gateway("closed before HELLO".to_string())),
            }
        };

        let identify = json!({
            "op": 2,
            "d": {
                "token": self.token,
                "intents": INTENTS,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "scholarbot",
                    "device": "scholarbot"
                }
            }
        });
        write.send(Message::Text(identify.to_string())).await?;

        let mut heartbeat = interval(Duration::from_millis(heartbeat_ms));
        heartbeat.tick().await; // first tick fires immediately
        let mut last_seq: Option<u64> = None;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    let beat = json!({ "op": 1, "d": last_seq });
                    write.send(Message::Text(beat.to_string())).await?;
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(seq) = self.handle_frame(&text).await? {
                                last_seq = Some(seq);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            warn!(?frame, "gateway sent close");
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    /// Handle one gateway frame; returns the sequence number when present.
    /// A RECONNECT or INVALID_SESSION surfaces as an error so the outer loop
    /// re-establishes the connection.
    async fn handle_frame(&self, text: &str) -> Result<Option<u64>> {
        let frame: GatewayFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "unparsable gateway frame ignored");
                return Ok(None);
            }
        };

        match frame.op {
            0 => {
                match frame.t.as_deref() {
                    Some("READY") => info!("connected to Discord"),
                    Some("MESSAGE_CREATE") => {
                        if let Some(d) = frame.d {
                            self.forward_message(d).await;
                        }
                    }
                    Some(event) => debug!(event, "gateway event ignored"),
                    None => {}
                }
                Ok(frame.s)
            }
            7 => Err(BotError::Gateway("server requested reconnect".to_string())),
            9 => Err(BotError::Gateway("session invalidated".to_string())),
            11 => {
                debug!("heartbeat acknowledged");
                Ok(None)
            }
            op => {
                debug!(op, "gateway opcode ignored");
                Ok(None)
            }
        }
    }

    async fn forward_message(&self, d: Value) {
        let payload: MessageCreatePayload = match serde_json::from_value(d) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "MESSAGE_CREATE payload unreadable");
                return;
            }
        };

        let inbound = InboundMessage {
            guild_id: payload.guild_id,
            channel_id: payload.channel_id,
            content: payload.content,
            author: Member {
                user_id: payload.author.id,
                username: payload.author.username,
                discriminator: payload.author.discriminator,
                role_ids: payload.member.map(|m| m.roles).unwrap_or_default(),
            },
            author_is_bot: payload.author.bot,
        };

        if self.message_tx.send(inbound).await.is_err() {
            warn!("message receiver dropped, discarding inbound message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_frame_parses() {
        let frame: GatewayFrame =
            serde_json::from_str(r#"{"op":10,"d":{"heartbeat_interval":41250}}"#).unwrap();
        assert_eq!(frame.op, 10);
        assert_eq!(
            frame.d.unwrap()["heartbeat_interval"].as_u64().unwrap(),
            41250
        );
    }

    #[test]
    fn message_create_payload_parses() {
        let d = json!({
            "guild_id": "g1",
            "channel_id": "c1",
            "content": "!topscholars",
            "author": {"id": "42", "username": "alice", "discriminator": "0001"},
            "member": {"roles": ["r1"]}
        });
        let payload: MessageCreatePayload = serde_json::from_value(d).unwrap();
        assert_eq!(payload.content, "!topscholars");
        assert!(!payload.author.bot);
        assert_eq!(payload.member.unwrap().roles, vec!["r1"]);
    }

    #[test]
    fn dm_message_has_no_guild_or_member() {
        let d = json!({
            "channel_id": "c1",
            "content": "hi",
            "author": {"id": "42", "username": "alice", "bot": true}
        });
        let payload: MessageCreatePayload = serde_json::from_value(d).unwrap();
        assert!(payload.guild_id.is_none());
        assert!(payload.member.is_none());
        assert!(payload.author.bot);
    }
}
