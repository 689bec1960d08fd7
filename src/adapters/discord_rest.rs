//! Discord REST API v10 adapter (native reqwest, no SDK dependency).
//!
//! Implements the `ChatApi` seam: messages, guild member/role listings, and
//! role mutations, authenticated with a bot token.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::chat::{ChatApi, Member, MessageRef, Role};
use crate::error::{BotError, Result};

/// Page size for the guild member listing.
const MEMBER_PAGE_LIMIT: u32 = 1000;

#[derive(Clone)]
pub struct DiscordRestClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    username: String,
    #[serde(default)]
    discriminator: String,
}

#[derive(Debug, Deserialize)]
struct MemberPayload {
    user: UserPayload,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RolePayload {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    id: String,
    channel_id: String,
}

impl DiscordRestClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|e| BotError::Internal(format!("invalid bot token header: {e}")))?;
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .user_agent("scholarbot/0.1")
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(format!("failed to build Discord HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(BotError::RateLimited(format!(
                "Discord API rate limited for {method} {path}"
            )));
        }
        if status == StatusCode::FORBIDDEN {
            return Err(BotError::Forbidden(format!("{method} {path}: {text}")));
        }
        if !status.is_success() {
            return Err(BotError::Discord {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(%method, path, status = status.as_u16(), "Discord request ok");
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| BotError::Internal(format!("invalid Discord JSON response: {e}")))
    }
}

#[async_trait]
impl ChatApi for DiscordRestClient {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<MessageRef> {
        let value = self
            .request_json(
                Method::POST,
                &format!("/channels/{channel_id}/messages"),
                Some(json!({ "content": content })),
            )
            .await?;
        let msg: MessagePayload = serde_json::from_value(value)?;
        Ok(MessageRef {
            channel_id: msg.channel_id,
            message_id: msg.id,
        })
    }

    async fn edit_message(&self, message: &MessageRef, content: &str) -> Result<()> {
        self.request_json(
            Method::PATCH,
            &format!(
                "/channels/{}/messages/{}",
                message.channel_id, message.message_id
            ),
            Some(json!({ "content": content })),
        )
        .await?;
        Ok(())
    }

    async fn guild_members(&self, guild_id: &str) -> Result<Vec<Member>> {
        let value = self
            .request_json(
                Method::GET,
                &format!("/guilds/{guild_id}/members?limit={MEMBER_PAGE_LIMIT}"),
                None,
            )
            .await?;
        let payloads: Vec<MemberPayload> = serde_json::from_value(value)?;
        Ok(payloads
            .into_iter()
            .map(|m| Member {
                user_id: m.user.id,
                username: m.user.username,
                discriminator: m.user.discriminator,
                role_ids: m.roles,
            })
            .collect())
    }

    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<Role>> {
        let value = self
            .request_json(Method::GET, &format!("/guilds/{guild_id}/roles"), None)
            .await?;
        let payloads: Vec<RolePayload> = serde_json::from_value(value)?;
        Ok(payloads
            .into_iter()
            .map(|r| Role {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn add_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> Result<()> {
        self.request_json(
            Method::PUT,
            &format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            None,
        )
        .await?;
        Ok(())
    }

    async fn remove_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> Result<()> {
        self.request_json(
            Method::DELETE,
            &format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            None,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_payload_maps_to_member() {
        let raw = json!({
            "user": {"id": "42", "username": "alice", "discriminator": "0001"},
            "roles": ["r1", "r2"]
        });
        let payload: MemberPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.user.username, "alice");
        assert_eq!(payload.roles, vec!["r1", "r2"]);
    }

    #[test]
    fn member_payload_roles_default_empty() {
        let raw = json!({"user": {"id": "42", "username": "alice"}});
        let payload: MemberPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.roles.is_empty());
        assert!(payload.user.discriminator.is_empty());
    }
}
