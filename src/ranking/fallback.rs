//! Fallback MMR lookup, used only when the primary path hard-fails.
//!
//! Queries a different service for a small fixed set of accounts and accepts
//! two payload shapes before giving up on an entry.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{RankingEntry, RankingSource};
use crate::error::{BotError, Result};
use crate::roster::Roster;

/// Accounts the fallback service is queried for.
const FALLBACK_ACCOUNTS: [&str; 3] = ["0x1", "0x2", "0x3"];

#[derive(Clone)]
pub struct FallbackRankingClient {
    http: Client,
    base_url: String,
}

impl FallbackRankingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent("scholarbot/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Accepts `walletData.pvpData.elo` or, failing that, a top-level
    /// `pvpData.elo`.
    pub fn parse_elo(body: &Value) -> Option<i64> {
        body.get("walletData")
            .and_then(|v| v.get("pvpData"))
            .or_else(|| body.get("pvpData"))
            .and_then(|v| v.get("elo"))
            .and_then(Value::as_i64)
    }
}

#[async_trait]
impl RankingSource for FallbackRankingClient {
    /// The roster is ignored: the fallback service only knows about a fixed
    /// account list.
    async fn fetch(&self, _roster: &Roster) -> Result<Vec<RankingEntry>> {
        let mut entries = Vec::with_capacity(FALLBACK_ACCOUNTS.len());
        let mut scored = 0usize;

        for account_id in FALLBACK_ACCOUNTS {
            let score = match self
                .http
                .get(&self.base_url)
                .query(&[("wallet", account_id)])
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                    Ok(body) => Self::parse_elo(&body),
                    Err(e) => {
                        warn!(account = %account_id, error = %e, "fallback response not JSON");
                        None
                    }
                },
                Ok(resp) => {
                    warn!(account = %account_id, status = %resp.status(), "fallback lookup non-success");
                    None
                }
                Err(e) => {
                    warn!(account = %account_id, error = %e, "fallback lookup request failed");
                    None
                }
            };

            if score.is_some() {
                scored += 1;
                debug!(account = %account_id, elo = score.unwrap_or_default(), "fallback lookup ok");
            }
            entries.push(RankingEntry {
                account_id: account_id.to_string(),
                display_name: String::new(),
                score,
            });
        }

        if scored == 0 {
            return Err(BotError::RankingUnavailable(
                "fallback produced no scores".to_string(),
            ));
        }

        Ok(entries)
    }
}
