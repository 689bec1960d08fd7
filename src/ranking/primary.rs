//! Primary MMR lookup against the game ranking API.
//!
//! One GET per roster entry. A non-success status only fails that entry;
//! a response that no longer carries the expected nested shape fails the
//! whole batch, because that means the integration itself is broken.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{RankingEntry, RankingSource};
use crate::error::{BotError, Result};
use crate::roster::Roster;

#[derive(Clone)]
pub struct PrimaryRankingClient {
    http: Client,
    base_url: String,
}

impl PrimaryRankingClient {
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

    /// Extract the MMR from a primary response body. The service returns a
    /// JSON array whose first element holds an `items` array; the second
    /// item's `elo` is the PvP rating.
    pub fn parse_mmr(body: &Value) -> Result<i64> {
        body.get(0)
            .and_then(|v| v.get("items"))
            .and_then(|v| v.get(1))
            .and_then(|v| v.get("elo"))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                BotError::RankingShape("expected [0].items[1].elo in primary response".to_string())
            })
    }
}

#[async_trait]
impl RankingSource for PrimaryRankingClient {
    async fn fetch(&self, roster: &Roster) -> Result<Vec<RankingEntry>> {
        let mut entries = Vec::with_capacity(roster.len());

        for (account_id, display_name) in roster {
            let url = format!("{}/{}", self.base_url, account_id);
            let resp = match self.http.get(&url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    // Transport failure for one account soft-fails that entry.
                    warn!(account = %account_id, error = %e, "primary lookup request failed");
                    entries.push(RankingEntry {
                        account_id: account_id.clone(),
                        display_name: display_name.clone(),
                        score: None,
                    });
                    continue;
                }
            };

            if !resp.status().is_success() {
                warn!(account = %account_id, status = %resp.status(), "primary lookup non-success");
                entries.push(RankingEntry {
                    account_id: account_id.clone(),
                    display_name: display_name.clone(),
                    score: None,
                });
                continue;
            }

            let body: Value = resp.json().await.map_err(|e| {
                BotError::RankingShape(format!("primary response is not JSON: {e}"))
            })?;
            let mmr = Self::parse_mmr(&body)?;

            debug!(account = %account_id, mmr, "primary lookup ok");
            entries.push(RankingEntry {
                account_id: account_id.clone(),
                display_name: display_name.clone(),
                score: Some(mmr),
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_elo() {
        let body = json!([
            {
                "items": [
                    {"elo": 0, "rank": 0},
                    {"elo": 1450, "rank": 12345}
                ]
            }
        ]);
        assert_eq!(PrimaryRankingClient::parse_mmr(&body).unwrap(), 1450);
    }

    #[test]
    fn missing_items_is_a_shape_error() {
        let body = json!([{ "success": false }]);
        let err = PrimaryRankingClient::parse_mmr(&body).unwrap_err();
        assert!(matches!(err, BotError::RankingShape(_)));
    }

    #[test]
    fn single_item_array_is_a_shape_error() {
        let body = json!([{ "items": [{"elo": 1450}] }]);
        assert!(PrimaryRankingClient::parse_mmr(&body).is_err());
    }

    #[test]
    fn non_array_root_is_a_shape_error() {
        let body = json!({"items": [{"elo": 1}, {"elo": 2}]});
        assert!(PrimaryRankingClient::parse_mmr(&body).is_err());
    }
}
