//! Ranking lookups: primary MMR service with a fallback escalation path.

pub mod fallback;
pub mod primary;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{BotError, Result};
use crate::roster::Roster;

pub use fallback::FallbackRankingClient;
pub use primary::PrimaryRankingClient;

/// One leaderboard row. `score` is `None` when the lookup for that account
/// soft-failed (rendered as a timeout marker downstream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub account_id: String,
    pub display_name: String,
    pub score: Option<i64>,
}

impl RankingEntry {
    /// Display name when present, account id otherwise.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.account_id
        } else {
            &self.display_name
        }
    }
}

/// A service that can resolve a roster into ranking entries.
///
/// An `Err` means the batch as a whole failed (e.g. the response shape no
/// longer matches); per-account failures are `score: None` entries inside
/// an `Ok` batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingSource: Send + Sync {
    async fn fetch(&self, roster: &Roster) -> Result<Vec<RankingEntry>>;
}

/// Sort descending by score; entries without a score go last. The sort is
/// stable, so ties keep roster iteration order.
pub fn sort_entries(entries: &mut [RankingEntry]) {
    entries.sort_by_key(|e| std::cmp::Reverse(e.score));
}

/// Orchestrates the primary fetch with fallback escalation.
pub struct LeaderboardService {
    primary: Box<dyn RankingSource>,
    fallback: Box<dyn RankingSource>,
}

impl LeaderboardService {
    pub fn new(primary: Box<dyn RankingSource>, fallback: Box<dyn RankingSource>) -> Self {
        Self { primary, fallback }
    }

    /// Fetch the leaderboard, already sorted. A hard failure of the primary
    /// escalates to the fallback; if that also fails there is no partial
    /// result, only an error.
    pub async fn fetch(&self, roster: &Roster) -> Result<Vec<RankingEntry>> {
        let mut entries = match self.primary.fetch(roster).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "primary ranking fetch failed, trying fallback");
                self.fallback.fetch(roster).await.map_err(|fe| {
                    BotError::RankingUnavailable(format!(
                        "primary failed ({e}); fallback failed ({fe})"
                    ))
                })?
            }
        };
        sort_entries(&mut entries);
        Ok(entries)
    }
}
