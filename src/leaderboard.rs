//! Leaderboard rendering. Pure text formatting, no I/O, no reordering.

use crate::ranking::RankingEntry;

/// Rendered in place of a score when the lookup for that account failed.
const FAILURE_MARKER: &str = "timeout";

/// One line per entry, in the order given: display name (or account id when
/// the name is empty), then the MMR.
pub fn format_leaderboard(entries: &[RankingEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry.label());
        out.push_str(" -- ");
        match entry.score {
            Some(score) => out.push_str(&score.to_string()),
            None => out.push_str(FAILURE_MARKER),
        }
        out.push_str(" MMR\n");
    }
    out
}
