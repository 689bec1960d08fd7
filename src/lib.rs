pub mod adapters;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod leaderboard;
pub mod ranking;
pub mod roster;

pub use config::AppConfig;
pub use error::{BotError, Result, RosterError};
pub use leaderboard::format_leaderboard;
pub use ranking::{
    FallbackRankingClient, LeaderboardService, PrimaryRankingClient, RankingEntry, RankingSource,
};
pub use roster::{LoadOutcome, RemovedEntry, Roster, RosterStore};
