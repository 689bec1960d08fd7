//! Command handlers. Each handler is a stateless async fn of
//! (context, args) that ends in a chat message; user-input and upstream
//! failures never propagate past the handler.

pub mod roles;
pub mod scholars;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::chat::{ChatApi, Member};
use crate::ranking::LeaderboardService;
use crate::roster::RosterStore;

/// Everything a handler needs for one invocation.
pub struct CommandContext {
    pub api: Arc<dyn ChatApi>,
    pub roster: Arc<Mutex<RosterStore>>,
    pub leaderboard: Arc<LeaderboardService>,
    /// Absent for direct messages; role commands require it.
    pub guild_id: Option<String>,
    pub channel_id: String,
    /// The invoking user, with the role ids the gateway delivered.
    pub author: Member,
}

impl CommandContext {
    /// Mention string for the invoking user.
    pub fn author_mention(&self) -> String {
        format!("<@{}>", self.author.user_id)
    }

    /// Send a message to the invoking channel.
    pub async fn reply(&self, content: &str) -> crate::error::Result<()> {
        self.api.send_message(&self.channel_id, content).await?;
        Ok(())
    }
}
