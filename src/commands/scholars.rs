//! Roster and leaderboard commands.

use tracing::{error, info};

use super::CommandContext;
use crate::error::{Result, RosterError};
use crate::leaderboard::format_leaderboard;

/// `addscholar <id> [name]`: insert a scholar and persist the roster.
pub async fn add_scholar(ctx: &CommandContext, args: &[String]) -> Result<()> {
    let id = args[0].as_str();
    let name = args.get(1).map(String::as_str).unwrap_or("");

    let mut roster = ctx.roster.lock().await;
    match roster.add(id, name) {
        Ok(()) => {
            if let Err(e) = roster.save() {
                error!(error = %e, "failed to persist roster after add, rolling back");
                let _ = roster.remove(id);
                return ctx.reply("Could not add scholar.").await;
            }
            info!(account = %id, "scholar added");
            ctx.reply("Successfully added scholar.").await
        }
        Err(RosterError::EmptyId) => ctx.reply("Error cannot add scholar without address").await,
        Err(RosterError::AlreadyExists { .. }) => {
            ctx.reply("Error ronin address already in database.").await
        }
        Err(RosterError::NotFound { .. }) => unreachable!("add never reports NotFound"),
    }
}

/// `delscholar <id-or-name>`: remove by id, or first name match.
pub async fn del_scholar(ctx: &CommandContext, args: &[String]) -> Result<()> {
    let key = args[0].as_str();

    let mut roster = ctx.roster.lock().await;
    match roster.remove(key) {
        Ok(removed) => {
            if let Err(e) = roster.save() {
                error!(error = %e, "failed to persist roster after remove, rolling back");
                let _ = roster.add(&removed.id, &removed.name);
                return ctx.reply("Error while trying to remove scholar.").await;
            }
            info!(account = %removed.id, "scholar removed");
            ctx.reply(&format!(
                "Successfully removed scholar {}({}).",
                removed.name, removed.id
            ))
            .await
        }
        Err(RosterError::NotFound { .. }) => {
            ctx.reply("Error name / ronin address not found in database.")
                .await
        }
        Err(_) => unreachable!("remove only reports NotFound"),
    }
}

/// `topscholars`: acknowledge, fetch, then edit the acknowledgment in place
/// with the sorted leaderboard.
pub async fn top_scholars(ctx: &CommandContext, _args: &[String]) -> Result<()> {
    let ack = ctx
        .api
        .send_message(
            &ctx.channel_id,
            &format!("{}\nCalculating MMR...", ctx.author_mention()),
        )
        .await?;

    let roster = ctx.roster.lock().await.entries().clone();
    match ctx.leaderboard.fetch(&roster).await {
        Ok(entries) => {
            let content = format!(
                "{}\nThe current top scholars are:\n{}",
                ctx.author_mention(),
                format_leaderboard(&entries)
            );
            ctx.api.edit_message(&ack, &content).await
        }
        Err(e) => {
            error!(error = %e, "leaderboard fetch failed");
            ctx.api
                .edit_message(
                    &ack,
                    "Something went wrong getting scholar MMR, try again later.",
                )
                .await
        }
    }
}
