//! Role grant/revoke commands.

use tracing::{info, warn};

use super::CommandContext;
use crate::chat::{find_member_by_name, find_role_by_name, Member, Role};
use crate::error::{BotError, Result};

/// `[user] <role>` argument split: one arg targets the invoking author.
struct RoleTarget<'a> {
    user_name: Option<&'a str>,
    role_name: &'a str,
}

impl<'a> RoleTarget<'a> {
    fn parse(args: &'a [String]) -> Self {
        if args.len() >= 2 {
            Self {
                user_name: Some(args[0].as_str()),
                role_name: args[1].as_str(),
            }
        } else {
            Self {
                user_name: None,
                role_name: args[0].as_str(),
            }
        }
    }
}

/// Resolve the target member and role, replying with the distinct
/// user-visible error when either lookup fails.
async fn resolve(
    ctx: &CommandContext,
    target: &RoleTarget<'_>,
) -> Result<Option<(Member, Role)>> {
    let Some(guild_id) = ctx.guild_id.as_deref() else {
        ctx.reply("Error this command can only be used in a server.")
            .await?;
        return Ok(None);
    };

    let member = match target.user_name {
        Some(name) => {
            let members = ctx.api.guild_members(guild_id).await?;
            match find_member_by_name(&members, name) {
                Some(m) => m.clone(),
                None => {
                    ctx.reply("Error user does not exist or is misspelled.")
                        .await?;
                    return Ok(None);
                }
            }
        }
        None => ctx.author.clone(),
    };

    let roles = ctx.api.guild_roles(guild_id).await?;
    let Some(role) = find_role_by_name(&roles, target.role_name).cloned() else {
        ctx.reply("Error role does not exist or is misspelled.")
            .await?;
        return Ok(None);
    };

    Ok(Some((member, role)))
}

/// `addrole [user] <role>`
pub async fn add_role(ctx: &CommandContext, args: &[String]) -> Result<()> {
    let target = RoleTarget::parse(args);
    let Some((member, role)) = resolve(ctx, &target).await? else {
        return Ok(());
    };
    let guild_id = ctx.guild_id.as_deref().unwrap_or_default();

    match ctx.api.add_role(guild_id, &member.user_id, &role.id).await {
        Ok(()) => {
            info!(user = %member.tag(), role = %role.name, "role added");
            ctx.reply(&format!(
                "success! User {} now has role {}.",
                member.tag(),
                role.name
            ))
            .await
        }
        Err(BotError::Forbidden(_)) => ctx.reply("Error no permission to add role.").await,
        Err(e) => {
            warn!(error = %e, "role add rejected");
            ctx.reply("Error failed to add the role.").await
        }
    }
}

/// `delrole [user] <role>`: also verifies the member holds the role.
pub async fn del_role(ctx: &CommandContext, args: &[String]) -> Result<()> {
    let target = RoleTarget::parse(args);
    let Some((member, role)) = resolve(ctx, &target).await? else {
        return Ok(());
    };
    let guild_id = ctx.guild_id.as_deref().unwrap_or_default();

    if !member.role_ids.iter().any(|id| *id == role.id) {
        return ctx
            .reply(&format!(
                "Error User {} does not have role {}",
                member.username, role.name
            ))
            .await;
    }

    match ctx
        .api
        .remove_role(guild_id, &member.user_id, &role.id)
        .await
    {
        Ok(()) => {
            info!(user = %member.tag(), role = %role.name, "role removed");
            ctx.reply(&format!(
                "Success! User {} no longer has role {}.",
                member.tag(),
                role.name
            ))
            .await
        }
        Err(BotError::Forbidden(_)) => ctx.reply("Error no permission to remove role.").await,
        Err(e) => {
            warn!(error = %e, "role removal rejected");
            ctx.reply("Error failed to remove the role.").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{MessageRef, MockChatApi};
    use crate::ranking::{LeaderboardService, MockRankingSource};
    use crate::roster::RosterStore;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn author(role_ids: Vec<&str>) -> Member {
        Member {
            user_id: "42".to_string(),
            username: "alice".to_string(),
            discriminator: "0001".to_string(),
            role_ids: role_ids.into_iter().map(str::to_string).collect(),
        }
    }

    fn ctx_with(api: MockChatApi, author: Member) -> CommandContext {
        let mut primary = MockRankingSource::new();
        primary.expect_fetch().returning(|_| Ok(vec![]));
        let mut fallback = MockRankingSource::new();
        fallback.expect_fetch().returning(|_| Ok(vec![]));
        CommandContext {
            api: Arc::new(api),
            roster: Arc::new(Mutex::new(RosterStore::new(None))),
            leaderboard: Arc::new(LeaderboardService::new(
                Box::new(primary),
                Box::new(fallback),
            )),
            guild_id: Some("g1".to_string()),
            channel_id: "c1".to_string(),
            author,
        }
    }

    fn scholar_role() -> Role {
        Role {
            id: "r9".to_string(),
            name: "Scholar".to_string(),
        }
    }

    fn expect_reply(api: &mut MockChatApi, content: &str) {
        let expected = content.to_string();
        api.expect_send_message()
            .withf(move |channel, content| channel == "c1" && content == expected)
            .times(1)
            .returning(|channel, _| {
                Ok(MessageRef {
                    channel_id: channel.to_string(),
                    message_id: "m1".to_string(),
                })
            });
    }

    #[tokio::test]
    async fn add_role_defaults_to_author() {
        let mut api = MockChatApi::new();
        api.expect_guild_roles()
            .times(1)
            .returning(|_| Ok(vec![scholar_role()]));
        api.expect_add_role()
            .withf(|guild, user, role| guild == "g1" && user == "42" && role == "r9")
            .times(1)
            .returning(|_, _, _| Ok(()));
        expect_reply(&mut api, "success! User alice#0001 now has role Scholar.");

        let ctx = ctx_with(api, author(vec![]));
        add_role(&ctx, &["Scholar".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn add_role_unknown_user() {
        let mut api = MockChatApi::new();
        api.expect_guild_members().times(1).returning(|_| {
            Ok(vec![Member {
                user_id: "7".to_string(),
                username: "bob".to_string(),
                discriminator: "0002".to_string(),
                role_ids: vec![],
            }])
        });
        expect_reply(&mut api, "Error user does not exist or is misspelled.");

        let ctx = ctx_with(api, author(vec![]));
        add_role(&ctx, &["carol".to_string(), "Scholar".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_role_unknown_role() {
        let mut api = MockChatApi::new();
        api.expect_guild_roles().times(1).returning(|_| Ok(vec![]));
        expect_reply(&mut api, "Error role does not exist or is misspelled.");

        let ctx = ctx_with(api, author(vec![]));
        add_role(&ctx, &["Scholar".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn add_role_permission_denied() {
        let mut api = MockChatApi::new();
        api.expect_guild_roles()
            .returning(|_| Ok(vec![scholar_role()]));
        api.expect_add_role()
            .returning(|_, _, _| Err(BotError::Forbidden("missing MANAGE_ROLES".to_string())));
        expect_reply(&mut api, "Error no permission to add role.");

        let ctx = ctx_with(api, author(vec![]));
        add_role(&ctx, &["Scholar".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn add_role_platform_rejection() {
        let mut api = MockChatApi::new();
        api.expect_guild_roles()
            .returning(|_| Ok(vec![scholar_role()]));
        api.expect_add_role().returning(|_, _, _| {
            Err(BotError::Discord {
                status: 400,
                body: "role hierarchy".to_string(),
            })
        });
        expect_reply(&mut api, "Error failed to add the role.");

        let ctx = ctx_with(api, author(vec![]));
        add_role(&ctx, &["Scholar".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn del_role_requires_member_to_hold_it() {
        let mut api = MockChatApi::new();
        api.expect_guild_roles()
            .returning(|_| Ok(vec![scholar_role()]));
        expect_reply(&mut api, "Error User alice does not have role Scholar");

        let ctx = ctx_with(api, author(vec![]));
        del_role(&ctx, &["Scholar".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn del_role_success() {
        let mut api = MockChatApi::new();
        api.expect_guild_roles()
            .returning(|_| Ok(vec![scholar_role()]));
        api.expect_remove_role()
            .withf(|guild, user, role| guild == "g1" && user == "42" && role == "r9")
            .times(1)
            .returning(|_, _, _| Ok(()));
        expect_reply(
            &mut api,
            "Success! User alice#0001 no longer has role Scholar.",
        );

        let ctx = ctx_with(api, author(vec!["r9"]));
        del_role(&ctx, &["Scholar".to_string()]).await.unwrap();
    }
}
