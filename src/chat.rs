//! Chat platform seam: the Discord operations command handlers need,
//! behind a trait so handlers can be driven by a mock in tests.

use async_trait::async_trait;

use crate::error::Result;

/// A guild member as the handlers see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: String,
    pub username: String,
    pub discriminator: String,
    /// Role ids currently held.
    pub role_ids: Vec<String>,
}

impl Member {
    /// `name#discriminator`, the identity used in confirmation messages.
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// Handle to a message the bot sent, for in-place edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

/// Outbound Discord operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<MessageRef>;

    async fn edit_message(&self, message: &MessageRef, content: &str) -> Result<()>;

    async fn guild_members(&self, guild_id: &str) -> Result<Vec<Member>>;

    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<Role>>;

    async fn add_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> Result<()>;

    async fn remove_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> Result<()>;
}

/// Exact-name member lookup, mirroring `discord.utils.get(members, name=...)`.
pub fn find_member_by_name<'a>(members: &'a [Member], name: &str) -> Option<&'a Member> {
    members.iter().find(|m| m.username == name)
}

/// Exact-name role lookup.
pub fn find_role_by_name<'a>(roles: &'a [Role], name: &str) -> Option<&'a Role> {
    roles.iter().find(|r| r.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_tag_includes_discriminator() {
        let m = Member {
            user_id: "1".to_string(),
            username: "alice".to_string(),
            discriminator: "0420".to_string(),
            role_ids: vec![],
        };
        assert_eq!(m.tag(), "alice#0420");
    }

    #[test]
    fn name_lookups_are_exact() {
        let roles = vec![
            Role {
                id: "10".to_string(),
                name: "Scholar".to_string(),
            },
            Role {
                id: "11".to_string(),
                name: "scholar".to_string(),
            },
        ];
        assert_eq!(find_role_by_name(&roles, "scholar").unwrap().id, "11");
        assert!(find_role_by_name(&roles, "Schol").is_none());
    }
}
