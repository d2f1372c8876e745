//! Chat front-ends that feed messages to the command dispatcher.

#[cfg(feature = "discord")]
pub mod discord;

/// Who may talk to the bot: the owner from anywhere, everybody else only
/// inside one of the testing guilds.
#[cfg_attr(not(feature = "discord"), allow(dead_code))]
#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
    pub owner_id: Option<u64>,
    pub testing_guilds: Vec<u64>,
}

#[cfg_attr(not(feature = "discord"), allow(dead_code))]
impl AccessFilter {
    pub fn is_owner(&self, author_id: u64) -> bool {
        self.owner_id == Some(author_id)
    }

    /// Direct messages (no guild) and bot authors are never accepted.
    pub fn accepts(&self, author_id: u64, author_is_bot: bool, guild_id: Option<u64>) -> bool {
        let guild_id = match guild_id {
            Some(id) if !author_is_bot => id,
            _ => return false,
        };
        self.is_owner(author_id) || self.testing_guilds.contains(&guild_id)
    }
}
