//! Discord front-end using serenity.

use chrono::{DateTime, Utc};
use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    model::{channel::Message, gateway::{GatewayIntents, Ready}},
};

use super::AccessFilter;
use crate::commands::{CommandDispatcher, Invoker};
use crate::config::BotConfig;
use crate::utils::text::{truncate, MESSAGE_LIMIT};

struct Handler {
    dispatcher: CommandDispatcher,
    access: AccessFilter,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        log::info!("🤖 Logged in as {}", ready.user.name);
        log::info!("   Active in {} guild(s)", ready.guilds.len());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let author_id = msg.author.id.get();
        let guild_id = msg.guild_id.map(|id| id.get());
        if !self.access.accepts(author_id, msg.author.bot, guild_id) {
            return;
        }

        let invoker = Invoker {
            is_owner: self.access.is_owner(author_id),
            sent_at: snowflake_time(msg.id.get()),
        };
        let reply = match self.dispatcher.handle_message(&msg.content, invoker).await {
            Some(reply) => reply,
            None => return,
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, truncate(&reply, MESSAGE_LIMIT)).await {
            log::error!("❌ Could not send reply to channel {}: {}", msg.channel_id, e);
        }
    }
}

/// Creation time encoded in a Discord snowflake id
fn snowflake_time(id: u64) -> Option<DateTime<Utc>> {
    const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;
    DateTime::from_timestamp_millis((id >> 22) as i64 + DISCORD_EPOCH_MS)
}

/// Connects to the gateway and processes messages until the client stops.
pub async fn run(config: &BotConfig, dispatcher: CommandDispatcher) -> Result<(), serenity::Error> {
    let token = match config.resolve_token() {
        Some(token) => token,
        None => {
            log::warn!("⚠️  No Discord token configured, chat bot disabled");
            return Ok(());
        }
    };

    let intents = GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let handler = Handler {
        dispatcher,
        access: AccessFilter {
            owner_id: config.owner_id,
            testing_guilds: config.testing_guilds.clone(),
        },
    };

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    log::info!("🤖 Connecting to Discord...");
    client.start().await
}
