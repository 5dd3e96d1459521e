//! Serenity-backed gateway loop and outbound transport.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::all::{
    Client, Context, CreateEmbed, CreateMessage, EditMessage, EventHandler, GatewayIntents, Http,
    Message, Reaction, ReactionType, Ready,
};
use taskroll_core::{
    BotEngine, BotEngineConfig, ChatTransport, MessageReceived, ReactionAdded, TransportError,
};

pub struct DiscordBotConfig {
    pub token: String,
    pub command_prefix: String,
    pub data_dir: Option<PathBuf>,
}

/// Discord's maximum embed description length in characters.
const MAX_EMBED_DESCRIPTION_LEN: usize = 4096;

/// Truncate a rendered block to Discord's embed description limit.
fn truncate(s: &str) -> &str {
    if s.len() <= MAX_EMBED_DESCRIPTION_LEN {
        s
    } else {
        let mut end = MAX_EMBED_DESCRIPTION_LEN - 1;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

/// Outbound engine calls mapped onto serenity's HTTP client. Rendered
/// blocks travel as embed descriptions.
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatTransport for DiscordTransport {
    async fn send_block(
        &self,
        channel: taskroll_core::ChannelId,
        content: &str,
    ) -> Result<taskroll_core::MessageId, TransportError> {
        let target = serenity::all::ChannelId::new(channel.0);
        let builder = CreateMessage::new().embed(CreateEmbed::new().description(truncate(content)));
        let message = target
            .send_message(self.http.as_ref(), builder)
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;
        Ok(taskroll_core::MessageId(message.id.get()))
    }

    async fn edit_block(
        &self,
        channel: taskroll_core::ChannelId,
        message: taskroll_core::MessageId,
        content: &str,
    ) -> Result<(), TransportError> {
        let target = serenity::all::ChannelId::new(channel.0);
        target
            .edit_message(
                self.http.as_ref(),
                serenity::all::MessageId::new(message.0),
                EditMessage::new().embed(CreateEmbed::new().description(truncate(content))),
            )
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel: taskroll_core::ChannelId,
        message: taskroll_core::MessageId,
        emoji: &str,
    ) -> Result<(), TransportError> {
        self.http
            .create_reaction(
                serenity::all::ChannelId::new(channel.0),
                serenity::all::MessageId::new(message.0),
                &ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(|error| TransportError::Request(error.to_string()))
    }
}

fn unicode_emoji(reaction: &ReactionType) -> Option<&str> {
    match reaction {
        ReactionType::Unicode(value) => Some(value.as_str()),
        _ => None,
    }
}

struct Handler {
    engine: Arc<BotEngine>,
    bot_user_id: AtomicU64,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.bot_user_id.store(ready.user.id.get(), Ordering::Relaxed);
        println!("task bot connected as {}", ready.user.name);
    }

    async fn message(&self, _ctx: Context, message: Message) {
        if message.author.bot
            || message.author.id.get() == self.bot_user_id.load(Ordering::Relaxed)
        {
            return;
        }
        let event = MessageReceived {
            author: taskroll_core::UserId(message.author.id.get()),
            channel: taskroll_core::ChannelId(message.channel_id.get()),
            message: taskroll_core::MessageId(message.id.get()),
            text: message.content,
        };
        if let Err(error) = self.engine.handle_message(event).await {
            tracing::warn!("failed to handle message: {error}");
        }
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };
        if user_id.get() == self.bot_user_id.load(Ordering::Relaxed) {
            return;
        }
        let Some(emoji) = unicode_emoji(&reaction.emoji) else {
            tracing::debug!("ignoring custom emoji reaction");
            return;
        };
        let event = ReactionAdded {
            user: taskroll_core::UserId(user_id.get()),
            channel: taskroll_core::ChannelId(reaction.channel_id.get()),
            message: taskroll_core::MessageId(reaction.message_id.get()),
            emoji: emoji.to_string(),
        };
        if let Err(error) = self.engine.handle_reaction(event).await {
            tracing::warn!("failed to handle reaction: {error}");
        }
    }
}

/// Connects to Discord and serves task commands until the gateway drops
/// or the process receives ctrl-c.
pub async fn run_discord_bot(config: DiscordBotConfig) -> Result<()> {
    let http = Arc::new(Http::new(&config.token));
    let engine = Arc::new(BotEngine::new(BotEngineConfig {
        transport: Arc::new(DiscordTransport::new(http)),
        command_prefix: config.command_prefix,
        data_dir: config.data_dir,
    })?);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&config.token, intents)
        .event_handler(Handler {
            engine,
            bot_user_id: AtomicU64::new(0),
        })
        .await
        .context("failed to build discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        result = client.start() => {
            result.context("discord gateway connection ended")?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("task bot shutdown requested; disconnecting");
            shard_manager.shutdown_all().await;
        }
    }
    Ok(())
}
