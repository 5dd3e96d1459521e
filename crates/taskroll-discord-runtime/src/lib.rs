//! Discord transport for the taskroll engine.
//!
//! Bridges serenity gateway events into engine events and implements
//! the engine's outbound transport over serenity's HTTP client.

mod discord_runtime;

pub use discord_runtime::{run_discord_bot, DiscordBotConfig, DiscordTransport};
