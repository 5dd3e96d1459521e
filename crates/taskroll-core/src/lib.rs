//! Transport-agnostic core of the taskroll bot.
//!
//! Holds the priority-weight transform, per-user task stores, the chat
//! command grammar, table rendering, JSON persistence, and the engine that
//! correlates reaction events back to open edit sessions. Chat I/O goes
//! through the [`ChatTransport`] trait so runtimes and tests supply their
//! own delivery.

pub mod command;
pub mod engine;
pub mod error;
pub mod ids;
pub mod persistence;
pub mod render;
pub mod session;
pub mod task_store;
pub mod weights;

pub use command::{command_usage, parse_task_command, TaskCommand};
pub use engine::{
    weighted_roll, BotEngine, BotEngineConfig, ChatTransport, MessageReceived, ReactionAdded,
    DECREMENT_EMOJI, INCREMENT_EMOJI,
};
pub use error::{EngineError, TransportError};
pub use ids::{ChannelId, MessageId, UserId};
pub use persistence::{write_text_atomic, TaskFileStore};
pub use render::{render_plain, render_single, render_table};
pub use session::EditSession;
pub use task_store::{TaskStore, DEFAULT_PRIORITY};
pub use weights::{priority_weight, MAX_PRIORITY};
