//! Event-handling core: routes chat messages and reaction events into
//! per-user task mutations and replies.
//!
//! The engine is transport-agnostic. A runtime feeds it
//! [`MessageReceived`] and [`ReactionAdded`] events and supplies a
//! [`ChatTransport`] for the replies; nothing here knows which chat
//! service is on the other side.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::command::{command_usage, parse_task_command, TaskCommand};
use crate::error::{EngineError, TransportError};
use crate::ids::{ChannelId, MessageId, UserId};
use crate::persistence::TaskFileStore;
use crate::render::{render_plain, render_single, render_table};
use crate::session::EditSession;
use crate::task_store::TaskStore;
use crate::weights::priority_weight;

/// Reaction that raises a task's priority by one.
pub const INCREMENT_EMOJI: &str = "\u{1F53C}";
/// Reaction that lowers a task's priority by one.
pub const DECREMENT_EMOJI: &str = "\u{1F53D}";

const EMPTY_LIST_NOTICE: &str = "Your task list is empty.";

/// A chat message the bot can see.
#[derive(Debug, Clone)]
pub struct MessageReceived {
    pub author: UserId,
    pub channel: ChannelId,
    pub message: MessageId,
    pub text: String,
}

/// A reaction added to some message the bot can see.
#[derive(Debug, Clone)]
pub struct ReactionAdded {
    pub user: UserId,
    pub channel: ChannelId,
    pub message: MessageId,
    pub emoji: String,
}

/// Outbound half of the chat service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_block(
        &self,
        channel: ChannelId,
        content: &str,
    ) -> Result<MessageId, TransportError>;

    async fn edit_block(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), TransportError>;

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), TransportError>;
}

pub struct BotEngineConfig {
    pub transport: Arc<dyn ChatTransport>,
    /// Command prefix glued to verbs, e.g. `--` for `--edit`. Must be
    /// non-empty; the config loader guarantees this.
    pub command_prefix: String,
    /// When set, task stores are loaded from and written back to this
    /// directory. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct UserState {
    tasks: TaskStore,
    session: Option<EditSession>,
}

/// Shared bot state: one task store and at most one edit session per
/// user.
///
/// Events for the same user are serialized on that user's lock; events
/// for different users only contend briefly on the registry map.
pub struct BotEngine {
    transport: Arc<dyn ChatTransport>,
    command_prefix: String,
    usage: String,
    persistence: Option<TaskFileStore>,
    users: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<UserState>>>>,
}

impl BotEngine {
    pub fn new(config: BotEngineConfig) -> anyhow::Result<Self> {
        let usage = command_usage(&config.command_prefix);
        let persistence = config.data_dir.map(TaskFileStore::new);
        let mut users = HashMap::new();
        if let Some(files) = &persistence {
            for (user, tasks) in files.load_all()? {
                users.insert(
                    user,
                    Arc::new(tokio::sync::Mutex::new(UserState {
                        tasks,
                        session: None,
                    })),
                );
            }
        }
        Ok(Self {
            transport: config.transport,
            command_prefix: config.command_prefix,
            usage,
            persistence,
            users: Mutex::new(users),
        })
    }

    /// Handles one incoming message. Non-command messages are ignored.
    pub async fn handle_message(&self, event: MessageReceived) -> Result<(), EngineError> {
        let Some(command) = parse_task_command(&event.text, &self.command_prefix) else {
            return Ok(());
        };
        match command {
            TaskCommand::Invalid { message } => {
                self.transport.send_block(event.channel, &message).await?;
                Ok(())
            }
            TaskCommand::Help => {
                self.transport.send_block(event.channel, &self.usage).await?;
                Ok(())
            }
            TaskCommand::Edit { task } => {
                self.handle_edit(event.author, event.channel, task).await
            }
            TaskCommand::Delete { task } => {
                self.handle_delete(event.author, event.channel, task).await
            }
            TaskCommand::List => self.handle_list(event.author, event.channel).await,
            TaskCommand::Roll => self.handle_roll(event.author, event.channel).await,
        }
    }

    /// Handles one reaction event. Everything except a control emoji
    /// from a user whose open session owns the reacted message is a
    /// silent no-op.
    pub async fn handle_reaction(&self, event: ReactionAdded) -> Result<(), EngineError> {
        let delta = match event.emoji.as_str() {
            INCREMENT_EMOJI => 1,
            DECREMENT_EMOJI => -1,
            _ => return Ok(()),
        };
        let Some(state) = self.existing_user_state(event.user)? else {
            return Ok(());
        };
        let mut state = state.lock().await;
        let Some(session) = state.session.clone() else {
            return Ok(());
        };
        if !session.matches(event.message) {
            return Ok(());
        }

        let priority = match state.tasks.adjust(&session.task, delta) {
            Ok(priority) => priority,
            Err(EngineError::TaskNotFound { task }) => {
                // The session referenced a task that was cleaned away;
                // reconcile by dropping the session and the reaction.
                state.session = None;
                tracing::debug!(task = %task, "closing edit session for vanished task");
                return Ok(());
            }
            Err(error) => return Err(error),
        };
        self.persist(event.user, &state.tasks);

        let rendered = render_single(&session.task, priority_weight(priority));
        self.transport
            .edit_block(session.channel, session.message, &rendered)
            .await?;
        Ok(())
    }

    /// Rendered usage block, as sent for `help` and malformed commands.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    async fn handle_edit(
        &self,
        user: UserId,
        channel: ChannelId,
        task: String,
    ) -> Result<(), EngineError> {
        let state = self.user_state(user)?;
        let mut state = state.lock().await;
        state.tasks.clean();

        let priority = state.tasks.get_or_default(&task);
        let rendered = render_single(&task, priority_weight(priority));
        let message = self.transport.send_block(channel, &rendered).await?;
        self.transport
            .add_reaction(channel, message, INCREMENT_EMOJI)
            .await?;
        self.transport
            .add_reaction(channel, message, DECREMENT_EMOJI)
            .await?;

        state.tasks.set(&task, priority);
        state.session = Some(EditSession {
            channel,
            message,
            task,
        });
        self.persist(user, &state.tasks);
        Ok(())
    }

    async fn handle_delete(
        &self,
        user: UserId,
        channel: ChannelId,
        task: String,
    ) -> Result<(), EngineError> {
        let state = self.user_state(user)?;
        let mut state = state.lock().await;
        state.session = None;
        let cleaned = state.tasks.clean();
        let deleted = state.tasks.remove(&task);
        if deleted || cleaned > 0 {
            self.persist(user, &state.tasks);
        }

        let notice = if deleted {
            format!("Deleted task: {task}")
        } else {
            format!("No task named: {task}")
        };
        self.transport
            .send_block(channel, &render_plain(&notice))
            .await?;
        Ok(())
    }

    async fn handle_list(&self, user: UserId, channel: ChannelId) -> Result<(), EngineError> {
        let state = self.user_state(user)?;
        let mut state = state.lock().await;
        state.session = None;
        if state.tasks.clean() > 0 {
            self.persist(user, &state.tasks);
        }

        if state.tasks.is_empty() {
            self.transport
                .send_block(channel, &render_plain(EMPTY_LIST_NOTICE))
                .await?;
            return Ok(());
        }
        let entries = weighted_entries(&state.tasks);
        self.transport
            .send_block(channel, &render_table(&entries))
            .await?;
        Ok(())
    }

    async fn handle_roll(&self, user: UserId, channel: ChannelId) -> Result<(), EngineError> {
        let state = self.user_state(user)?;
        let mut state = state.lock().await;
        state.session = None;
        if state.tasks.clean() > 0 {
            self.persist(user, &state.tasks);
        }

        if state.tasks.is_empty() {
            self.transport
                .send_block(channel, &render_plain(EMPTY_LIST_NOTICE))
                .await?;
            return Ok(());
        }
        let entries = weighted_entries(&state.tasks);
        let chosen = weighted_roll(&entries, &mut rand::thread_rng())?;
        self.transport
            .send_block(channel, &render_plain(&chosen))
            .await?;
        Ok(())
    }

    fn user_state(&self, user: UserId) -> Result<Arc<tokio::sync::Mutex<UserState>>, EngineError> {
        let mut users = self.users.lock().map_err(|_| EngineError::RegistryPoisoned)?;
        Ok(users.entry(user).or_default().clone())
    }

    /// Looks up a user without creating one. Reaction events never
    /// allocate registry entries.
    fn existing_user_state(
        &self,
        user: UserId,
    ) -> Result<Option<Arc<tokio::sync::Mutex<UserState>>>, EngineError> {
        let users = self.users.lock().map_err(|_| EngineError::RegistryPoisoned)?;
        Ok(users.get(&user).cloned())
    }

    fn persist(&self, user: UserId, tasks: &TaskStore) {
        let Some(files) = &self.persistence else {
            return;
        };
        if let Err(error) = files.save(user, tasks) {
            tracing::warn!("failed to persist tasks for user {user}: {error:#}");
        }
    }
}

fn weighted_entries(tasks: &TaskStore) -> Vec<(String, u128)> {
    tasks
        .iter()
        .map(|(task, priority)| (task.to_string(), priority_weight(priority)))
        .collect()
}

/// Picks one task name, with each task's chance proportional to its
/// transformed weight.
pub fn weighted_roll<R: Rng + ?Sized>(
    entries: &[(String, u128)],
    rng: &mut R,
) -> Result<String, EngineError> {
    let weights: Vec<u128> = entries.iter().map(|(_, weight)| *weight).collect();
    let index =
        WeightedIndex::new(&weights).map_err(|error| EngineError::Selection(error.to_string()))?;
    Ok(entries[index.sample(rng)].0.clone())
}
