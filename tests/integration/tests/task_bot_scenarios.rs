//! End-to-end scenarios through the public engine API: command in,
//! transport calls out, task files on disk.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use taskroll_core::{
    render_plain, render_single, render_table, BotEngine, BotEngineConfig, ChannelId,
    ChatTransport, MessageId, MessageReceived, ReactionAdded, TaskFileStore, TransportError,
    UserId, DECREMENT_EMOJI, INCREMENT_EMOJI,
};

static WORKSPACE_COUNTER: AtomicU64 = AtomicU64::new(1);

struct IsolatedWorkspace {
    root: PathBuf,
}

impl IsolatedWorkspace {
    fn new(label: &str) -> Self {
        let tick = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let count = WORKSPACE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "taskroll-{label}-{}-{tick}-{count}",
            std::process::id()
        ));
        fs::create_dir_all(&root).expect("must create isolated workspace root");
        Self { root }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for IsolatedWorkspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OutboundCall {
    Send(String),
    Edit(MessageId, String),
    React(MessageId, String),
}

/// Minimal scripted chat service: records calls, returns message ids
/// counting up from 500.
#[derive(Default)]
struct CapturingTransport {
    calls: Mutex<Vec<OutboundCall>>,
    next_message: AtomicU64,
}

impl CapturingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn calls(&self) -> Vec<OutboundCall> {
        self.calls.lock().expect("transport lock").clone()
    }

    fn sent_blocks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                OutboundCall::Send(content) => Some(content),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatTransport for CapturingTransport {
    async fn send_block(
        &self,
        _channel: ChannelId,
        content: &str,
    ) -> Result<MessageId, TransportError> {
        let message = MessageId(500 + self.next_message.fetch_add(1, Ordering::SeqCst));
        self.calls
            .lock()
            .expect("transport lock")
            .push(OutboundCall::Send(content.to_string()));
        Ok(message)
    }

    async fn edit_block(
        &self,
        _channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), TransportError> {
        self.calls
            .lock()
            .expect("transport lock")
            .push(OutboundCall::Edit(message, content.to_string()));
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), TransportError> {
        self.calls
            .lock()
            .expect("transport lock")
            .push(OutboundCall::React(message, emoji.to_string()));
        Ok(())
    }
}

fn engine_in(data_dir: &Path, transport: Arc<CapturingTransport>) -> BotEngine {
    BotEngine::new(BotEngineConfig {
        transport,
        command_prefix: "--".to_string(),
        data_dir: Some(data_dir.to_path_buf()),
    })
    .expect("engine must start from the workspace data dir")
}

fn message(user: u64, text: &str) -> MessageReceived {
    MessageReceived {
        author: UserId(user),
        channel: ChannelId(42),
        message: MessageId(7),
        text: text.to_string(),
    }
}

fn reaction(user: u64, message: MessageId, emoji: &str) -> ReactionAdded {
    ReactionAdded {
        user: UserId(user),
        channel: ChannelId(42),
        message,
        emoji: emoji.to_string(),
    }
}

#[tokio::test]
async fn integration_edit_react_list_roundtrip() {
    let workspace = IsolatedWorkspace::new("roundtrip");
    let transport = CapturingTransport::new();
    let engine = engine_in(workspace.root(), transport.clone());

    engine
        .handle_message(message(1, "--edit buy milk"))
        .await
        .expect("edit command succeeds");
    assert_eq!(
        transport.calls(),
        vec![
            OutboundCall::Send(render_single("buy milk", 1)),
            OutboundCall::React(MessageId(500), INCREMENT_EMOJI.to_string()),
            OutboundCall::React(MessageId(500), DECREMENT_EMOJI.to_string()),
        ]
    );

    for _ in 0..3 {
        engine
            .handle_reaction(reaction(1, MessageId(500), INCREMENT_EMOJI))
            .await
            .expect("reaction succeeds");
    }
    assert_eq!(
        transport.calls().last(),
        Some(&OutboundCall::Edit(
            MessageId(500),
            render_single("buy milk", 5)
        ))
    );

    engine
        .handle_message(message(1, "--list"))
        .await
        .expect("list command succeeds");
    assert_eq!(
        transport.sent_blocks().last(),
        Some(&render_table(&[("buy milk".to_string(), 5)]))
    );

    // Session is gone; the old controls no longer do anything.
    let before = transport.calls().len();
    engine
        .handle_reaction(reaction(1, MessageId(500), INCREMENT_EMOJI))
        .await
        .expect("stale reaction is a no-op");
    assert_eq!(transport.calls().len(), before);
}

#[tokio::test]
async fn integration_tasks_survive_a_process_restart() {
    let workspace = IsolatedWorkspace::new("restart");
    {
        let transport = CapturingTransport::new();
        let engine = engine_in(workspace.root(), transport.clone());
        engine
            .handle_message(message(9, "--edit water plants"))
            .await
            .expect("edit command succeeds");
        engine
            .handle_reaction(reaction(9, MessageId(500), INCREMENT_EMOJI))
            .await
            .expect("reaction succeeds");
        engine
            .handle_reaction(reaction(9, MessageId(500), INCREMENT_EMOJI))
            .await
            .expect("reaction succeeds");
    }
    assert!(workspace.root().join("9.json").exists());

    let transport = CapturingTransport::new();
    let engine = engine_in(workspace.root(), transport.clone());
    engine
        .handle_message(message(9, "--list"))
        .await
        .expect("list command succeeds");
    assert_eq!(
        transport.sent_blocks(),
        vec![render_table(&[("water plants".to_string(), 3)])]
    );
}

#[tokio::test]
async fn integration_users_never_share_task_lists() {
    let workspace = IsolatedWorkspace::new("isolation");
    let transport = CapturingTransport::new();
    let engine = engine_in(workspace.root(), transport.clone());

    engine
        .handle_message(message(1, "--edit laundry"))
        .await
        .expect("first user edit succeeds");
    engine
        .handle_message(message(2, "--edit laundry"))
        .await
        .expect("second user edit succeeds");
    engine
        .handle_reaction(reaction(2, MessageId(501), INCREMENT_EMOJI))
        .await
        .expect("second user reaction succeeds");

    engine
        .handle_message(message(1, "--list"))
        .await
        .expect("first user list succeeds");
    engine
        .handle_message(message(2, "--list"))
        .await
        .expect("second user list succeeds");

    let blocks = transport.sent_blocks();
    assert_eq!(
        blocks[blocks.len() - 2..],
        [
            render_table(&[("laundry".to_string(), 1)]),
            render_table(&[("laundry".to_string(), 2)]),
        ]
    );
}

#[tokio::test]
async fn integration_decrementing_to_zero_empties_the_list_and_the_file() {
    let workspace = IsolatedWorkspace::new("zeroed");
    let transport = CapturingTransport::new();
    let engine = engine_in(workspace.root(), transport.clone());

    engine
        .handle_message(message(4, "--edit one off chore"))
        .await
        .expect("edit command succeeds");
    engine
        .handle_reaction(reaction(4, MessageId(500), DECREMENT_EMOJI))
        .await
        .expect("decrement succeeds");
    engine
        .handle_message(message(4, "--list"))
        .await
        .expect("list command succeeds");

    assert_eq!(
        transport.sent_blocks().last(),
        Some(&render_plain("Your task list is empty."))
    );
    let stores = TaskFileStore::new(workspace.root())
        .load_all()
        .expect("task files load");
    assert!(stores
        .get(&UserId(4))
        .expect("user file exists")
        .is_empty());
}

#[tokio::test]
async fn integration_roll_returns_the_only_task() {
    let workspace = IsolatedWorkspace::new("roll");
    let transport = CapturingTransport::new();
    let engine = engine_in(workspace.root(), transport.clone());

    engine
        .handle_message(message(3, "--edit sharpen saw"))
        .await
        .expect("edit command succeeds");
    engine
        .handle_message(message(3, "--roll"))
        .await
        .expect("roll command succeeds");

    assert_eq!(
        transport.sent_blocks().last(),
        Some(&render_plain("sharpen saw"))
    );
}
