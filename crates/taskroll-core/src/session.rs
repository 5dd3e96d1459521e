//! Per-user edit session state.

use crate::ids::{ChannelId, MessageId};

/// An open edit: the bot message carrying the reaction controls and the
/// task those controls adjust.
///
/// A user holds at most one. A new edit replaces it outright; list and
/// roll clear it. The superseded message stays in the channel but its
/// reactions no longer do anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub channel: ChannelId,
    pub message: MessageId,
    pub task: String,
}

impl EditSession {
    /// True when a reaction landed on this session's message.
    pub fn matches(&self, message: MessageId) -> bool {
        self.message == message
    }
}
