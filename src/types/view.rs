use serde::Serialize;

use super::{ChannelMode, Message};

/// Everything a display surface is allowed to see.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub transcript: Vec<Message>,
    pub mode: ChannelMode,
    pub typing: bool,
    pub agent_ready: bool,
}

impl ConversationView {
    pub fn last(&self) -> Option<&Message> {
        self.transcript.last()
    }

    /// The typing indicator belongs to the assistant channel only.
    pub fn shows_typing_indicator(&self) -> bool {
        self.typing && self.mode == ChannelMode::Assistant
    }
}
