use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// The entry points a third-party live-agent script may or may not expose.
/// Nothing about a desk's shape is assumed; callers probe with
/// [`AgentDesk::supports`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryPoint {
    ReadyHook,
    SendMessage,
    OfflineMessage,
    StartChat,
    ShowWindow,
    MessageFeed,
}

impl EntryPoint {
    pub const MESSAGE_CAPABLE: [EntryPoint; 2] = [EntryPoint::SendMessage, EntryPoint::OfflineMessage];

    pub fn as_str(&self) -> &str {
        match self {
            EntryPoint::ReadyHook => "ready",
            EntryPoint::SendMessage => "chat.send",
            EntryPoint::OfflineMessage => "offline.send",
            EntryPoint::StartChat => "chat.start",
            EntryPoint::ShowWindow => "window.show",
            EntryPoint::MessageFeed => "chat.onmessage",
        }
    }
}

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("desk does not expose {}", .0.as_str())]
    Unsupported(EntryPoint),

    #[error("desk rejected the call: {0}")]
    Rejected(String),
}

pub type ReadyHook = Box<dyn FnOnce() + Send>;
pub type MessageHandler = Arc<dyn Fn(String) + Send + Sync>;

#[async_trait]
pub trait AgentDesk: Send + Sync {
    fn supports(&self, entry: EntryPoint) -> bool;

    /// Chains `hook` after whatever the desk already runs on readiness.
    fn on_ready(&self, _hook: ReadyHook) -> Result<(), DeskError> {
        Err(DeskError::Unsupported(EntryPoint::ReadyHook))
    }

    fn on_message(&self, _handler: MessageHandler) -> Result<(), DeskError> {
        Err(DeskError::Unsupported(EntryPoint::MessageFeed))
    }

    async fn send_message(&self, _text: &str) -> Result<(), DeskError> {
        Err(DeskError::Unsupported(EntryPoint::SendMessage))
    }

    async fn send_offline_message(&self, _text: &str) -> Result<(), DeskError> {
        Err(DeskError::Unsupported(EntryPoint::OfflineMessage))
    }

    async fn start_chat(&self) -> Result<(), DeskError> {
        Err(DeskError::Unsupported(EntryPoint::StartChat))
    }

    async fn show_window(&self) -> Result<(), DeskError> {
        Err(DeskError::Unsupported(EntryPoint::ShowWindow))
    }

    fn is_message_capable(&self) -> bool {
        EntryPoint::MESSAGE_CAPABLE.iter().any(|e| self.supports(*e))
    }
}
