use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::hooks::ReadyHooks;
use super::traits::{AgentDesk, DeskError, EntryPoint, MessageHandler, ReadyHook};

/// An in-process desk. Exposes whichever entry points it was built with and
/// records everything sent through it.
pub struct InMemoryDesk {
    entry_points: HashSet<EntryPoint>,
    ready: ReadyHooks,
    handlers: Mutex<Vec<MessageHandler>>,
    sent: Mutex<Vec<String>>,
    offline: Mutex<Vec<String>>,
    rejecting: AtomicBool,
    chat_started: AtomicBool,
    window_visible: AtomicBool,
}

fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryDesk {
    pub fn new() -> Self {
        Self::with_entry_points(&[
            EntryPoint::ReadyHook,
            EntryPoint::SendMessage,
            EntryPoint::OfflineMessage,
            EntryPoint::StartChat,
            EntryPoint::ShowWindow,
            EntryPoint::MessageFeed,
        ])
    }

    pub fn with_entry_points(entry_points: &[EntryPoint]) -> Self {
        Self {
            entry_points: entry_points.iter().copied().collect(),
            ready: ReadyHooks::new(),
            handlers: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            offline: Mutex::new(Vec::new()),
            rejecting: AtomicBool::new(false),
            chat_started: AtomicBool::new(false),
            window_visible: AtomicBool::new(false),
        }
    }

    /// Runs every chained ready hook.
    pub fn announce_ready(&self) {
        self.ready.fire();
    }

    /// Delivers a message typed by a human agent to every subscriber.
    pub fn push_agent_message(&self, text: impl Into<String>) {
        let text = text.into();
        let handlers = guard(&self.handlers).clone();
        for handler in handlers {
            handler(text.clone());
        }
    }

    /// Makes every send entry point fail until switched back.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    pub fn sent_messages(&self) -> Vec<String> {
        guard(&self.sent).clone()
    }

    pub fn offline_messages(&self) -> Vec<String> {
        guard(&self.offline).clone()
    }

    pub fn subscriber_count(&self) -> usize {
        guard(&self.handlers).len()
    }

    pub fn chat_started(&self) -> bool {
        self.chat_started.load(Ordering::SeqCst)
    }

    pub fn window_visible(&self) -> bool {
        self.window_visible.load(Ordering::SeqCst)
    }

    fn check(&self, entry: EntryPoint) -> Result<(), DeskError> {
        if !self.supports(entry) {
            return Err(DeskError::Unsupported(entry));
        }
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(DeskError::Rejected(format!("{} unavailable", entry.as_str())));
        }
        Ok(())
    }
}

impl Default for InMemoryDesk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentDesk for InMemoryDesk {
    fn supports(&self, entry: EntryPoint) -> bool {
        self.entry_points.contains(&entry)
    }

    fn on_ready(&self, hook: ReadyHook) -> Result<(), DeskError> {
        if !self.supports(EntryPoint::ReadyHook) {
            return Err(DeskError::Unsupported(EntryPoint::ReadyHook));
        }
        self.ready.register(hook);
        Ok(())
    }

    fn on_message(&self, handler: MessageHandler) -> Result<(), DeskError> {
        if !self.supports(EntryPoint::MessageFeed) {
            return Err(DeskError::Unsupported(EntryPoint::MessageFeed));
        }
        guard(&self.handlers).push(handler);
        Ok(())
    }

    async fn send_message(&self, text: &str) -> Result<(), DeskError> {
        self.check(EntryPoint::SendMessage)?;
        guard(&self.sent).push(text.to_string());
        Ok(())
    }

    async fn send_offline_message(&self, text: &str) -> Result<(), DeskError> {
        self.check(EntryPoint::OfflineMessage)?;
        guard(&self.offline).push(text.to_string());
        Ok(())
    }

    async fn start_chat(&self) -> Result<(), DeskError> {
        self.check(EntryPoint::StartChat)?;
        self.chat_started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn show_window(&self) -> Result<(), DeskError> {
        self.check(EntryPoint::ShowWindow)?;
        self.window_visible.store(true, Ordering::SeqCst);
        Ok(())
    }
}
