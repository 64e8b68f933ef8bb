pub mod hooks;
pub mod memory;
pub mod traits;

pub use hooks::ReadyHooks;
pub use memory::InMemoryDesk;
pub use traits::{AgentDesk, DeskError, EntryPoint, MessageHandler, ReadyHook};

use std::sync::{Arc, PoisonError, RwLock};

/// Where a live-agent desk lands once its script has loaded. Empty until
/// then, and possibly forever.
#[derive(Clone, Default)]
pub struct DeskSlot {
    inner: Arc<RwLock<Option<Arc<dyn AgentDesk>>>>,
}

impl DeskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&self, desk: Arc<dyn AgentDesk>) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(desk);
    }

    pub fn get(&self) -> Option<Arc<dyn AgentDesk>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}
