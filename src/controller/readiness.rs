//! Learning that the human-agent desk can take messages.
//!
//! Two independent signals feed the same one-way `agent_ready` flag: a
//! periodic probe of the desk slot, and a hook chained onto the desk's own
//! ready notification. Whichever fires first flips the flag and cancels the
//! probe; the other then finds nothing left to do.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;

use super::{ConversationController, Inner};
use crate::desk::{AgentDesk, EntryPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadySignal {
    Probe,
    Hook,
}

pub(super) struct ReadinessWatch {
    poll: Mutex<Option<JoinHandle<()>>>,
    hook_installed: AtomicBool,
    feed_attached: AtomicBool,
    poll_stops: AtomicUsize,
}

impl ReadinessWatch {
    pub(super) fn new() -> Self {
        Self {
            poll: Mutex::new(None),
            hook_installed: AtomicBool::new(false),
            feed_attached: AtomicBool::new(false),
            poll_stops: AtomicUsize::new(0),
        }
    }

    fn poll_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poll.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReadinessWatch {
    fn drop(&mut self) {
        if let Some(handle) = self.poll_slot().take() {
            handle.abort();
        }
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<ConversationController> {
    weak.upgrade().map(|inner| ConversationController { inner })
}

impl ConversationController {
    pub(super) fn start_readiness_watch(&self) {
        if self.agent_ready() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.config.poll_interval;

        let mut slot = self.inner.readiness.poll_slot();
        if slot.is_some() {
            return;
        }

        log::debug!("Polling for agent desk every {:?}", interval);
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                // The probe holds no strong reference between ticks, so a
                // dropped conversation ends the loop.
                let Some(controller) = upgrade(&weak) else {
                    break;
                };
                if controller.probe_desk() {
                    break;
                }
            }
        }));
    }

    /// One probe of the desk slot. Returns `true` once the agent channel is
    /// ready.
    fn probe_desk(&self) -> bool {
        if self.agent_ready() {
            return true;
        }

        let Some(desk) = self.inner.desk.get() else {
            return false;
        };

        self.install_ready_hook(desk.as_ref());

        if desk.is_message_capable() {
            self.mark_agent_ready(ReadySignal::Probe);
            return true;
        }

        false
    }

    fn install_ready_hook(&self, desk: &dyn AgentDesk) {
        if !desk.supports(EntryPoint::ReadyHook)
            || self.inner.readiness.hook_installed.swap(true, Ordering::SeqCst)
        {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let hook = Box::new(move || {
            if let Some(controller) = upgrade(&weak) {
                controller.mark_agent_ready(ReadySignal::Hook);
            }
        });

        if let Err(e) = desk.on_ready(hook) {
            log::warn!("Desk advertised a ready hook but refused it: {}", e);
            self.inner.readiness.hook_installed.store(false, Ordering::SeqCst);
        }
    }

    /// Sets `agent_ready`. Safe to call any number of times from either
    /// signal; the flag never goes back to false.
    pub(crate) fn mark_agent_ready(&self, signal: ReadySignal) {
        let newly_ready = self.inner.state.send_if_modified(|state| {
            if state.agent_ready {
                false
            } else {
                state.agent_ready = true;
                true
            }
        });

        self.stop_readiness_poll();

        if newly_ready {
            log::info!(
                "Agent channel ready for {} (via {:?})",
                self.inner.session,
                signal
            );
            self.attach_agent_feed();
        }
    }

    pub(super) fn stop_readiness_poll(&self) {
        let handle = self.inner.readiness.poll_slot().take();
        if let Some(handle) = handle {
            handle.abort();
            self.inner.readiness.poll_stops.fetch_add(1, Ordering::SeqCst);
            log::debug!("Stopped agent desk polling");
        }
    }

    pub fn is_polling_for_agent(&self) -> bool {
        self.inner
            .readiness
            .poll_slot()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn attach_agent_feed(&self) {
        let Some(desk) = self.inner.desk.get() else {
            return;
        };
        if !desk.supports(EntryPoint::MessageFeed)
            || self.inner.readiness.feed_attached.swap(true, Ordering::SeqCst)
        {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let handler = Arc::new(move |text: String| match upgrade(&weak) {
            Some(controller) => controller.ingest_agent_message(&text),
            None => log::debug!("Agent message arrived after conversation ended"),
        });

        if let Err(e) = desk.on_message(handler) {
            log::warn!("Could not subscribe to agent messages: {}", e);
            self.inner.readiness.feed_attached.store(false, Ordering::SeqCst);
        }
    }
}
