use std::sync::{Mutex, PoisonError};

use super::traits::ReadyHook;

#[derive(Default)]
struct HookState {
    fired: bool,
    pending: Vec<ReadyHook>,
}

/// Ready notifications that chain instead of replacing each other.
/// Every registered hook runs exactly once; hooks registered after the
/// desk fired run immediately.
#[derive(Default)]
pub struct ReadyHooks {
    state: Mutex<HookState>,
}

impl ReadyHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, hook: ReadyHook) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.fired {
            drop(state);
            hook();
        } else {
            state.pending.push(hook);
        }
    }

    pub fn fire(&self) {
        let hooks = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.fired = true;
            std::mem::take(&mut state.pending)
        };

        // Hooks run outside the lock so they may register further hooks.
        for hook in hooks {
            hook();
        }
    }

    pub fn has_fired(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).fired
    }

    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_hook(counter: &Arc<AtomicUsize>) -> ReadyHook {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_hooks_chain_without_clobbering() {
        let hooks = ReadyHooks::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        hooks.register(counting_hook(&first));
        hooks.register(counting_hook(&second));
        assert_eq!(hooks.pending(), 2);

        hooks.fire();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert!(hooks.has_fired());
    }

    #[test]
    fn test_fire_twice_runs_each_hook_once() {
        let hooks = ReadyHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        hooks.register(counting_hook(&counter));

        hooks.fire();
        hooks.fire();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_registration_runs_immediately() {
        let hooks = ReadyHooks::new();
        hooks.fire();

        let counter = Arc::new(AtomicUsize::new(0));
        hooks.register(counting_hook(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.pending(), 0);
    }
}
