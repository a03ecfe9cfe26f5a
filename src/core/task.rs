//! Cooperative cancellation and single-operation enforcement.
//!
//! Long-running operations poll a [`CancellationToken`] between
//! unit-of-work items and exit cleanly without rolling back partial
//! progress. Each component owns an [`OperationGuard`]; a second
//! request while one is active is rejected immediately, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable flag for cooperative cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The running operation observes the flag
    /// at its next check point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Enforces the one-operation-at-a-time invariant for a component.
#[derive(Debug, Default)]
pub struct OperationGuard {
    busy: AtomicBool,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the component for one operation.
    ///
    /// Returns None when an operation is already running; the permit
    /// releases the guard when dropped.
    pub fn try_begin(&self) -> Option<OperationPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| OperationPermit { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// RAII permit for a claimed [`OperationGuard`].
pub struct OperationPermit<'a> {
    guard: &'a OperationGuard,
}

impl Drop for OperationPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn guard_rejects_second_claim() {
        let guard = OperationGuard::new();
        let permit = guard.try_begin().unwrap();
        assert!(guard.try_begin().is_none());
        assert!(guard.is_busy());
        drop(permit);
        assert!(guard.try_begin().is_some());
    }
}
