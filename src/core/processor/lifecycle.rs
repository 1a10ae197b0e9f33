// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot lifecycle cell.
//!
//! A `LifecycleCell` guards a transition that must happen at most once over
//! an object's lifetime. A plain check-then-set boolean is insufficient under
//! concurrent triggers, so entry goes through a compare-and-set. The cell is
//! a tri-state rather than a bool so the observable "done" flag can be
//! published only after the guarded hook has returned: `is_done() == true`
//! therefore always means the hook has fully completed.

use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;

/// Atomic one-shot transition guard.
///
/// State machine: `Idle → Running → Done`, each edge taken at most once.
#[derive(Debug)]
pub(crate) struct LifecycleCell {
    state: AtomicU8,
}

impl LifecycleCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    /// Attempt to claim the transition. Returns true for exactly one caller;
    /// every other caller (concurrent or later) gets false.
    ///
    /// Uses `AcqRel` so the winner synchronizes with any prior completed
    /// state and losers observe the claim.
    pub(crate) fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Publish completion. Only the caller that won `try_begin` may call
    /// this, after the guarded work has returned.
    ///
    /// Uses `Ordering::Release` so all writes made by the guarded work are
    /// visible to any thread that subsequently observes `is_done()`.
    pub(crate) fn complete(&self) {
        self.state.store(DONE, Ordering::Release);
    }

    /// True once the transition has fully completed.
    ///
    /// Uses `Ordering::Acquire` to pair with `complete`.
    #[inline]
    pub(crate) fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) == DONE
    }

    /// True once the transition has been claimed, completed or not.
    #[cfg(test)]
    pub(crate) fn is_begun(&self) -> bool {
        self.state.load(Ordering::Acquire) != IDLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_transition_sequence() {
        let cell = LifecycleCell::new();
        assert!(!cell.is_begun());
        assert!(!cell.is_done());

        assert!(cell.try_begin());
        assert!(cell.is_begun());
        assert!(!cell.is_done());

        cell.complete();
        assert!(cell.is_done());
    }

    #[test]
    fn test_second_begin_loses() {
        let cell = LifecycleCell::new();
        assert!(cell.try_begin());
        assert!(!cell.try_begin());
        cell.complete();
        assert!(!cell.try_begin());
    }

    #[test]
    fn test_concurrent_begin_single_winner() {
        let cell = Arc::new(LifecycleCell::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let cell = Arc::clone(&cell);
            handles.push(thread::spawn(move || cell.try_begin()));
        }
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
    }
}
