// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cooperative cancellation for blocking backoff waits.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct State {
    cancelled: Mutex<bool>,
    wake: Condvar,
    deadline: Option<Instant>,
}

/// A clonable cancellation flag with an optional deadline.
///
/// Clones share state: cancelling one cancels all. Waits through
/// [`CancelToken::wait_timeout`] return early when the token is cancelled
/// or its deadline passes.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<State>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token that is cancelled only explicitly.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A token that also counts as cancelled once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Instant::now().checked_add(timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            state: Arc::new(State {
                cancelled: Mutex::new(false),
                wake: Condvar::new(),
                deadline,
            }),
        }
    }

    /// Cancels the token and wakes every waiter.
    pub fn cancel(&self) {
        let mut cancelled = self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.state.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            || self.deadline_passed()
    }

    fn deadline_passed(&self) -> bool {
        self.state
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Blocks for up to `duration`. Returns `true` if the token was
    /// cancelled before or during the wait.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let mut until = Instant::now().checked_add(duration);
        if let Some(deadline) = self.state.deadline {
            until = Some(until.map_or(deadline, |u| u.min(deadline)));
        }

        let mut cancelled = self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let remaining = match until {
                Some(until) => until.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            if remaining.is_zero() {
                break;
            }
            cancelled = self
                .state
                .wake
                .wait_timeout(cancelled, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        let explicit = *cancelled;
        drop(cancelled);
        explicit || self.deadline_passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_cancel_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_wait_elapses_without_cancel() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(!token.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancel_wakes_waiter() {
        let token = CancelToken::new();
        let canceller = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            canceller.cancel();
        });
        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        handle.join().unwrap();
    }

    #[test]
    fn test_deadline_cuts_wait_short() {
        let token = CancelToken::with_timeout(Duration::from_millis(20));
        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_already_cancelled_returns_immediately() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.wait_timeout(Duration::from_secs(30)));
    }
}
