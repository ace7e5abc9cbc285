// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Retry policy: attempt count, backoff schedule, budget tightening.

use crate::SendError;
use std::fmt;
use std::time::Duration;
use summary_budget::ByteBudget;

/// Configuration for guarded sends.
///
/// Attempts are 1-based. After failed attempt `k` the guard waits
/// `backoff_unit × backoff_factor^k` (capped at `max_delay`), and attempt
/// `k` sends the payload truncated to `budget × budget_shrink^(k-1)`.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Backoff multiplier.
    pub backoff_factor: f64,
    /// Base unit of the backoff wait.
    pub backoff_unit: Duration,
    /// Upper bound on a single wait.
    pub max_delay: Duration,
    /// Budget multiplier applied per retry.
    pub budget_shrink: f64,
    /// Decides whether a failure is worth another attempt.
    pub is_retryable: fn(&SendError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: 2.0,
            backoff_unit: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            budget_shrink: 0.5,
            is_retryable: is_oversized_error,
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff_factor", &self.backoff_factor)
            .field("backoff_unit", &self.backoff_unit)
            .field("max_delay", &self.max_delay)
            .field("budget_shrink", &self.budget_shrink)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// A default policy with the given number of attempts.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Replaces the retry predicate.
    pub fn retry_when(mut self, is_retryable: fn(&SendError) -> bool) -> Self {
        self.is_retryable = is_retryable;
        self
    }

    /// Number of attempts actually made at most.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.backoff_unit.as_secs_f64() * self.backoff_factor.powi(exponent);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Budget used for attempt `attempt` (1-based).
    pub fn budget_for_attempt(&self, base: ByteBudget, attempt: u32) -> ByteBudget {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        base.shrink(self.budget_shrink.powi(exponent))
    }
}

/// Default predicate: the receiver said the request was too big.
///
/// Matches [`SendError::PayloadTooLarge`], HTTP 413, and error text
/// mentioning "too large", "context length" or "maximum context".
pub fn is_oversized_error(err: &SendError) -> bool {
    let text = match err {
        SendError::PayloadTooLarge(_) => return true,
        SendError::Status { status: 413, .. } => return true,
        SendError::Status { body, .. } => body,
        SendError::Request(message) => message,
    };
    let lower = text.to_lowercase();
    ["too large", "context length", "maximum context"]
        .iter()
        .any(|p| lower.contains(p))
}
