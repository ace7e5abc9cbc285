// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The retry loop.

use crate::{CancelToken, GuardError, RetryPolicy, SendError};
use serde_json::Value;
use summary_budget::{truncate_payload, ByteBudget, PayloadStage};

/// A successful guarded send.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    /// What the send callback returned.
    pub response: T,
    /// Attempt that succeeded (1-based).
    pub attempts: u32,
    /// How far the delivered payload was reduced.
    pub stage: PayloadStage,
    /// Serialized size of the delivered payload.
    pub size: usize,
}

/// Sends `payload` through `send`, retrying oversized-request failures.
///
/// Before every attempt the payload is re-truncated from the original with
/// [`RetryPolicy::budget_for_attempt`], so each retry is smaller. Failures
/// rejected by the policy's predicate are returned at once as
/// [`GuardError::Transport`]. Backoff waits block the calling thread and
/// end early if `cancel` fires.
pub fn send_with_retry<T, F>(
    policy: &RetryPolicy,
    payload: &Value,
    budget: ByteBudget,
    cancel: &CancelToken,
    mut send: F,
) -> Result<Delivery<T>, GuardError>
where
    F: FnMut(&Value) -> Result<T, SendError>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return Err(GuardError::Cancelled { attempt });
        }

        let attempt_budget = policy.budget_for_attempt(budget, attempt);
        let outbound = truncate_payload(payload, attempt_budget)?;
        tracing::debug!(
            "guard: attempt {attempt}/{max_attempts}, {} bytes ({:?}, budget {attempt_budget})",
            outbound.size,
            outbound.stage,
        );

        let err = match send(&outbound.payload) {
            Ok(response) => {
                if attempt > 1 {
                    tracing::info!("guard: delivered on attempt {attempt}");
                }
                return Ok(Delivery {
                    response,
                    attempts: attempt,
                    stage: outbound.stage,
                    size: outbound.size,
                });
            }
            Err(err) => err,
        };

        if !(policy.is_retryable)(&err) {
            tracing::debug!("guard: not retrying: {err}");
            return Err(GuardError::Transport(err));
        }
        if attempt >= max_attempts {
            tracing::warn!("guard: giving up after {attempt} attempts: {err}");
            return Err(GuardError::MaxRetriesExceeded {
                attempts: attempt,
                last: err,
            });
        }

        let delay = policy.delay_after_attempt(attempt);
        tracing::warn!("guard: attempt {attempt} failed ({err}), retrying in {delay:?}");
        attempt += 1;
        if cancel.wait_timeout(delay) {
            return Err(GuardError::Cancelled { attempt });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use summary_budget::serialized_len;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            backoff_unit: Duration::ZERO,
            ..Default::default()
        }
    }

    fn payload() -> Value {
        json!({
            "model_info": {
                "model_name": "m",
                "total_layers": 2,
                "total_parameters": 67,
                "layers": [{"name": "dense_1"}, {"name": "dense_2"}],
            }
        })
    }

    fn too_large() -> SendError {
        SendError::PayloadTooLarge("413".into())
    }

    #[test]
    fn test_first_attempt_succeeds() {
        let mut calls = 0;
        let d = send_with_retry(&fast_policy(), &payload(), ByteBudget::from_kb(4), &CancelToken::new(), |p| {
            calls += 1;
            Ok(p.clone())
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(d.attempts, 1);
        assert_eq!(d.stage, PayloadStage::Unchanged);
        assert_eq!(d.response, payload());
    }

    #[test]
    fn test_retries_with_smaller_payload() {
        let mut sizes = Vec::new();
        let d = send_with_retry(&fast_policy(), &payload(), ByteBudget::from_bytes(200), &CancelToken::new(), |p| {
            sizes.push(serialized_len(p).unwrap());
            if sizes.len() < 2 {
                Err(too_large())
            } else {
                Ok(())
            }
        })
        .unwrap();
        assert_eq!(d.attempts, 2);
        assert_eq!(sizes.len(), 2);
        assert!(sizes[1] < sizes[0], "{sizes:?}");
        assert!(sizes[1] <= 100);
    }

    #[test]
    fn test_non_retryable_propagates_immediately() {
        let mut calls = 0;
        let err = send_with_retry(&fast_policy(), &payload(), ByteBudget::from_kb(4), &CancelToken::new(), |_| {
            calls += 1;
            Err::<(), _>(SendError::Status {
                status: 401,
                body: "unauthorized".into(),
            })
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, GuardError::Transport(SendError::Status { status: 401, .. })));
    }

    #[test]
    fn test_exhaustion() {
        let mut calls = 0;
        let err = send_with_retry(&fast_policy(), &payload(), ByteBudget::from_kb(4), &CancelToken::new(), |_| {
            calls += 1;
            Err::<(), _>(too_large())
        })
        .unwrap_err();
        assert_eq!(calls, 3);
        assert!(matches!(err, GuardError::MaxRetriesExceeded { attempts: 3, .. }));
    }

    #[test]
    fn test_custom_predicate() {
        let policy = fast_policy().retry_when(|e| matches!(e, SendError::Request(_)));
        let mut calls = 0;
        let err = send_with_retry(&policy, &payload(), ByteBudget::from_kb(4), &CancelToken::new(), |_| {
            calls += 1;
            Err::<(), _>(SendError::Request("timed out".into()))
        })
        .unwrap_err();
        assert_eq!(calls, 3);
        assert!(matches!(err, GuardError::MaxRetriesExceeded { .. }));
    }

    #[test]
    fn test_cancelled_before_first_attempt() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut calls = 0;
        let err = send_with_retry(&fast_policy(), &payload(), ByteBudget::from_kb(4), &cancel, |_| {
            calls += 1;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(calls, 0);
        assert!(matches!(err, GuardError::Cancelled { attempt: 1 }));
    }

    #[test]
    fn test_cancel_interrupts_backoff() {
        let policy = RetryPolicy {
            backoff_unit: Duration::from_secs(30),
            ..Default::default()
        };
        let cancel = CancelToken::with_timeout(Duration::from_millis(50));
        let start = Instant::now();
        let err = send_with_retry(&policy, &payload(), ByteBudget::from_kb(4), &cancel, |_| Err::<(), _>(too_large()))
            .unwrap_err();
        assert!(matches!(err, GuardError::Cancelled { attempt: 2 }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_waits_between_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            backoff_unit: Duration::from_millis(10),
            ..Default::default()
        };
        let start = Instant::now();
        let _ = send_with_retry(&policy, &payload(), ByteBudget::from_kb(4), &CancelToken::new(), |_| {
            Err::<(), _>(too_large())
        });
        // One wait of 10ms × 2^1.
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
