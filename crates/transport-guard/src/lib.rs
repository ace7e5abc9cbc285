// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # transport-guard
//!
//! Wraps an outbound send with bounded retries. Only failures that say the
//! request was too large are retried; each retry waits with exponential
//! backoff and sends a payload re-truncated to a tighter budget.
//!
//! The send itself is a caller-supplied closure, so the guard has no
//! network dependency and is tested with plain closures.
//!
//! # Example
//! ```
//! use summary_budget::ByteBudget;
//! use transport_guard::{send_with_retry, CancelToken, RetryPolicy, SendError};
//!
//! let policy = RetryPolicy { backoff_unit: std::time::Duration::ZERO, ..Default::default() };
//! let payload = serde_json::json!({"model_info": {"model_name": "m"}});
//! let mut calls = 0;
//! let delivery = send_with_retry(&policy, &payload, ByteBudget::from_kb(1), &CancelToken::new(), |_| {
//!     calls += 1;
//!     if calls == 1 { Err(SendError::PayloadTooLarge("413".into())) } else { Ok("ok") }
//! })
//! .unwrap();
//! assert_eq!(delivery.attempts, 2);
//! ```

mod cancel;
mod error;
mod guard;
mod policy;

pub use cancel::CancelToken;
pub use error::{GuardError, SendError};
pub use guard::{send_with_retry, Delivery};
pub use policy::{is_oversized_error, RetryPolicy};
