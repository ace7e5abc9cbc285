// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for guarded sends.

use summary_budget::BudgetError;

/// A single failed send, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The receiver rejected the request as too large.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The receiver answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be completed.
    #[error("request failed: {0}")]
    Request(String),
}

/// Terminal failures of [`crate::send_with_retry`].
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// A failure the retry predicate rejected; not retried.
    #[error("transport error: {0}")]
    Transport(SendError),

    /// Every attempt failed with a retryable error.
    #[error("max retries exceeded after {attempts} attempts: {last}")]
    MaxRetriesExceeded { attempts: u32, last: SendError },

    /// The cancel token fired before the given attempt.
    #[error("cancelled before attempt {attempt}")]
    Cancelled { attempt: u32 },

    /// The outbound payload could not be measured.
    #[error(transparent)]
    Budget(#[from] BudgetError),
}
