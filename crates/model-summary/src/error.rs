// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for summary aggregation.

/// Top-level aggregation failures.
///
/// Per-weight problems never surface here; they are carried on the
/// [`crate::Weight`] as a `data_error` marker.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// The walked tree has no records at all.
    #[error("walked tree for '{model}' is empty")]
    EmptyTree { model: String },

    /// The first record is not a group.
    #[error("walked tree for '{model}' does not start with a root group")]
    RootNotGroup { model: String },
}
