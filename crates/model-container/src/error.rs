// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for container access and traversal.

use std::path::PathBuf;

/// Top-level failures: the container cannot be opened or walked at all.
///
/// Any of these replaces the whole result; the walker never returns a
/// partial tree alongside one.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The container file could not be opened or mapped.
    #[error("cannot open container '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container header is malformed.
    #[error("malformed container header: {0}")]
    Header(String),

    /// Two entries claim the same path, or a dataset is used as a group.
    #[error("conflicting entry at '{path}': {detail}")]
    Conflict { path: String, detail: String },

    /// Group nesting is deeper than the walker allows.
    #[error("container nesting exceeds maximum depth of {max_depth} at '{path}'")]
    TooDeep { path: String, max_depth: usize },
}

/// A single attribute value that has no JSON representation.
///
/// Recoverable: the walker records it on the owning node and continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    /// A byte-string attribute is not valid UTF-8.
    #[error("byte-string is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// NaN and infinities cannot be written as JSON numbers.
    #[error("float value {0} has no JSON representation")]
    NonFiniteFloat(f64),
}
