// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for budgets and truncation.
//!
//! Running out of budget is not an error: the truncators always return
//! their smallest form.

/// Errors from budget parsing and size measurement.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// The budget string was empty or resolved to zero bytes.
    #[error("byte budget must be a positive size")]
    Zero,

    /// The budget string could not be parsed.
    #[error("invalid budget string: '{0}' (expected a number with an optional K, KB, M, MB, G or GB suffix)")]
    Invalid(String),

    /// The budget does not fit in a `usize`.
    #[error("budget overflow: '{0}'")]
    Overflow(String),

    /// A value could not be serialized to measure its size.
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}
