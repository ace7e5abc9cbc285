// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte budgets and serialized-size measurement.
//!
//! A [`ByteBudget`] is the ceiling on the UTF-8 byte length of a compact
//! JSON serialization. It supports human-readable string parsing for CLI
//! and config ergonomics.

use crate::BudgetError;
use std::fmt;
use std::io;

/// A ceiling on serialized size, in bytes.
///
/// # Parsing
/// Binary multiples, case-insensitive:
/// - `"8K"` or `"8KB"` → 8 × 1024 bytes
/// - `"1M"` or `"1MB"` → 1 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"4096"` or `"4096B"` → raw byte count
///
/// # Examples
/// ```
/// use summary_budget::ByteBudget;
///
/// let b = ByteBudget::parse("8K").unwrap();
/// assert_eq!(b.as_bytes(), 8192);
/// assert_eq!(b.to_string(), "8 KB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ByteBudget {
    bytes: usize,
}

impl ByteBudget {
    /// Creates a budget from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a budget from kilobytes.
    pub fn from_kb(kb: usize) -> Self {
        Self {
            bytes: kb.saturating_mul(1024),
        }
    }

    /// Returns the budget in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns `true` if `size` bytes fit within the budget.
    pub fn admits(&self, size: usize) -> bool {
        size <= self.bytes
    }

    /// Returns a tighter budget scaled by `factor`, never below one byte.
    ///
    /// Factors outside `0.0..=1.0` are clamped, so the result never grows.
    pub fn shrink(&self, factor: f64) -> Self {
        let factor = if factor.is_nan() { 1.0 } else { factor.clamp(0.0, 1.0) };
        let bytes = (self.bytes as f64 * factor).floor() as usize;
        Self {
            bytes: bytes.clamp(1, self.bytes.max(1)),
        }
    }

    /// Parses a human-readable budget string.
    pub fn parse(s: &str) -> Result<Self, BudgetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BudgetError::Zero);
        }

        let s_upper = s.to_uppercase();
        let (num_str, multiplier) = if s_upper.ends_with("GB") {
            (&s[..s.len() - 2], 1024 * 1024 * 1024)
        } else if s_upper.ends_with('G') {
            (&s[..s.len() - 1], 1024 * 1024 * 1024)
        } else if s_upper.ends_with("MB") {
            (&s[..s.len() - 2], 1024 * 1024)
        } else if s_upper.ends_with('M') {
            (&s[..s.len() - 1], 1024 * 1024)
        } else if s_upper.ends_with("KB") {
            (&s[..s.len() - 2], 1024)
        } else if s_upper.ends_with('K') {
            (&s[..s.len() - 1], 1024)
        } else if s_upper.ends_with('B') {
            (&s[..s.len() - 1], 1)
        } else {
            (s, 1)
        };

        let value: usize = num_str
            .trim()
            .parse()
            .map_err(|_| BudgetError::Invalid(s.to_string()))?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| BudgetError::Overflow(s.to_string()))?;

        if bytes == 0 {
            return Err(BudgetError::Zero);
        }

        Ok(Self { bytes })
    }
}

impl std::str::FromStr for ByteBudget {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ByteBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= 1024 * 1024 * 1024 && self.bytes % (1024 * 1024 * 1024) == 0 {
            write!(f, "{} GB", self.bytes / (1024 * 1024 * 1024))
        } else if self.bytes >= 1024 * 1024 && self.bytes % (1024 * 1024) == 0 {
            write!(f, "{} MB", self.bytes / (1024 * 1024))
        } else if self.bytes >= 1024 && self.bytes % 1024 == 0 {
            write!(f, "{} KB", self.bytes / 1024)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}

/// Counts bytes written without keeping them.
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Byte length of the compact JSON serialization of `value`.
pub fn serialized_len<T: serde::Serialize + ?Sized>(value: &T) -> Result<usize, BudgetError> {
    let mut counter = ByteCounter(0);
    serde_json::to_writer(&mut counter, value)?;
    Ok(counter.0)
}
