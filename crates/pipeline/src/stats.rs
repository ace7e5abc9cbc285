// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-run statistics.

use std::time::Duration;
use summary_budget::Phase;

/// Timing and size figures for one digest run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RunStats {
    /// Time to open the container, if the pipeline opened it.
    pub open_duration: Duration,
    /// Time spent walking the container.
    pub walk_duration: Duration,
    /// Time spent aggregating layers.
    pub aggregate_duration: Duration,
    /// Time spent bounding the summary.
    pub truncate_duration: Duration,
    /// Records produced by the walk.
    pub records: usize,
    /// Dataset records among them.
    pub datasets: usize,
    /// Records carrying a data error.
    pub data_errors: usize,
    /// Phase the bounded summary came from.
    pub phase: Phase,
    /// Serialized size of the full summary.
    pub full_size: usize,
    /// Serialized size of the bounded summary.
    pub bounded_size: usize,
    /// Budget applied.
    pub budget_bytes: usize,
}

impl RunStats {
    /// Total time across all stages.
    pub fn total_duration(&self) -> Duration {
        self.open_duration + self.walk_duration + self.aggregate_duration + self.truncate_duration
    }

    /// Bounded size as a fraction of the full size.
    pub fn retained_ratio(&self) -> f64 {
        if self.full_size == 0 {
            return 1.0;
        }
        self.bounded_size as f64 / self.full_size as f64
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Digest: {:.2}ms total ({:.2}ms walk, {:.2}ms aggregate, {:.2}ms truncate), \
             {} records, {} datasets, {} data errors, phase {}, {} of {} bytes ({:.0}%), budget {} bytes",
            self.total_duration().as_secs_f64() * 1000.0,
            self.walk_duration.as_secs_f64() * 1000.0,
            self.aggregate_duration.as_secs_f64() * 1000.0,
            self.truncate_duration.as_secs_f64() * 1000.0,
            self.records,
            self.datasets,
            self.data_errors,
            self.phase,
            self.bounded_size,
            self.full_size,
            self.retained_ratio() * 100.0,
            self.budget_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> RunStats {
        RunStats {
            open_duration: Duration::from_millis(1),
            walk_duration: Duration::from_millis(2),
            aggregate_duration: Duration::from_millis(3),
            truncate_duration: Duration::from_millis(4),
            records: 7,
            datasets: 4,
            data_errors: 1,
            phase: Phase::NamesOnly,
            full_size: 2000,
            bounded_size: 500,
            budget_bytes: 512,
        }
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(stats().total_duration(), Duration::from_millis(10));
    }

    #[test]
    fn test_retained_ratio() {
        assert!((stats().retained_ratio() - 0.25).abs() < 1e-9);
        let empty = RunStats {
            full_size: 0,
            ..stats()
        };
        assert_eq!(empty.retained_ratio(), 1.0);
    }

    #[test]
    fn test_summary_format() {
        let s = stats().summary();
        assert!(s.contains("Digest:"));
        assert!(s.contains("7 records"));
        assert!(s.contains("phase names_only"));
        assert!(s.contains("500 of 2000 bytes"));
    }
}
