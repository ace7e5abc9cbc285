// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The digest pipeline: walk, aggregate, bound, and optionally relay.
//!
//! ```text
//! Container ──walk──▶ ModelTree ──aggregate──▶ ModelSummary ──truncate──▶ SummaryView
//!   (dropped here)                                  │
//!                                                   └──relay (guarded)──▶ receiver
//! ```

use crate::{DigestConfig, ErrorReport, PipelineError, RunStats};
use model_container::{Container, SafeTensorsContainer, Walker};
use model_summary::{aggregate, ModelSummary};
use serde_json::{json, Value};
use std::path::Path;
use std::time::{Duration, Instant};
use summary_budget::{serialized_len, truncate_summary, ByteBudget, SummaryView, Truncation};
use transport_guard::{send_with_retry, CancelToken, Delivery, RetryPolicy, SendError};

/// The outcome of one successful run.
#[derive(Debug, Clone)]
pub struct Digest {
    /// The full-fidelity summary. Never modified by truncation.
    pub summary: ModelSummary,
    /// The bounded view of `summary`.
    pub bounded: Truncation,
    pub stats: RunStats,
}

impl Digest {
    /// The bounded view as JSON.
    pub fn to_value(&self) -> Result<Value, PipelineError> {
        serde_json::to_value(&self.bounded.view).map_err(|e| PipelineError::BudgetError(e.into()))
    }

    /// The payload sent by [`Digester::relay`]: the bounded view under `model_info`.
    pub fn relay_payload(&self) -> Result<Value, PipelineError> {
        Ok(json!({ "model_info": self.to_value()? }))
    }

    pub fn view(&self) -> &SummaryView {
        &self.bounded.view
    }
}

/// Runs the pipeline with fixed budgets and limits.
#[derive(Debug, Clone)]
pub struct Digester {
    walker: Walker,
    summary_budget: ByteBudget,
    payload_budget: ByteBudget,
    policy: RetryPolicy,
}

impl Digester {
    /// A digester with the given summary budget and defaults elsewhere.
    pub fn new(summary_budget: ByteBudget) -> Self {
        Self {
            walker: Walker::new(),
            summary_budget,
            payload_budget: summary_budget,
            policy: RetryPolicy::default(),
        }
    }

    /// Builds a digester from a validated configuration.
    pub fn from_config(config: &DigestConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            walker: config.walker(),
            summary_budget: config.parse_summary_budget()?,
            payload_budget: config.parse_payload_budget()?,
            policy: config.retry_policy(),
        })
    }

    pub fn with_walker(mut self, walker: Walker) -> Self {
        self.walker = walker;
        self
    }

    pub fn with_payload_budget(mut self, budget: ByteBudget) -> Self {
        self.payload_budget = budget;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn summary_budget(&self) -> ByteBudget {
        self.summary_budget
    }

    pub fn payload_budget(&self) -> ByteBudget {
        self.payload_budget
    }

    /// Digests a container, taking ownership of it.
    ///
    /// The container is released as soon as the walk finishes, before
    /// aggregation starts.
    pub fn digest<C: Container>(&self, container: C) -> Result<Digest, PipelineError> {
        self.digest_owned(container, Duration::ZERO)
    }

    /// Opens a SafeTensors file and digests it.
    pub fn digest_file(&self, path: &Path) -> Result<Digest, PipelineError> {
        let start = Instant::now();
        let container = SafeTensorsContainer::open_with_max_depth(path, self.walker.max_depth())?;
        self.digest_owned(container, start.elapsed())
    }

    fn digest_owned<C: Container>(&self, container: C, open_duration: Duration) -> Result<Digest, PipelineError> {
        let start = Instant::now();
        let tree = self.walker.walk(&container)?;
        drop(container);
        let walk_duration = start.elapsed();

        let start = Instant::now();
        let summary = aggregate(&tree)?;
        let aggregate_duration = start.elapsed();

        let start = Instant::now();
        let bounded = truncate_summary(&summary, self.summary_budget)?;
        let full_size = serialized_len(&summary)?;
        let truncate_duration = start.elapsed();

        let stats = RunStats {
            open_duration,
            walk_duration,
            aggregate_duration,
            truncate_duration,
            records: tree.records.len(),
            datasets: tree.dataset_count(),
            data_errors: tree.error_count(),
            phase: bounded.phase,
            full_size,
            bounded_size: bounded.size,
            budget_bytes: self.summary_budget.as_bytes(),
        };
        tracing::info!("pipeline: '{}': {}", summary.model_name(), stats.summary());

        Ok(Digest {
            summary,
            bounded,
            stats,
        })
    }

    /// Digests a container and returns the response object: the bounded
    /// summary, or an [`ErrorReport`] if the run failed.
    pub fn respond<C: Container>(&self, container: C) -> Value {
        let model_name = container.name().to_string();
        into_response(self.digest(container), Some(&model_name))
    }

    /// Like [`Digester::respond`], opening the file first.
    pub fn respond_file(&self, path: &Path) -> Value {
        let model_name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        into_response(self.digest_file(path), model_name.as_deref())
    }

    /// Sends the bounded summary through `send`, guarded by the retry policy.
    pub fn relay<T, F>(&self, digest: &Digest, cancel: &CancelToken, send: F) -> Result<Delivery<T>, PipelineError>
    where
        F: FnMut(&Value) -> Result<T, SendError>,
    {
        let payload = digest.relay_payload()?;
        let delivery = send_with_retry(&self.policy, &payload, self.payload_budget, cancel, send)?;
        tracing::info!(
            "pipeline: relayed '{}' in {} attempt(s), {} bytes ({:?})",
            digest.view().model_name(),
            delivery.attempts,
            delivery.size,
            delivery.stage,
        );
        Ok(delivery)
    }
}

/// Maps a run result to the response object.
pub fn into_response(result: Result<Digest, PipelineError>, model_name: Option<&str>) -> Value {
    let report = match result.and_then(|digest| digest.to_value()) {
        Ok(value) => return value,
        Err(err) => {
            tracing::warn!("pipeline: {err}");
            err.report(model_name)
        }
    };
    error_value(&report)
}

/// Serializes an [`ErrorReport`] without failing.
pub fn error_value(report: &ErrorReport) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("error".into(), Value::String(report.error.clone()));
    if let Some(model) = &report.model_name {
        object.insert("model_name".into(), Value::String(model.clone()));
    }
    if let Some(details) = &report.details {
        object.insert("details".into(), Value::String(details.clone()));
    }
    Value::Object(object)
}
