// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the digest pipeline and the structured error object.

use model_container::ContainerError;
use model_summary::SummaryError;
use summary_budget::BudgetError;
use transport_guard::GuardError;

/// Errors that can occur while digesting or relaying a model.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The container could not be opened or traversed.
    #[error("container error: {0}")]
    ContainerError(#[from] ContainerError),

    /// Aggregation failed at the top level.
    #[error("summary error: {0}")]
    SummaryError(#[from] SummaryError),

    /// A budget could not be parsed or a value could not be measured.
    #[error("budget error: {0}")]
    BudgetError(#[from] BudgetError),

    /// The relay failed.
    #[error("relay error: {0}")]
    GuardError(#[from] GuardError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl PipelineError {
    /// Short, stable description used as the `error` field of a report.
    pub fn headline(&self) -> &'static str {
        match self {
            PipelineError::ContainerError(_) => "Failed to read model container",
            PipelineError::SummaryError(_) => "Failed to summarize model",
            PipelineError::BudgetError(_) => "Failed to bound summary size",
            PipelineError::GuardError(GuardError::MaxRetriesExceeded { .. }) => "Relay retries exhausted",
            PipelineError::GuardError(GuardError::Cancelled { .. }) => "Relay cancelled",
            PipelineError::GuardError(_) => "Failed to relay summary",
            PipelineError::ConfigError(_) => "Invalid configuration",
        }
    }

    /// Builds the structured error object returned in place of a summary.
    pub fn report(&self, model_name: Option<&str>) -> ErrorReport {
        ErrorReport {
            error: self.headline().to_string(),
            model_name: model_name.map(str::to_string),
            details: Some(self.to_string()),
        }
    }
}

/// The error object: `{error, model_name?, details?}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorReport {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)?;
        if let Some(model) = &self.model_name {
            write!(f, " ({model})")?;
        }
        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}
