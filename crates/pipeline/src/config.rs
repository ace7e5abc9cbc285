// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Digest configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! summary_budget = "8K"
//! payload_budget = "4K"
//! max_depth = 64
//!
//! [relay]
//! max_attempts = 3
//! backoff_factor = 2.0
//! backoff_unit_ms = 1000
//! budget_shrink = 0.5
//! timeout_secs = 120
//! ```
//!
//! Every field is optional; missing fields take the defaults shown.

use crate::PipelineError;
use model_container::{Walker, DEFAULT_MAX_DEPTH};
use std::path::Path;
use std::time::Duration;
use summary_budget::ByteBudget;
use transport_guard::{CancelToken, RetryPolicy};

/// Configuration for the digest pipeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Ceiling on the serialized summary (human-readable, e.g. `"8K"`).
    pub summary_budget: String,
    /// Ceiling on relayed payloads.
    pub payload_budget: String,
    /// Maximum container nesting depth.
    pub max_depth: usize,
    /// Outbound relay settings.
    pub relay: RelayConfig,
}

/// Retry and timeout settings for the relay.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub max_attempts: u32,
    pub backoff_factor: f64,
    /// Backoff unit in milliseconds.
    pub backoff_unit_ms: u64,
    /// Budget multiplier per retry, in `(0, 1]`.
    pub budget_shrink: f64,
    /// Overall relay deadline. No deadline if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            summary_budget: "8K".to_string(),
            payload_budget: "4K".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            relay: RelayConfig::default(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            backoff_factor: policy.backoff_factor,
            backoff_unit_ms: policy.backoff_unit.as_millis() as u64,
            budget_shrink: policy.budget_shrink,
            timeout_secs: None,
        }
    }
}

impl DigestConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| PipelineError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.parse_summary_budget()?;
        self.parse_payload_budget()?;
        if self.max_depth == 0 {
            return Err(PipelineError::ConfigError("max_depth must be at least 1".into()));
        }
        let relay = &self.relay;
        if relay.max_attempts == 0 {
            return Err(PipelineError::ConfigError("relay.max_attempts must be at least 1".into()));
        }
        if !(relay.backoff_factor.is_finite() && relay.backoff_factor >= 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "relay.backoff_factor must be >= 1.0, got {}",
                relay.backoff_factor
            )));
        }
        if !(relay.budget_shrink > 0.0 && relay.budget_shrink <= 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "relay.budget_shrink must be in (0, 1], got {}",
                relay.budget_shrink
            )));
        }
        Ok(())
    }

    /// Parses the summary budget string into a [`ByteBudget`].
    pub fn parse_summary_budget(&self) -> Result<ByteBudget, PipelineError> {
        ByteBudget::parse(&self.summary_budget)
            .map_err(|e| PipelineError::ConfigError(format!("invalid summary_budget: {e}")))
    }

    /// Parses the payload budget string into a [`ByteBudget`].
    pub fn parse_payload_budget(&self) -> Result<ByteBudget, PipelineError> {
        ByteBudget::parse(&self.payload_budget)
            .map_err(|e| PipelineError::ConfigError(format!("invalid payload_budget: {e}")))
    }

    /// A walker limited to the configured depth.
    pub fn walker(&self) -> Walker {
        Walker::new().with_max_depth(self.max_depth)
    }

    /// The retry policy for the relay, with the default retry predicate.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.relay.max_attempts,
            backoff_factor: self.relay.backoff_factor,
            backoff_unit: Duration::from_millis(self.relay.backoff_unit_ms),
            budget_shrink: self.relay.budget_shrink,
            ..Default::default()
        }
    }

    /// A fresh cancel token carrying the configured deadline.
    pub fn cancel_token(&self) -> CancelToken {
        match self.relay.timeout_secs {
            Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
            None => CancelToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = DigestConfig::default();
        assert_eq!(c.summary_budget, "8K");
        assert_eq!(c.max_depth, 64);
        assert_eq!(c.relay.max_attempts, 3);
        assert_eq!(c.relay.backoff_unit_ms, 1000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_parse_budgets() {
        let c = DigestConfig {
            summary_budget: "16KB".into(),
            payload_budget: "2048".into(),
            ..Default::default()
        };
        assert_eq!(c.parse_summary_budget().unwrap().as_bytes(), 16 * 1024);
        assert_eq!(c.parse_payload_budget().unwrap().as_bytes(), 2048);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
summary_budget = "2K"
max_depth = 8

[relay]
max_attempts = 5
backoff_unit_ms = 10
timeout_secs = 30
"#;
        let c = DigestConfig::from_toml(toml).unwrap();
        assert_eq!(c.summary_budget, "2K");
        assert_eq!(c.payload_budget, "4K");
        assert_eq!(c.max_depth, 8);
        assert_eq!(c.relay.max_attempts, 5);
        assert_eq!(c.relay.backoff_factor, 2.0);
        assert_eq!(c.relay.timeout_secs, Some(30));

        let policy = c.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff_unit, Duration::from_millis(10));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(DigestConfig::from_toml("").unwrap(), DigestConfig::default());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = DigestConfig {
            max_depth: 12,
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        assert_eq!(DigestConfig::from_toml(&toml).unwrap(), c);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(DigestConfig::from_toml(r#"summary_budget = "lots""#).is_err());
        assert!(DigestConfig::from_toml("max_depth = 0").is_err());
        assert!(DigestConfig::from_toml("[relay]\nbudget_shrink = 1.5").is_err());
        assert!(DigestConfig::from_toml("[relay]\nbackoff_factor = 0.5").is_err());
        assert!(DigestConfig::from_toml("[relay]\nmax_attempts = 0").is_err());
        assert!(DigestConfig::from_toml("unknown = [").is_err());
    }

    #[test]
    fn test_cancel_token_deadline() {
        let c = DigestConfig {
            relay: RelayConfig {
                timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(c.cancel_token().is_cancelled());
        assert!(!DigestConfig::default().cancel_token().is_cancelled());
    }
}
