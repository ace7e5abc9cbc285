// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pipeline
//!
//! Composes the workspace crates into one run:
//!
//! 1. `model-container` walks the container, which is then released;
//! 2. `model-summary` aggregates layers;
//! 3. `summary-budget` bounds the serialized summary;
//! 4. optionally, `transport-guard` relays it with retries.
//!
//! Failures surface either as [`PipelineError`] or, through
//! [`Digester::respond`], as the [`ErrorReport`] JSON object.

mod config;
mod digest;
mod error;
mod stats;

pub use config::{DigestConfig, RelayConfig};
pub use digest::{error_value, into_response, Digest, Digester};
pub use error::{ErrorReport, PipelineError};
pub use stats::RunStats;
