// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # summary-budget
//!
//! Keeps serialized output under a byte ceiling.
//!
//! - [`ByteBudget`]: a parsed, displayable byte ceiling.
//! - [`truncate_summary`]: phased, fidelity-preserving reduction of a
//!   [`model_summary::ModelSummary`].
//! - [`truncate_payload`]: coarse reduction of any JSON value, used
//!   before outbound sends.
//!
//! Sizes are the UTF-8 byte length of the compact `serde_json`
//! serialization, measured by [`serialized_len`].

mod budget;
mod error;
mod payload;
mod truncate;

pub use budget::{serialized_len, ByteBudget};
pub use error::BudgetError;
pub use payload::{
    truncate_payload, PayloadStage, PayloadTruncation, MODEL_INFO_FIELDS, PAYLOAD_ERROR, STRIPPED_KEYS,
};
pub use truncate::{
    render_phase, truncate_summary, CondensedSummary, FallbackSummary, LayerDigest, Phase, SummaryView,
    Truncation, TRUNCATION_NOTE,
};
