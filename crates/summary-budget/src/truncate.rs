// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Phased truncation of a [`ModelSummary`] to a byte budget.
//!
//! Each phase is rendered from the original summary, never from the
//! previous phase, and phases are tried in order until one fits:
//!
//! | Phase            | Layers kept | Per-layer fields            |
//! |------------------|-------------|-----------------------------|
//! | `Full`           | all         | everything                  |
//! | `WithoutWeights` | first 100   | `name`, `type`, `parameters`|
//! | `NamesOnly`      | first 50    | `name`, `parameters`        |
//! | `Positional`     | first 10    | `name` = `"Layer N"`        |
//! | `Fallback`       | none        | totals and a note           |
//!
//! Serialized size never increases from one phase to the next.

use crate::{serialized_len, BudgetError, ByteBudget};
use model_summary::{LayerKind, ModelSummary};

/// Note carried by the fallback view.
///
/// Kept shorter than the optimizer and loss fields it replaces so the
/// fallback is never larger than the positional phase.
pub const TRUNCATION_NOTE: &str = "Layer details truncated";

/// A truncation phase, in order of decreasing fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Full,
    WithoutWeights,
    NamesOnly,
    Positional,
    Fallback,
}

impl Phase {
    /// All phases, in the order they are tried.
    pub const ALL: [Phase; 5] = [
        Phase::Full,
        Phase::WithoutWeights,
        Phase::NamesOnly,
        Phase::Positional,
        Phase::Fallback,
    ];

    /// Maximum number of layers kept, `None` for no limit.
    pub fn layer_cap(&self) -> Option<usize> {
        match self {
            Phase::Full => None,
            Phase::WithoutWeights => Some(100),
            Phase::NamesOnly => Some(50),
            Phase::Positional => Some(10),
            Phase::Fallback => Some(0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Full => "full",
            Phase::WithoutWeights => "without_weights",
            Phase::NamesOnly => "names_only",
            Phase::Positional => "positional",
            Phase::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reduced layer entry.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LayerDigest {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<LayerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<u64>,
}

/// Summary with the original totals and metadata but reduced layers.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CondensedSummary {
    pub model_name: String,
    pub total_layers: usize,
    pub total_parameters: u64,
    pub optimizer: String,
    pub loss_function: String,
    pub layers: Vec<LayerDigest>,
}

/// The last resort: totals only.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FallbackSummary {
    pub model_name: String,
    pub total_layers: usize,
    pub total_parameters: u64,
    pub truncation_note: String,
}

/// A rendering of a summary at some phase. Serializes as the inner object.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum SummaryView {
    Full(ModelSummary),
    Condensed(CondensedSummary),
    Fallback(FallbackSummary),
}

impl SummaryView {
    pub fn model_name(&self) -> &str {
        match self {
            SummaryView::Full(s) => s.model_name(),
            SummaryView::Condensed(s) => &s.model_name,
            SummaryView::Fallback(s) => &s.model_name,
        }
    }

    /// Number of layer entries present in this view.
    pub fn layer_entries(&self) -> usize {
        match self {
            SummaryView::Full(s) => s.layers().len(),
            SummaryView::Condensed(s) => s.layers.len(),
            SummaryView::Fallback(_) => 0,
        }
    }
}

/// Result of [`truncate_summary`].
#[derive(Debug, Clone, PartialEq)]
pub struct Truncation {
    /// Phase that produced the view.
    pub phase: Phase,
    pub view: SummaryView,
    /// Serialized size of the view in bytes.
    pub size: usize,
    /// `false` only when even the fallback exceeds the budget.
    pub fits: bool,
}

/// Renders the summary at a given phase.
pub fn render_phase(summary: &ModelSummary, phase: Phase) -> SummaryView {
    let condensed = |layers: Vec<LayerDigest>| {
        SummaryView::Condensed(CondensedSummary {
            model_name: summary.model_name().to_string(),
            total_layers: summary.total_layers(),
            total_parameters: summary.total_parameters(),
            optimizer: summary.optimizer().to_string(),
            loss_function: summary.loss_function().to_string(),
            layers,
        })
    };
    let cap = phase.layer_cap().unwrap_or(usize::MAX);
    let kept = summary.layers().iter().take(cap);

    match phase {
        Phase::Full => SummaryView::Full(summary.clone()),
        Phase::WithoutWeights => condensed(
            kept.map(|l| LayerDigest {
                name: l.name.clone(),
                kind: Some(l.kind),
                parameters: Some(l.parameters),
            })
            .collect(),
        ),
        Phase::NamesOnly => condensed(
            kept.map(|l| LayerDigest {
                name: l.name.clone(),
                kind: None,
                parameters: Some(l.parameters),
            })
            .collect(),
        ),
        Phase::Positional => condensed(
            kept.enumerate()
                .map(|(i, _)| LayerDigest {
                    name: format!("Layer {}", i + 1),
                    kind: None,
                    parameters: None,
                })
                .collect(),
        ),
        Phase::Fallback => SummaryView::Fallback(FallbackSummary {
            model_name: summary.model_name().to_string(),
            total_layers: summary.total_layers(),
            total_parameters: summary.total_parameters(),
            truncation_note: TRUNCATION_NOTE.to_string(),
        }),
    }
}

/// Returns the highest-fidelity view of `summary` that fits `budget`.
///
/// Always terminates. If nothing fits, the fallback is returned with
/// `fits == false`; the original summary is never modified.
pub fn truncate_summary(summary: &ModelSummary, budget: ByteBudget) -> Result<Truncation, BudgetError> {
    for phase in Phase::ALL.into_iter().filter(|p| *p != Phase::Fallback) {
        let view = render_phase(summary, phase);
        let size = serialized_len(&view)?;
        tracing::debug!(
            "truncate: '{}' phase {phase} is {size} bytes (budget {budget})",
            summary.model_name()
        );
        if budget.admits(size) {
            if phase != Phase::Full {
                tracing::info!(
                    "truncate: '{}' reduced to phase {phase} ({size} bytes, budget {budget})",
                    summary.model_name()
                );
            }
            return Ok(Truncation {
                phase,
                view,
                size,
                fits: true,
            });
        }
    }

    let view = render_phase(summary, Phase::Fallback);
    let size = serialized_len(&view)?;
    let fits = budget.admits(size);
    if fits {
        tracing::info!("truncate: '{}' reduced to fallback ({size} bytes)", summary.model_name());
    } else {
        tracing::warn!(
            "truncate: '{}' fallback is {size} bytes, over budget {budget}",
            summary.model_name()
        );
    }
    Ok(Truncation {
        phase: Phase::Fallback,
        view,
        size,
        fits,
    })
}
