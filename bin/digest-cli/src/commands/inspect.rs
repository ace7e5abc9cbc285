// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `model-digest inspect`: display layers, parameter counts and, with
//! `--tree`, every record of the walked container.

use super::truncate;
use model_container::{ModelTree, RecordKind, SafeTensorsContainer};
use model_summary::aggregate;
use pipeline::DigestConfig;
use std::path::Path;
use summary_budget::{render_phase, serialized_len, Phase};

pub fn execute(config: &DigestConfig, model: &Path, tree: bool) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             model-digest · Model Inspector           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let walked = {
        let container = SafeTensorsContainer::open_with_max_depth(model, config.max_depth)
            .map_err(|e| anyhow::anyhow!("failed to open model '{}': {e}", model.display()))?;
        config.walker().walk(&container)?
    };
    let summary = aggregate(&walked)?;

    // ── Summary ────────────────────────────────────────────────
    println!("{summary}");
    println!("  Records:    {} ({} datasets, {} with errors)", walked.records.len(), walked.dataset_count(), walked.error_count());
    println!();

    // ── Per-Layer Detail ───────────────────────────────────────
    println!("  {:<4} {:<40} {:<14} {:>12} {:>4}", "Idx", "Name", "Type", "Params", "#W");
    println!("  {}", "-".repeat(80));
    for (index, layer) in summary.layers().iter().enumerate() {
        println!(
            "  {:<4} {:<40} {:<14} {:>12} {:>4}",
            index,
            truncate(&layer.name, 40),
            layer.kind.as_str(),
            layer.parameters,
            layer.weights.len(),
        );
        for weight in layer.weights.iter().filter(|w| w.data_error.is_some()) {
            println!("       ! {}: {}", weight.name, weight.data_error.as_deref().unwrap_or_default());
        }
    }
    println!();

    // ── Serialized Size per Phase ──────────────────────────────
    println!("  Serialized size by truncation phase:");
    for phase in Phase::ALL {
        let view = render_phase(&summary, phase);
        let size = serialized_len(&view)?;
        println!("   {:<18} {:>10} bytes {:>6} layer entries", phase.as_str(), size, view.layer_entries());
    }
    println!();

    if tree {
        print_tree(&walked);
    }
    Ok(())
}

fn print_tree(tree: &ModelTree) {
    println!("  Container tree:");
    for record in &tree.records {
        let indent = "  ".repeat(record.depth);
        let label = if record.path.is_empty() { "/" } else { record.name.as_str() };
        match &record.kind {
            RecordKind::Group { children } => {
                println!("   {indent}{label}/  ({children} children, {} attributes)", record.attributes.len());
            }
            RecordKind::Dataset { shape, dtype } => {
                println!("   {indent}{label}  {dtype} {shape}");
            }
        }
        if let Some(err) = &record.data_error {
            println!("   {indent}  ! {err}");
        }
    }
    println!();
}
