// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer aggregation over a walked [`ModelTree`].
//!
//! Two passes over the records:
//!
//! 1. Every group carrying a `weight_names` attribute claims the datasets
//!    those names resolve to (relative to the group, possibly nested).
//!    Each dataset is counted once: repeated names collapse, and a dataset
//!    declared by several groups belongs to the first of them.
//! 2. Every group in pre-order becomes a candidate layer. Its weights are
//!    the declared names when present, otherwise its direct unclaimed
//!    dataset children. Candidates whose weights are all zero-parameter
//!    are dropped.

use crate::{Layer, ModelSummary, SummaryError, Weight, NOT_SPECIFIED};
use model_container::{ModelTree, NodeRecord, Shape};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Builds a [`ModelSummary`] from a walked tree.
pub fn aggregate(tree: &ModelTree) -> Result<ModelSummary, SummaryError> {
    let root = tree.root().ok_or_else(|| SummaryError::EmptyTree {
        model: tree.name.clone(),
    })?;
    if !root.is_group() {
        return Err(SummaryError::RootNotGroup {
            model: tree.name.clone(),
        });
    }

    let datasets_by_path: HashMap<&str, usize> = tree
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_dataset())
        .map(|(i, r)| (r.path.as_str(), i))
        .collect();

    // Pass 1: declared weights claim their datasets. Repeated names within
    // a group collapse to the first; a dataset belongs to the first group
    // (in traversal order) that declares it.
    let mut declared: HashMap<usize, Vec<String>> = HashMap::new();
    let mut owner: HashMap<usize, usize> = HashMap::new();
    for (index, record) in tree.records.iter().enumerate() {
        if !record.is_group() {
            continue;
        }
        if let Some(mut names) = weight_names(record) {
            let mut seen = HashSet::new();
            names.retain(|name| seen.insert(tree.join(&record.path, name)));
            for name in &names {
                if let Some(&dataset) = datasets_by_path.get(tree.join(&record.path, name).as_str()) {
                    owner.entry(dataset).or_insert(index);
                }
            }
            declared.insert(index, names);
        }
    }

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for (index, record) in tree.records.iter().enumerate() {
        if let (true, Some(parent)) = (record.is_dataset(), record.parent) {
            children.entry(parent).or_default().push(index);
        }
    }

    let mut summary = ModelSummary::new(tree.name.clone())
        .with_optimizer(optimizer(tree).unwrap_or_else(|| NOT_SPECIFIED.to_string()))
        .with_loss_function(loss_function(tree).unwrap_or_else(|| NOT_SPECIFIED.to_string()));

    // Pass 2: one candidate layer per group.
    for (index, record) in tree.records.iter().enumerate() {
        if !record.is_group() {
            continue;
        }

        let weights: Vec<Weight> = match declared.get(&index) {
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    let path = tree.join(&record.path, name);
                    match datasets_by_path.get(path.as_str()) {
                        Some(&dataset) if owner.get(&dataset) != Some(&index) => {
                            tracing::debug!("aggregate: '{path}' already belongs to another layer");
                            None
                        }
                        Some(&dataset) => Some(weight_from_record(name.clone(), &tree.records[dataset])),
                        None => Some(Weight::missing(name.clone(), format!("weight '{path}' not found"))),
                    }
                })
                .collect(),
            None => children
                .get(&index)
                .into_iter()
                .flatten()
                .filter(|dataset| !owner.contains_key(dataset))
                .map(|&dataset| {
                    let dataset = &tree.records[dataset];
                    weight_from_record(dataset.name.clone(), dataset)
                })
                .collect(),
        };

        let name = if record.path.is_empty() {
            tree.name.clone()
        } else {
            record.path.clone()
        };

        if weights.iter().all(|w| w.parameters == 0) {
            if !weights.is_empty() {
                tracing::debug!("aggregate: dropping '{name}', all {} weights are empty", weights.len());
            }
            continue;
        }

        if trainable(record) == Some(false) {
            tracing::debug!("aggregate: layer '{name}' is not trainable");
        }

        let layer = Layer::from_weights(name, weights);
        tracing::debug!("aggregate: {}", layer.summary());
        summary.push_layer(layer);
    }

    tracing::info!(
        "aggregate: '{}' has {} layers, {} parameters",
        summary.model_name(),
        summary.total_layers(),
        summary.total_parameters(),
    );
    Ok(summary)
}

fn weight_from_record(name: String, record: &NodeRecord) -> Weight {
    let shape = record.shape().cloned().unwrap_or_else(Shape::scalar);
    Weight::new(name, shape).with_data_error(record.data_error.clone())
}

/// Reads `weight_names` as a list of strings. A single string is a
/// one-element list; anything else is ignored.
fn weight_names(record: &NodeRecord) -> Option<Vec<String>> {
    match record.attributes.get("weight_names")? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

/// Reads `trainable` as a boolean or a 0/1 integer.
fn trainable(record: &NodeRecord) -> Option<bool> {
    match record.attributes.get("trainable")? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn optimizer(tree: &ModelTree) -> Option<String> {
    tree.root_attribute("optimizer")
        .and_then(text)
        .or_else(|| training_config(tree)?.pointer("/optimizer_config/class_name").and_then(text))
}

fn loss_function(tree: &ModelTree) -> Option<String> {
    tree.root_attribute("loss")
        .and_then(text)
        .or_else(|| tree.root_attribute("loss_function").and_then(text))
        .or_else(|| training_config(tree)?.get("loss").and_then(text))
}

/// The root `training_config` attribute, parsed from its JSON text.
fn training_config(tree: &ModelTree) -> Option<Value> {
    match tree.root_attribute("training_config")? {
        Value::String(s) => serde_json::from_str(s).ok(),
        other @ Value::Object(_) => Some(other.clone()),
        _ => None,
    }
}

/// Renders a metadata value as text. Null and empty strings are absent;
/// non-string values use their compact JSON form.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
