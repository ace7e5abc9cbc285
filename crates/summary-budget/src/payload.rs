// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Truncation of arbitrary JSON payloads ahead of an outbound send.
//!
//! Unlike [`crate::truncate_summary`] this works on any
//! [`serde_json::Value`], with coarser stages:
//!
//! 1. unchanged, if it fits;
//! 2. keys in [`STRIPPED_KEYS`] removed from every object, at any depth;
//! 3. a top-level `model_info` object collapsed to its totals;
//! 4. a fixed error object.

use crate::{serialized_len, BudgetError, ByteBudget};
use serde_json::{json, Map, Value};

/// Keys removed from every object in the stripping stage.
pub const STRIPPED_KEYS: [&str; 3] = ["weights", "layers", "details"];

/// Fields of `model_info` kept by the collapsing stage.
pub const MODEL_INFO_FIELDS: [&str; 3] = ["model_name", "total_layers", "total_parameters"];

/// Error text of the replacement payload.
pub const PAYLOAD_ERROR: &str = "Payload exceeded size limits";

/// How far a payload had to be reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStage {
    Unchanged,
    Stripped,
    Collapsed,
    Replaced,
}

/// Result of [`truncate_payload`].
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadTruncation {
    pub stage: PayloadStage,
    pub payload: Value,
    /// Serialized size of `payload` in bytes.
    pub size: usize,
}

impl PayloadTruncation {
    pub fn fits(&self, budget: ByteBudget) -> bool {
        budget.admits(self.size)
    }
}

/// Reduces `payload` until it fits `budget`. The input is not modified.
pub fn truncate_payload(payload: &Value, budget: ByteBudget) -> Result<PayloadTruncation, BudgetError> {
    let original = serialized_len(payload)?;
    if budget.admits(original) {
        return Ok(PayloadTruncation {
            stage: PayloadStage::Unchanged,
            payload: payload.clone(),
            size: original,
        });
    }

    let mut reduced = payload.clone();
    strip_keys(&mut reduced);
    let size = serialized_len(&reduced)?;
    tracing::debug!("payload: {original} bytes stripped to {size} (budget {budget})");
    if budget.admits(size) {
        return Ok(PayloadTruncation {
            stage: PayloadStage::Stripped,
            payload: reduced,
            size,
        });
    }

    if collapse_model_info(&mut reduced) {
        let size = serialized_len(&reduced)?;
        tracing::debug!("payload: model_info collapsed to {size} bytes");
        if budget.admits(size) {
            return Ok(PayloadTruncation {
                stage: PayloadStage::Collapsed,
                payload: reduced,
                size,
            });
        }
    }

    let replacement = json!({
        "error": PAYLOAD_ERROR,
        "details": format!("{original} bytes exceeds budget of {} bytes", budget.as_bytes()),
    });
    let size = serialized_len(&replacement)?;
    tracing::warn!("payload: {original} bytes could not be reduced below {budget}, replaced");
    Ok(PayloadTruncation {
        stage: PayloadStage::Replaced,
        payload: replacement,
        size,
    })
}

/// Removes [`STRIPPED_KEYS`] from every object in the tree.
fn strip_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !STRIPPED_KEYS.contains(&key.as_str()));
            map.values_mut().for_each(strip_keys);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_keys),
        _ => {}
    }
}

/// Replaces a top-level `model_info` object with its totals.
/// Returns `false` if there is nothing to collapse.
fn collapse_model_info(value: &mut Value) -> bool {
    let Some(Value::Object(info)) = value.get_mut("model_info") else {
        return false;
    };
    let collapsed: Map<String, Value> = MODEL_INFO_FIELDS
        .iter()
        .filter_map(|&field| info.get(field).map(|v| (field.to_string(), v.clone())))
        .collect();
    *info = collapsed;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_payload() -> Value {
        json!({
            "model_info": {
                "weights": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]],
                "layers": [{"name": "dense_1", "parameters": 55}, {"name": "dense_2", "parameters": 12}],
                "model_name": "m",
                "total_layers": 2,
                "total_parameters": 67
            }
        })
    }

    #[test]
    fn test_fits_unchanged() {
        let p = model_payload();
        let t = truncate_payload(&p, ByteBudget::from_kb(4)).unwrap();
        assert_eq!(t.stage, PayloadStage::Unchanged);
        assert_eq!(t.payload, p);
    }

    #[test]
    fn test_stripped_to_totals() {
        let expected = json!({"model_info": {"model_name": "m", "total_layers": 2, "total_parameters": 67}});
        let budget = ByteBudget::from_bytes(serialized_len(&expected).unwrap());
        let t = truncate_payload(&model_payload(), budget).unwrap();
        assert_eq!(t.stage, PayloadStage::Stripped);
        assert_eq!(t.payload, expected);
        assert!(t.fits(budget));
    }

    #[test]
    fn test_strips_at_any_depth() {
        let p = json!({"a": [{"details": "x".repeat(100), "keep": 1}], "b": {"c": {"layers": [1, 2, 3]}}});
        let t = truncate_payload(&p, ByteBudget::from_bytes(40)).unwrap();
        assert_eq!(t.payload, json!({"a": [{"keep": 1}], "b": {"c": {}}}));
    }

    #[test]
    fn test_collapses_model_info() {
        let p = json!({
            "model_info": {
                "model_name": "m",
                "total_layers": 2,
                "total_parameters": 67,
                "optimizer": "a very long optimizer description that does not fit",
            }
        });
        let expected = json!({"model_info": {"model_name": "m", "total_layers": 2, "total_parameters": 67}});
        let budget = ByteBudget::from_bytes(serialized_len(&expected).unwrap());
        let t = truncate_payload(&p, budget).unwrap();
        assert_eq!(t.stage, PayloadStage::Collapsed);
        assert_eq!(t.payload, expected);
    }

    #[test]
    fn test_replaced_when_nothing_fits() {
        let p = model_payload();
        let original = serialized_len(&p).unwrap();
        let t = truncate_payload(&p, ByteBudget::from_bytes(10)).unwrap();
        assert_eq!(t.stage, PayloadStage::Replaced);
        assert_eq!(t.payload["error"], PAYLOAD_ERROR);
        assert_eq!(
            t.payload["details"],
            format!("{original} bytes exceeds budget of 10 bytes")
        );
    }

    #[test]
    fn test_tighter_budget_never_less_reduced() {
        let p = model_payload();
        let mut previous = PayloadStage::Unchanged;
        for budget in [4096, 193, 192, 72, 71, 10] {
            let t = truncate_payload(&p, ByteBudget::from_bytes(budget)).unwrap();
            assert!(t.stage >= previous, "budget {budget}: {:?} after {previous:?}", t.stage);
            previous = t.stage;
        }
        assert_eq!(previous, PayloadStage::Replaced);
    }

    #[test]
    fn test_input_untouched() {
        let p = model_payload();
        let before = p.clone();
        let _ = truncate_payload(&p, ByteBudget::from_bytes(1)).unwrap();
        assert_eq!(p, before);
    }
}
