// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Attribute values and their conversion to JSON.
//!
//! Containers store attributes in their native representation: fixed-width
//! integers, floats, raw byte-strings, nested arrays. Nothing downstream
//! should have to care, so every value goes through [`normalize_attribute`]
//! exactly once, which either yields a native JSON value or an
//! [`AttributeError`] describing why it could not.

use crate::AttributeError;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Attribute map attached to the container root, a group, or a dataset.
///
/// Ordered by key so traversal output is deterministic.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A raw attribute value as stored in the container.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Undecoded byte-string; must be valid UTF-8 to reach the summary.
    Bytes(Vec<u8>),
    Array(Vec<AttrValue>),
}

impl AttrValue {
    /// Creates a byte-string value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    /// Creates an array of string values.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(items.into_iter().map(|s| Self::Str(s.into())).collect())
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for AttrValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(items: Vec<AttrValue>) -> Self {
        Self::Array(items)
    }
}

/// Converts a raw attribute value into a native JSON value.
///
/// Byte-strings are decoded as UTF-8 with trailing NUL padding removed
/// (fixed-width string storage pads with zeros). Arrays convert
/// element-wise and fail as a whole if any element fails.
pub fn normalize_attribute(value: &AttrValue) -> Result<Value, AttributeError> {
    match value {
        AttrValue::Str(s) => Ok(Value::String(s.clone())),
        AttrValue::Int(v) => Ok(Value::from(*v)),
        AttrValue::UInt(v) => Ok(Value::from(*v)),
        AttrValue::Float(v) => Number::from_f64(*v)
            .map(Value::Number)
            .ok_or(AttributeError::NonFiniteFloat(*v)),
        AttrValue::Bool(v) => Ok(Value::Bool(*v)),
        AttrValue::Bytes(data) => {
            let end = data
                .iter()
                .rposition(|&b| b != 0)
                .map_or(0, |last| last + 1);
            std::str::from_utf8(&data[..end])
                .map(|s| Value::String(s.to_string()))
                .map_err(|e| AttributeError::InvalidUtf8 {
                    valid_up_to: e.valid_up_to(),
                })
        }
        AttrValue::Array(items) => items
            .iter()
            .map(normalize_attribute)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
    }
}

/// Normalizes a whole attribute map.
///
/// Returns the converted values plus one message per attribute that failed;
/// failed attributes are left out of the map.
pub(crate) fn normalize_all(attributes: &Attributes) -> (BTreeMap<String, Value>, Vec<String>) {
    let mut values = BTreeMap::new();
    let mut errors = Vec::new();
    for (key, raw) in attributes {
        match normalize_attribute(raw) {
            Ok(value) => {
                values.insert(key.clone(), value);
            }
            Err(e) => errors.push(format!("attribute '{key}': {e}")),
        }
    }
    (values, errors)
}
