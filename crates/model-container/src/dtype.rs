// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dataset element types.

/// The scalar element type tag carried by every [`crate::Dataset`].
///
/// `Other` keeps element types the container reports but this crate does
/// not recognise; the walker flags such datasets with a `data_error`.
///
/// Serializes as its label (see [`DType::as_str`]), so JSON output and
/// `Display` agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DType {
    /// 8-bit float, 4-bit exponent.
    F8E4M3,
    /// 8-bit float, 5-bit exponent.
    F8E5M2,
    /// 16-bit IEEE 754 floating point.
    F16,
    /// 16-bit brain floating point.
    BF16,
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 64-bit IEEE 754 floating point.
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
    /// An element type outside the set above.
    Other(String),
}

impl DType {
    /// Returns the size of a single element in bytes, or `None` for
    /// unrecognised types.
    pub fn size_bytes(&self) -> Option<usize> {
        match self {
            DType::F8E4M3 | DType::F8E5M2 | DType::I8 | DType::U8 | DType::Bool => Some(1),
            DType::F16 | DType::BF16 | DType::I16 | DType::U16 => Some(2),
            DType::F32 | DType::I32 | DType::U32 => Some(4),
            DType::F64 | DType::I64 | DType::U64 => Some(8),
            DType::Other(_) => None,
        }
    }

    /// Returns a human-readable label for this element type.
    pub fn as_str(&self) -> &str {
        match self {
            DType::F8E4M3 => "f8_e4m3",
            DType::F8E5M2 => "f8_e5m2",
            DType::F16 => "f16",
            DType::BF16 => "bf16",
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I8 => "i8",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::U8 => "u8",
            DType::U16 => "u16",
            DType::U32 => "u32",
            DType::U64 => "u64",
            DType::Bool => "bool",
            DType::Other(name) => name,
        }
    }

    /// Parses a label produced by [`DType::as_str`]. Unknown labels become
    /// [`DType::Other`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "f8_e4m3" => DType::F8E4M3,
            "f8_e5m2" => DType::F8E5M2,
            "f16" => DType::F16,
            "bf16" => DType::BF16,
            "f32" => DType::F32,
            "f64" => DType::F64,
            "i8" => DType::I8,
            "i16" => DType::I16,
            "i32" => DType::I32,
            "i64" => DType::I64,
            "u8" => DType::U8,
            "u16" => DType::U16,
            "u32" => DType::U32,
            "u64" => DType::U64,
            "bool" => DType::Bool,
            other => DType::Other(other.to_string()),
        }
    }

    /// `true` when the element type is known to this crate.
    pub fn is_recognised(&self) -> bool {
        !matches!(self, DType::Other(_))
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DType> for String {
    fn from(dtype: DType) -> Self {
        dtype.as_str().to_string()
    }
}

impl From<String> for DType {
    fn from(label: String) -> Self {
        DType::from_label(&label)
    }
}
