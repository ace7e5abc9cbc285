// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer and weight records.
//!
//! A [`Layer`] is derived, never stored in the container: it is one group
//! whose datasets carry parameters. Each dataset becomes a [`Weight`].

use model_container::Shape;

/// The inferred kind of a layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LayerKind {
    Dense,
    Convolutional,
    #[default]
    Unknown,
}

impl LayerKind {
    /// Applies one weight to the running kind.
    ///
    /// A weight whose name contains `kernel` (case-insensitive) decides the
    /// kind from its rank: more than two dimensions is convolutional,
    /// otherwise dense. Any other weight leaves the kind unchanged, so the
    /// last kernel-like weight in a layer wins.
    pub fn refine(self, weight_name: &str, rank: usize) -> Self {
        if weight_name.to_lowercase().contains("kernel") {
            if rank > 2 {
                Self::Convolutional
            } else {
                Self::Dense
            }
        } else {
            self
        }
    }

    /// Infers a kind from a sequence of `(name, rank)` pairs.
    pub fn infer<'a>(weights: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        weights
            .into_iter()
            .fold(Self::Unknown, |kind, (name, rank)| kind.refine(name, rank))
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dense => "Dense",
            Self::Convolutional => "Convolutional",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dataset under a layer's group.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Weight {
    /// Dataset name relative to the layer's group.
    pub name: String,
    pub shape: Shape,
    /// Product of the shape's dimensions.
    pub parameters: u64,
    /// Set when the dataset or one of its attributes could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_error: Option<String>,
}

impl Weight {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        let parameters = shape.num_elements();
        Self {
            name: name.into(),
            shape,
            parameters,
            data_error: None,
        }
    }

    /// A weight that was declared but could not be resolved to a dataset.
    pub fn missing(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::scalar(),
            parameters: 0,
            data_error: Some(detail.into()),
        }
    }

    pub fn with_data_error(mut self, data_error: Option<String>) -> Self {
        self.data_error = data_error;
        self
    }
}

/// A group that contributes parameters to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Layer {
    /// The group's path.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Sum of the weights' parameter counts.
    pub parameters: u64,
    pub weights: Vec<Weight>,
}

impl Layer {
    /// Builds a layer, inferring its kind and totalling its parameters.
    pub fn from_weights(name: impl Into<String>, weights: Vec<Weight>) -> Self {
        let kind = LayerKind::infer(weights.iter().map(|w| (w.name.as_str(), w.shape.rank())));
        let parameters = weights
            .iter()
            .fold(0u64, |acc, w| acc.saturating_add(w.parameters));
        Self {
            name: name.into(),
            kind,
            parameters,
            weights,
        }
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) — {} parameters, {} weight tensors",
            self.name,
            self.kind,
            self.parameters,
            self.weights.len(),
        )
    }
}
