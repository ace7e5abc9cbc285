// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The model summary and its running totals.

use crate::Layer;

/// Value reported for optimizer or loss when the container does not say.
pub const NOT_SPECIFIED: &str = "N/A";

/// A structural summary of one model container.
///
/// Fields are private so the totals cannot drift from the layer list:
/// `total_layers == layers.len()` and `total_parameters` is the sum of the
/// layers' parameter counts. [`ModelSummary::push_layer`] is the only way
/// to add a layer and it updates both totals.
///
/// Field order here is the key order of the serialized JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ModelSummary {
    model_name: String,
    total_layers: usize,
    total_parameters: u64,
    optimizer: String,
    loss_function: String,
    layers: Vec<Layer>,
}

impl ModelSummary {
    /// An empty summary with optimizer and loss set to [`NOT_SPECIFIED`].
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            total_layers: 0,
            total_parameters: 0,
            optimizer: NOT_SPECIFIED.to_string(),
            loss_function: NOT_SPECIFIED.to_string(),
            layers: Vec::new(),
        }
    }

    pub fn with_optimizer(mut self, optimizer: impl Into<String>) -> Self {
        self.optimizer = optimizer.into();
        self
    }

    pub fn with_loss_function(mut self, loss_function: impl Into<String>) -> Self {
        self.loss_function = loss_function.into();
        self
    }

    /// Appends a layer and updates the totals.
    pub fn push_layer(&mut self, layer: Layer) {
        self.total_layers += 1;
        self.total_parameters = self.total_parameters.saturating_add(layer.parameters);
        self.layers.push(layer);
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn total_layers(&self) -> usize {
        self.total_layers
    }

    pub fn total_parameters(&self) -> u64 {
        self.total_parameters
    }

    pub fn optimizer(&self) -> &str {
        &self.optimizer
    }

    pub fn loss_function(&self) -> &str {
        &self.loss_function
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total number of weight tensors across all layers.
    pub fn weight_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len()).sum()
    }
}

impl std::fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Model: {}", self.model_name)?;
        writeln!(f, "  Layers:     {}", self.total_layers)?;
        writeln!(f, "  Parameters: {}", self.total_parameters)?;
        writeln!(f, "  Optimizer:  {}", self.optimizer)?;
        write!(f, "  Loss:       {}", self.loss_function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Weight;
    use model_container::Shape;

    #[test]
    fn test_push_updates_totals() {
        let mut s = ModelSummary::new("m");
        s.push_layer(Layer::from_weights("a", vec![Weight::new("kernel", Shape::matrix(4, 4))]));
        s.push_layer(Layer::from_weights("b", vec![Weight::new("bias", Shape::vector(4))]));
        assert_eq!(s.total_layers(), 2);
        assert_eq!(s.total_parameters(), 20);
        assert_eq!(s.weight_count(), 2);
    }

    #[test]
    fn test_defaults_to_sentinel() {
        let s = ModelSummary::new("m");
        assert_eq!(s.optimizer(), NOT_SPECIFIED);
        assert_eq!(s.loss_function(), NOT_SPECIFIED);
    }

    #[test]
    fn test_serialized_key_order() {
        let s = ModelSummary::new("m").with_optimizer("Adam");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(
            json,
            r#"{"model_name":"m","total_layers":0,"total_parameters":0,"optimizer":"Adam","loss_function":"N/A","layers":[]}"#
        );
    }
}
