// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-summary
//!
//! Turns a walked [`model_container::ModelTree`] into a [`ModelSummary`]:
//! one [`Layer`] per group that carries parameters, with an inferred
//! [`LayerKind`], per-layer and total parameter counts, and the optimizer
//! and loss function recorded in the container's root attributes.
//!
//! # Example
//! ```
//! use model_container::{Dataset, DType, Group, MemoryContainer, Walker};
//! use model_summary::{aggregate, LayerKind};
//!
//! let root = Group::new().with_group(
//!     "conv_1",
//!     Group::new().with_dataset("kernel", Dataset::new(vec![3, 3, 1, 8], DType::F32)),
//! );
//! let tree = Walker::new().walk(&MemoryContainer::new("cnn", root)).unwrap();
//! let summary = aggregate(&tree).unwrap();
//! assert_eq!(summary.total_parameters(), 72);
//! assert_eq!(summary.layers()[0].kind, LayerKind::Convolutional);
//! ```

mod aggregate;
mod error;
mod layer;
mod summary;

pub use aggregate::aggregate;
pub use error::SummaryError;
pub use layer::{Layer, LayerKind, Weight};
pub use summary::{ModelSummary, NOT_SPECIFIED};
