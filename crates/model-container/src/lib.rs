// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-container
//!
//! Read-only access to hierarchical model containers and the structural
//! walker that flattens them into typed node records.
//!
//! A container is a tree of named **groups** (attributes + children) and
//! **datasets** (attributes + shape + element type, always leaves):
//!
//! - [`Container`]: the root handle trait. Anything that can hand out a
//!   root [`Group`] satisfies it.
//! - [`Node`]: tagged variant over [`Group`] and [`Dataset`].
//! - [`AttrValue`]: raw attribute values; [`normalize_attribute`] is the
//!   single conversion point to JSON.
//! - [`MemoryContainer`]: an in-memory tree, assembled with builders.
//! - [`SafeTensorsContainer`]: the on-disk format. Only the header is
//!   parsed; tensor data is never read.
//! - [`Walker`]: depth-first traversal producing a [`ModelTree`].
//!
//! # Example
//! ```
//! use model_container::{Dataset, DType, Group, MemoryContainer, Walker};
//!
//! let root = Group::new().with_group(
//!     "dense_1",
//!     Group::new()
//!         .with_dataset("kernel", Dataset::new(vec![10, 5], DType::F32))
//!         .with_dataset("bias", Dataset::new(vec![5], DType::F32)),
//! );
//! let container = MemoryContainer::new("mlp", root);
//! let tree = Walker::new().walk(&container).unwrap();
//! assert_eq!(tree.records.len(), 4);
//! ```

mod attribute;
mod container;
mod dtype;
mod error;
mod node;
mod safetensors_file;
mod shape;
mod walker;

pub use attribute::{normalize_attribute, AttrValue, Attributes};
pub use container::{Container, MemoryContainer};
pub use dtype::DType;
pub use error::{AttributeError, ContainerError};
pub use node::{Dataset, Group, Node};
pub use safetensors_file::SafeTensorsContainer;
pub use shape::Shape;
pub use walker::{ModelTree, NodeRecord, RecordKind, Walker, DEFAULT_MAX_DEPTH};
