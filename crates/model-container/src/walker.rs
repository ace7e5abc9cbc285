// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Structural walker: flattens a container into node records.
//!
//! The walk is depth-first pre-order. A group's record always precedes the
//! records of its children, and children appear in container order, so the
//! output is deterministic for a fixed container and every group's full
//! subtree is available before anything downstream totals it.
//!
//! Attribute conversion failures never abort the walk: they are collected
//! into the owning record's `data_error`. Only top-level problems (nesting
//! beyond `max_depth`) fail the walk, and then no partial tree is returned.

use crate::attribute::normalize_all;
use crate::{Container, ContainerError, DType, Group, Node, Shape};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default limit on group nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What a record describes.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RecordKind {
    /// A group with the given number of direct children.
    Group { children: usize },
    /// A dataset leaf.
    Dataset { shape: Shape, dtype: DType },
}

/// One visited node.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NodeRecord {
    /// Full path from the root, joined with the container separator.
    /// Empty for the root itself.
    pub path: String,
    /// Local name (last path segment).
    pub name: String,
    /// 0 for the root.
    pub depth: usize,
    /// Index of the parent record in [`ModelTree::records`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    /// Attributes converted to JSON. Failed conversions are absent here and
    /// described in `data_error`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_error: Option<String>,
    #[serde(flatten)]
    pub kind: RecordKind,
}

impl NodeRecord {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RecordKind::Group { .. })
    }

    pub fn is_dataset(&self) -> bool {
        matches!(self.kind, RecordKind::Dataset { .. })
    }

    /// The dataset shape, if this record is a dataset.
    pub fn shape(&self) -> Option<&Shape> {
        match &self.kind {
            RecordKind::Dataset { shape, .. } => Some(shape),
            RecordKind::Group { .. } => None,
        }
    }
}

/// The complete result of one traversal.
///
/// Owns everything it needs; the container can be dropped as soon as the
/// walk returns.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ModelTree {
    /// Container name.
    pub name: String,
    /// Separator used to build record paths.
    pub separator: char,
    /// Records in pre-order. `records[0]` is the root group.
    pub records: Vec<NodeRecord>,
}

impl ModelTree {
    /// The root record, if the tree is non-empty.
    pub fn root(&self) -> Option<&NodeRecord> {
        self.records.first()
    }

    /// Looks up a converted attribute on the root record.
    pub fn root_attribute(&self, key: &str) -> Option<&Value> {
        self.root()?.attributes.get(key)
    }

    /// Joins a child name onto a parent path.
    pub fn join(&self, parent: &str, child: &str) -> String {
        join_path(parent, child, self.separator)
    }

    /// Number of dataset records.
    pub fn dataset_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_dataset()).count()
    }

    /// Number of records carrying a `data_error`.
    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.data_error.is_some()).count()
    }
}

/// Depth-first traversal of a [`Container`].
///
/// # Example
/// ```
/// use model_container::{Group, MemoryContainer, Walker};
///
/// let container = MemoryContainer::new("empty", Group::new());
/// let tree = Walker::new().walk(&container).unwrap();
/// assert_eq!(tree.records.len(), 1); // just the root
/// ```
#[derive(Debug, Clone)]
pub struct Walker {
    max_depth: usize,
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

impl Walker {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Overrides the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Walks the whole container.
    ///
    /// Visits every group and dataset exactly once. Fails only if nesting
    /// exceeds the configured depth.
    pub fn walk<C: Container + ?Sized>(&self, container: &C) -> Result<ModelTree, ContainerError> {
        let separator = container.separator();
        let root = container.root();

        let (attributes, errors) = normalize_all(&root.attributes);
        let mut records = vec![NodeRecord {
            path: String::new(),
            name: String::new(),
            depth: 0,
            parent: None,
            attributes,
            data_error: join_errors(errors),
            kind: RecordKind::Group {
                children: root.len(),
            },
        }];

        self.visit_children(root, "", 1, 0, separator, &mut records)?;

        let tree = ModelTree {
            name: container.name().to_string(),
            separator,
            records,
        };
        tracing::debug!(
            "walker: '{}' — {} records, {} datasets, {} with data errors",
            tree.name,
            tree.records.len(),
            tree.dataset_count(),
            tree.error_count(),
        );
        Ok(tree)
    }

    fn visit_children(
        &self,
        group: &Group,
        path: &str,
        depth: usize,
        parent: usize,
        separator: char,
        records: &mut Vec<NodeRecord>,
    ) -> Result<(), ContainerError> {
        for (name, node) in &group.children {
            let child_path = join_path(path, name, separator);
            if depth > self.max_depth {
                return Err(ContainerError::TooDeep {
                    path: child_path,
                    max_depth: self.max_depth,
                });
            }

            let index = records.len();
            let (attributes, mut errors) = normalize_all(node.attributes());
            match node {
                Node::Group(child) => {
                    records.push(NodeRecord {
                        path: child_path.clone(),
                        name: name.clone(),
                        depth,
                        parent: Some(parent),
                        attributes,
                        data_error: join_errors(errors),
                        kind: RecordKind::Group {
                            children: child.len(),
                        },
                    });
                    self.visit_children(child, &child_path, depth + 1, index, separator, records)?;
                }
                Node::Dataset(dataset) => {
                    if !dataset.dtype.is_recognised() {
                        errors.push(format!("unsupported element type '{}'", dataset.dtype));
                    }
                    records.push(NodeRecord {
                        path: child_path,
                        name: name.clone(),
                        depth,
                        parent: Some(parent),
                        attributes,
                        data_error: join_errors(errors),
                        kind: RecordKind::Dataset {
                            shape: dataset.shape.clone(),
                            dtype: dataset.dtype.clone(),
                        },
                    });
                }
            }

            if let Some(err) = &records[index].data_error {
                tracing::warn!("walker: '{}': {err}", records[index].path);
            }
        }
        Ok(())
    }
}

fn join_path(parent: &str, child: &str, separator: char) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}{separator}{child}")
    }
}

fn join_errors(errors: Vec<String>) -> Option<String> {
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}
