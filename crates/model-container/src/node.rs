// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Container nodes: groups and datasets.

use crate::{AttrValue, Attributes, DType, Shape};

/// A node in the container tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Dataset(Dataset),
}

impl Node {
    /// Returns the node's attributes regardless of its kind.
    pub fn attributes(&self) -> &Attributes {
        match self {
            Node::Group(g) => &g.attributes,
            Node::Dataset(d) => &d.attributes,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(g) => Some(g),
            Node::Dataset(_) => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Node::Dataset(d) => Some(d),
            Node::Group(_) => None,
        }
    }
}

/// A named container of child nodes. Holds no numeric payload.
///
/// Children keep insertion order; names are unique within a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub attributes: Attributes,
    pub children: Vec<(String, Node)>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder: adds a child group.
    pub fn with_group(mut self, name: impl Into<String>, group: Group) -> Self {
        self.insert(name, Node::Group(group));
        self
    }

    /// Builder: adds a child dataset.
    pub fn with_dataset(mut self, name: impl Into<String>, dataset: Dataset) -> Self {
        self.insert(name, Node::Dataset(dataset));
        self
    }

    /// Inserts a child, replacing (and returning) any child of the same name.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        let name = name.into();
        match self.children.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, node)),
            None => {
                self.children.push((name, node));
                None
            }
        }
    }

    /// Returns the direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Resolves a path relative to this group.
    ///
    /// Empty segments are skipped, so `"a//b"` and `"/a/b"` resolve like
    /// `"a/b"`. Returns `None` if any segment is missing or passes through
    /// a dataset.
    pub fn lookup(&self, path: &str, separator: char) -> Option<&Node> {
        let mut segments = path.split(separator).filter(|s| !s.is_empty());
        let mut current = self.child(segments.next()?)?;
        for segment in segments {
            current = current.as_group()?.child(segment)?;
        }
        Some(current)
    }

    /// Returns the number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Drop for Group {
    // Iterative teardown: nesting depth never reaches the call stack.
    fn drop(&mut self) {
        let mut pending: Vec<Node> = self.children.drain(..).map(|(_, node)| node).collect();
        while let Some(node) = pending.pop() {
            if let Node::Group(mut group) = node {
                pending.extend(group.children.drain(..).map(|(_, node)| node));
            }
        }
    }
}

/// A leaf node: a shaped array of elements plus attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub attributes: Attributes,
    pub shape: Shape,
    pub dtype: DType,
}

impl Dataset {
    pub fn new(shape: impl Into<Shape>, dtype: DType) -> Self {
        Self {
            attributes: Attributes::new(),
            shape: shape.into(),
            dtype,
        }
    }

    /// Builder: adds an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Payload size in bytes, if the element type is recognised.
    pub fn size_bytes(&self) -> Option<u64> {
        self.dtype
            .size_bytes()
            .map(|elem| self.shape.num_elements().saturating_mul(elem as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Group {
        Group::new().with_attr("backend", "tensorflow").with_group(
            "model_weights",
            Group::new().with_group(
                "dense_1",
                Group::new()
                    .with_dataset("kernel:0", Dataset::new(vec![10, 5], DType::F32))
                    .with_dataset("bias:0", Dataset::new(vec![5], DType::F32)),
            ),
        )
    }

    #[test]
    fn test_lookup_nested() {
        let root = sample();
        let node = root.lookup("model_weights/dense_1/kernel:0", '/').unwrap();
        assert_eq!(node.as_dataset().unwrap().shape, Shape::matrix(10, 5));
        assert!(root.lookup("/model_weights/dense_1", '/').unwrap().as_group().is_some());
    }

    #[test]
    fn test_lookup_missing_or_through_dataset() {
        let root = sample();
        assert!(root.lookup("model_weights/dense_2", '/').is_none());
        assert!(root.lookup("model_weights/dense_1/kernel:0/x", '/').is_none());
        assert!(root.lookup("", '/').is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut g = Group::new();
        assert!(g.insert("w", Node::Dataset(Dataset::new(vec![1], DType::F32))).is_none());
        let old = g.insert("w", Node::Dataset(Dataset::new(vec![2], DType::F32)));
        assert!(old.is_some());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let g = Group::new()
            .with_dataset("z", Dataset::new(vec![1], DType::F32))
            .with_dataset("a", Dataset::new(vec![1], DType::F32));
        let names: Vec<_> = g.children.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["z", "a"]);
    }

    #[test]
    fn test_dataset_size_bytes() {
        assert_eq!(Dataset::new(vec![10, 5], DType::F32).size_bytes(), Some(200));
        assert_eq!(Dataset::new(vec![4], DType::Other("str".into())).size_bytes(), None);
    }

    #[test]
    fn test_deep_group_drops_without_recursion() {
        let mut group = Group::new().with_dataset("w", Dataset::new(vec![1], DType::F32));
        for _ in 0..200_000 {
            group = Group::new().with_group("a", group);
        }
        drop(group);
    }
}
