// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`Container`] trait and the in-memory implementation.

use crate::{AttrValue, Attributes, Group, Node};

/// A read-only handle on a hierarchical model container.
///
/// Implementations expose the root group; path lookup and attribute access
/// are derived from it. The walker borrows a container for exactly one
/// traversal.
pub trait Container {
    /// Model name reported in the summary (usually the file stem).
    fn name(&self) -> &str;

    /// The root group. Its attributes are the container-level attributes.
    fn root(&self) -> &Group;

    /// Path separator used both to resolve and to report paths.
    fn separator(&self) -> char {
        '/'
    }

    /// Resolves a node by path. The root itself has no node; use
    /// [`Container::attributes_at`] with an empty path for its attributes.
    fn node_at(&self, path: &str) -> Option<&Node> {
        self.root().lookup(path, self.separator())
    }

    /// Returns the attribute map at `path`; an empty path means the root.
    fn attributes_at(&self, path: &str) -> Option<&Attributes> {
        if path.split(self.separator()).all(str::is_empty) {
            Some(&self.root().attributes)
        } else {
            self.node_at(path).map(Node::attributes)
        }
    }

    /// Looks up a single attribute at any path.
    fn attribute(&self, path: &str, key: &str) -> Option<&AttrValue> {
        self.attributes_at(path)?.get(key)
    }
}

/// A container held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    name: String,
    root: Group,
    separator: char,
}

impl MemoryContainer {
    pub fn new(name: impl Into<String>, root: Group) -> Self {
        Self {
            name: name.into(),
            root,
            separator: '/',
        }
    }

    /// Uses a different path separator (e.g. `'.'` for dotted tensor names).
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }
}

impl Container for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Group {
        &self.root
    }

    fn separator(&self) -> char {
        self.separator
    }
}
