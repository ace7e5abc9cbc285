// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! SafeTensors files as hierarchical containers.
//!
//! A SafeTensors file is a flat map of tensor names to (dtype, shape,
//! offsets) plus an optional string-to-string `__metadata__` table. The
//! hierarchy is recovered from the names:
//!
//! - if any name contains `/`, names are split on `/` (Keras-style
//!   `dense_1/kernel:0`);
//! - otherwise they are split on `.` (PyTorch-style `h.0.attn.c_attn.weight`).
//!
//! Datasets are inserted in storage order (by data offset, ties by name), so
//! traversal follows the order tensors were written. `__metadata__` entries
//! become root attributes.
//!
//! Only the header is parsed. Tensor data is never touched.

use crate::walker::DEFAULT_MAX_DEPTH;
use crate::{AttrValue, ContainerError, DType, Dataset, Group, Node, Shape};
use safetensors::SafeTensors;
use std::path::Path;

/// A SafeTensors file opened as a [`crate::Container`].
#[derive(Debug, Clone)]
pub struct SafeTensorsContainer {
    name: String,
    root: Group,
    separator: char,
    tensor_count: usize,
}

impl SafeTensorsContainer {
    /// Opens and parses the header of a SafeTensors file.
    ///
    /// Uses memory-mapped I/O so only the header pages are read. The map is
    /// released before this returns; the container owns only the tree.
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        Self::open_with_max_depth(path, DEFAULT_MAX_DEPTH)
    }

    /// Like [`open`](Self::open), rejecting tensor names nested deeper than
    /// `max_depth` before any group for them is built.
    pub fn open_with_max_depth(path: &Path, max_depth: usize) -> Result<Self, ContainerError> {
        let file = std::fs::File::open(path).map_err(|source| ContainerError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // Memory-map the file for zero-copy header parsing.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|source| ContainerError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        let container = Self::from_bytes_with_max_depth(name, &mmap, max_depth)?;
        tracing::info!(
            "container: opened {} ({} tensors, {:.2} MB on disk)",
            path.display(),
            container.tensor_count,
            mmap.len() as f64 / (1024.0 * 1024.0),
        );
        Ok(container)
    }

    /// Parses a container from an in-memory SafeTensors buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, ContainerError> {
        Self::from_bytes_with_max_depth(name, bytes, DEFAULT_MAX_DEPTH)
    }

    /// Parses a container from bytes with an explicit nesting limit.
    pub fn from_bytes_with_max_depth(
        name: impl Into<String>,
        bytes: &[u8],
        max_depth: usize,
    ) -> Result<Self, ContainerError> {
        let (header_len, metadata) = SafeTensors::read_metadata(bytes)
            .map_err(|e| ContainerError::Header(e.to_string()))?;
        tracing::debug!("container: header is {header_len} bytes");

        let mut tensors: Vec<(String, &safetensors::tensor::TensorInfo)> =
            metadata.tensors().into_iter().collect();
        tensors.sort_by(|(a_name, a), (b_name, b)| {
            a.data_offsets
                .0
                .cmp(&b.data_offsets.0)
                .then_with(|| a_name.cmp(b_name))
        });

        let separator = if tensors.iter().any(|(name, _)| name.contains('/')) {
            '/'
        } else {
            '.'
        };

        let mut root = Group::new();
        if let Some(entries) = metadata.metadata() {
            for (key, value) in entries {
                root.attributes
                    .insert(key.clone(), AttrValue::Str(value.clone()));
            }
        }

        for (tensor_name, info) in &tensors {
            let dataset = Dataset::new(Shape::new(info.shape.clone()), convert_dtype(info.dtype));
            insert_dataset(&mut root, tensor_name, separator, max_depth, dataset)?;
        }

        Ok(Self {
            name: name.into(),
            root,
            separator,
            tensor_count: tensors.len(),
        })
    }

    /// Number of tensors listed in the header.
    pub fn tensor_count(&self) -> usize {
        self.tensor_count
    }
}

impl crate::Container for SafeTensorsContainer {
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

/// Places a dataset at `path`, creating intermediate groups.
///
/// A dataset sits at depth `segments.len()`, the same depth the walker
/// assigns it, so anything the walker would reject fails here first.
fn insert_dataset(
    root: &mut Group,
    path: &str,
    separator: char,
    max_depth: usize,
    dataset: Dataset,
) -> Result<(), ContainerError> {
    let segments: Vec<&str> = path.split(separator).filter(|s| !s.is_empty()).collect();
    if segments.len() > max_depth {
        let prefix = segments[..=max_depth].join(&separator.to_string());
        return Err(ContainerError::TooDeep {
            path: prefix,
            max_depth,
        });
    }
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(ContainerError::Conflict {
            path: path.to_string(),
            detail: "tensor name has no path segments".into(),
        });
    };

    let mut group = root;
    for segment in parents {
        group = child_group_mut(group, segment).ok_or_else(|| ContainerError::Conflict {
            path: path.to_string(),
            detail: format!("'{segment}' is a dataset but is used as a group"),
        })?;
    }

    if group.child(leaf).is_some() {
        return Err(ContainerError::Conflict {
            path: path.to_string(),
            detail: format!("'{leaf}' already exists"),
        });
    }
    group.children.push((leaf.to_string(), Node::Dataset(dataset)));
    Ok(())
}

/// Returns the child group `name`, creating it if absent.
/// `None` if the name is taken by a dataset.
fn child_group_mut<'a>(group: &'a mut Group, name: &str) -> Option<&'a mut Group> {
    let index = match group.children.iter().position(|(n, _)| n == name) {
        Some(i) => i,
        None => {
            group
                .children
                .push((name.to_string(), Node::Group(Group::new())));
            group.children.len() - 1
        }
    };
    match &mut group.children[index].1 {
        Node::Group(g) => Some(g),
        Node::Dataset(_) => None,
    }
}

/// Converts a SafeTensors `Dtype` to our [`DType`].
fn convert_dtype(st_dtype: safetensors::Dtype) -> DType {
    match st_dtype {
        safetensors::Dtype::BOOL => DType::Bool,
        safetensors::Dtype::U8 => DType::U8,
        safetensors::Dtype::I8 => DType::I8,
        safetensors::Dtype::F8_E5M2 => DType::F8E5M2,
        safetensors::Dtype::F8_E4M3 => DType::F8E4M3,
        safetensors::Dtype::I16 => DType::I16,
        safetensors::Dtype::U16 => DType::U16,
        safetensors::Dtype::F16 => DType::F16,
        safetensors::Dtype::BF16 => DType::BF16,
        safetensors::Dtype::I32 => DType::I32,
        safetensors::Dtype::U32 => DType::U32,
        safetensors::Dtype::F32 => DType::F32,
        safetensors::Dtype::F64 => DType::F64,
        safetensors::Dtype::I64 => DType::I64,
        safetensors::Dtype::U64 => DType::U64,
        other => DType::Other(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Container;
    use safetensors::tensor::TensorView;
    use std::collections::HashMap;

    /// Serializes zero-filled f32 tensors with the given names and shapes.
    fn build_file(tensors: &[(&str, Vec<usize>)], metadata: Option<HashMap<String, String>>) -> Vec<u8> {
        let buffers: Vec<Vec<u8>> = tensors
            .iter()
            .map(|(_, shape)| vec![0u8; shape.iter().product::<usize>() * 4])
            .collect();
        let views: HashMap<String, TensorView<'_>> = tensors
            .iter()
            .zip(&buffers)
            .map(|((name, shape), data)| {
                (
                    name.to_string(),
                    TensorView::new(safetensors::Dtype::F32, shape.clone(), data).unwrap(),
                )
            })
            .collect();
        safetensors::serialize(&views, &metadata).unwrap()
    }

    #[test]
    fn test_slash_hierarchy() {
        let bytes = build_file(
            &[
                ("dense_1/kernel", vec![10, 5]),
                ("dense_1/bias", vec![5]),
                ("dense_2/kernel", vec![5, 2]),
            ],
            None,
        );
        let c = SafeTensorsContainer::from_bytes("mlp", &bytes).unwrap();
        assert_eq!(c.separator(), '/');
        assert_eq!(c.tensor_count(), 3);
        let kernel = c.node_at("dense_1/kernel").unwrap().as_dataset().unwrap();
        assert_eq!(kernel.shape, Shape::matrix(10, 5));
        assert_eq!(kernel.dtype, DType::F32);
    }

    #[test]
    fn test_dotted_hierarchy() {
        let bytes = build_file(&[("h.0.attn.weight", vec![4, 4]), ("h.0.attn.bias", vec![4])], None);
        let c = SafeTensorsContainer::from_bytes("gpt", &bytes).unwrap();
        assert_eq!(c.separator(), '.');
        assert!(c.node_at("h.0.attn").unwrap().as_group().is_some());
        assert!(c.node_at("h.0.attn.bias").unwrap().as_dataset().is_some());
    }

    #[test]
    fn test_metadata_becomes_root_attributes() {
        let mut meta = HashMap::new();
        meta.insert("optimizer".to_string(), "Adam".to_string());
        let bytes = build_file(&[("w", vec![2])], Some(meta));
        let c = SafeTensorsContainer::from_bytes("m", &bytes).unwrap();
        assert_eq!(c.attribute("", "optimizer"), Some(&AttrValue::from("Adam")));
    }

    #[test]
    fn test_storage_order() {
        // Same-dtype tensors are written in name order, so offsets put
        // `a/w` before `b/w` whatever order they were handed in.
        let bytes = build_file(&[("b/w", vec![1]), ("a/w", vec![1])], None);
        let c = SafeTensorsContainer::from_bytes("m", &bytes).unwrap();
        let names: Vec<&str> = c.root().children.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_dataset_used_as_group_conflicts() {
        let bytes = build_file(&[("a/b", vec![1]), ("a/b/c", vec![1])], None);
        let err = SafeTensorsContainer::from_bytes("m", &bytes).unwrap_err();
        assert!(matches!(err, ContainerError::Conflict { .. }));
    }

    #[test]
    fn test_garbage_header_is_error() {
        let err = SafeTensorsContainer::from_bytes("m", b"not a safetensors file").unwrap_err();
        assert!(matches!(err, ContainerError::Header(_)));
    }

    #[test]
    fn test_open_missing_file() {
        let err = SafeTensorsContainer::open(Path::new("/nonexistent/model.safetensors")).unwrap_err();
        assert!(matches!(err, ContainerError::Open { .. }));
    }

    #[test]
    fn test_open_from_disk_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny_cnn.safetensors");
        std::fs::write(&path, build_file(&[("conv/kernel", vec![3, 3, 1, 4])], None)).unwrap();
        let c = SafeTensorsContainer::open(&path).unwrap();
        assert_eq!(c.name(), "tiny_cnn");
        assert_eq!(
            c.node_at("conv/kernel").unwrap().as_dataset().unwrap().shape.rank(),
            4
        );
    }

    #[test]
    fn test_overly_deep_name_rejected_before_building() {
        let deep = format!("{}w", "a/".repeat(300_000));
        let bytes = build_file(&[(deep.as_str(), vec![1])], None);
        let err = SafeTensorsContainer::from_bytes("deep", &bytes).unwrap_err();
        match err {
            ContainerError::TooDeep { path, max_depth } => {
                assert_eq!(max_depth, DEFAULT_MAX_DEPTH);
                assert_eq!(path.split('/').count(), DEFAULT_MAX_DEPTH + 1);
            }
            other => panic!("expected TooDeep, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit_matches_walker() {
        let bytes = build_file(&[("a/b/c", vec![2])], None);
        let c = SafeTensorsContainer::from_bytes_with_max_depth("m", &bytes, 3).unwrap();
        assert!(crate::Walker::new().with_max_depth(3).walk(&c).is_ok());

        let err = SafeTensorsContainer::from_bytes_with_max_depth("m", &bytes, 2).unwrap_err();
        assert!(matches!(err, ContainerError::TooDeep { max_depth: 2, ref path } if path == "a/b/c"));
    }
}
