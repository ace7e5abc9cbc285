// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommands and the helpers they share.

pub mod inspect;
pub mod relay;
pub mod summarize;

use crate::ModelSource;
use anyhow::Context;
use pipeline::DigestConfig;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extension of files considered by `--latest-in`.
const MODEL_EXTENSION: &str = "safetensors";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` count picks the level.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<DigestConfig> {
    match path {
        Some(path) => {
            let config = DigestConfig::from_file(path)?;
            tracing::info!("config: loaded {}", path.display());
            Ok(config)
        }
        None => Ok(DigestConfig::default()),
    }
}

/// Resolves `--model` / `--latest-in` to a single file path.
pub fn resolve_model(source: &ModelSource) -> anyhow::Result<PathBuf> {
    match (&source.model, &source.latest_in) {
        (Some(model), _) => Ok(model.clone()),
        (None, Some(dir)) => latest_model_in(dir),
        (None, None) => anyhow::bail!("either --model or --latest-in is required"),
    }
}

/// Finds the most recently modified model file in `dir`.
fn latest_model_in(dir: &Path) -> anyhow::Result<PathBuf> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("cannot read directory '{}'", dir.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot list '{}'", dir.display()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(MODEL_EXTENSION) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        candidates.push((path, metadata.modified()?));
    }

    let latest = pick_latest(candidates)
        .with_context(|| format!("no .{MODEL_EXTENSION} files in '{}'", dir.display()))?;
    tracing::info!("selected {}", latest.display());
    Ok(latest)
}

/// Picks the candidate with the newest modification time.
/// Ties go to the lexicographically smallest path.
pub fn pick_latest(candidates: Vec<(PathBuf, SystemTime)>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .max_by(|(a_path, a_time), (b_path, b_time)| a_time.cmp(b_time).then_with(|| b_path.cmp(a_path)))
        .map(|(path, _)| path)
}

/// Truncates a string to `max_len` characters with ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_pick_latest_newest_wins() {
        let picked = pick_latest(vec![
            (PathBuf::from("a.safetensors"), at(10)),
            (PathBuf::from("b.safetensors"), at(30)),
            (PathBuf::from("c.safetensors"), at(20)),
        ]);
        assert_eq!(picked, Some(PathBuf::from("b.safetensors")));
    }

    #[test]
    fn test_pick_latest_tie_smallest_path() {
        let picked = pick_latest(vec![
            (PathBuf::from("z.safetensors"), at(30)),
            (PathBuf::from("m.safetensors"), at(30)),
            (PathBuf::from("a.safetensors"), at(10)),
        ]);
        assert_eq!(picked, Some(PathBuf::from("m.safetensors")));

        // Input order does not matter.
        let picked = pick_latest(vec![
            (PathBuf::from("m.safetensors"), at(30)),
            (PathBuf::from("z.safetensors"), at(30)),
        ]);
        assert_eq!(picked, Some(PathBuf::from("m.safetensors")));
    }

    #[test]
    fn test_pick_latest_empty() {
        assert_eq!(pick_latest(Vec::new()), None);
    }

    #[test]
    fn test_latest_model_in_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("model.safetensors"), b"x").unwrap();
        let source = ModelSource {
            model: None,
            latest_in: Some(dir.path().to_path_buf()),
        };
        assert_eq!(resolve_model(&source).unwrap(), dir.path().join("model.safetensors"));
    }

    #[test]
    fn test_latest_model_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_model_in(dir.path()).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("model_weights/dense_1", 10), "model_w...");
    }
}
