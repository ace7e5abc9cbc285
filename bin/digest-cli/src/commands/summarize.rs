// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `model-digest summarize`: print the bounded summary, optionally keep it
//! and relay it.
//!
//! On failure the structured error object is printed (and written) in place
//! of the summary, and the command exits non-zero.

use super::relay::HttpRelay;
use anyhow::Context;
use pipeline::{error_value, DigestConfig, Digester};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use summary_budget::ByteBudget;

pub struct SummarizeArgs {
    pub model: PathBuf,
    pub budget: Option<String>,
    pub output: Option<PathBuf>,
    pub relay_url: Option<String>,
    pub pretty: bool,
    pub stats: bool,
}

pub fn execute(mut config: DigestConfig, args: SummarizeArgs) -> anyhow::Result<()> {
    if let Some(budget) = &args.budget {
        ByteBudget::parse(budget).with_context(|| format!("invalid --budget '{budget}'"))?;
        config.summary_budget = budget.clone();
    }
    let digester = Digester::from_config(&config)?;
    let model_name = args
        .model
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());

    let digest = match digester.digest_file(&args.model) {
        Ok(digest) => digest,
        Err(err) => {
            let response = error_value(&err.report(model_name.as_deref()));
            emit(&response, args.output.as_deref(), args.pretty)?;
            return Err(err).with_context(|| format!("failed to summarize '{}'", args.model.display()));
        }
    };

    let response = digest.to_value()?;
    emit(&response, args.output.as_deref(), args.pretty)?;
    if args.stats {
        eprintln!("{}", digest.stats.summary());
        eprintln!(
            "{} of {} layers kept in the output",
            digest.view().layer_entries(),
            digest.summary.total_layers()
        );
    }

    if let Some(url) = &args.relay_url {
        let relay = HttpRelay::new(url.as_str(), config.relay.timeout_secs.map(Duration::from_secs))?;
        let delivery = digester
            .relay(&digest, &config.cancel_token(), |payload| relay.send(payload))
            .with_context(|| format!("relay to '{url}' failed"))?;
        eprintln!(
            "Relayed to {url} in {} attempt(s), {} bytes ({:?})",
            delivery.attempts, delivery.size, delivery.stage
        );
        println!("{}", render(&delivery.response, args.pretty)?);
    }
    Ok(())
}

fn render(value: &Value, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// Prints the response and, if requested, writes it to a new file.
fn emit(response: &Value, output: Option<&Path>, pretty: bool) -> anyhow::Result<()> {
    let text = render(response, pretty)?;
    println!("{text}");
    if let Some(path) = output {
        write_once(path, &text)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

/// Writes `text` to `path`, failing if the file already exists.
fn write_once(path: &Path, text: &str) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("cannot create '{}' (it must not already exist)", path.display()))?;
    file.write_all(text.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_once_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_once(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
        assert!(write_once(&path, r#"{"other":1}"#).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_missing_model_writes_error_object() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let args = SummarizeArgs {
            model: dir.path().join("absent.safetensors"),
            budget: Some("2K".into()),
            output: Some(output.clone()),
            relay_url: None,
            pretty: false,
            stats: false,
        };
        assert!(execute(DigestConfig::default(), args).is_err());

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["error"], "Failed to read model container");
        assert_eq!(written["model_name"], "absent");
    }

    #[test]
    fn test_invalid_budget_rejected() {
        let args = SummarizeArgs {
            model: PathBuf::from("unused.safetensors"),
            budget: Some("plenty".into()),
            output: None,
            relay_url: None,
            pretty: false,
            stats: false,
        };
        assert!(execute(DigestConfig::default(), args).is_err());
    }
}
