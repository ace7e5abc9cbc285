// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-digest
//!
//! Command-line interface for bounded model-container summaries.
//!
//! ## Usage
//! ```bash
//! # Summarize a model within an 8 KB budget and keep the result
//! model-digest summarize --model ./models/mlp.safetensors --budget 8K --output mlp.json
//!
//! # Summarize the most recently modified model in a directory
//! model-digest summarize --latest-in ./uploads
//!
//! # Relay the bounded summary to a downstream service
//! model-digest summarize --model ./models/mlp.safetensors --relay-url http://localhost:8080/analyze
//!
//! # Inspect layers and the raw container tree
//! model-digest inspect --model ./models/mlp.safetensors --tree
//! ```

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "model-digest",
    about = "Size-bounded structural summaries of model container files",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where the model file comes from.
#[derive(Args, Debug, Clone)]
pub struct ModelSource {
    /// Path to a SafeTensors model file.
    #[arg(short, long, required_unless_present = "latest_in", conflicts_with = "latest_in")]
    pub model: Option<PathBuf>,

    /// Use the most recently modified `.safetensors` file in this directory.
    #[arg(long)]
    pub latest_in: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a model and print the bounded JSON summary.
    Summarize {
        #[command(flatten)]
        source: ModelSource,

        /// Summary byte budget (e.g., "4096", "8K", "1M").
        #[arg(short, long)]
        budget: Option<String>,

        /// Also write the response to this file. Refuses to overwrite.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// POST the bounded summary to this URL through the retry guard.
        #[arg(long)]
        relay_url: Option<String>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,

        /// Print run statistics to stderr.
        #[arg(long)]
        stats: bool,
    },

    /// Inspect a model: print its layers and, optionally, the raw tree.
    Inspect {
        #[command(flatten)]
        source: ModelSource,

        /// Also print every group and dataset record.
        #[arg(long)]
        tree: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Summarize {
            source,
            budget,
            output,
            relay_url,
            pretty,
            stats,
        } => commands::summarize::execute(
            config,
            commands::summarize::SummarizeArgs {
                model: commands::resolve_model(&source)?,
                budget,
                output,
                relay_url,
                pretty,
                stats,
            },
        ),
        Commands::Inspect { source, tree } => {
            commands::inspect::execute(&config, &commands::resolve_model(&source)?, tree)
        }
    }
}
