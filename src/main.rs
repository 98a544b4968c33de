// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! pipeflow - lazy dataflow graph runner
//!
//! Build typed node graphs from YAML recipes and evaluate them on demand.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipeflow::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "pipeflow=debug" } else { "pipeflow=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if !pipeflow::utils::should_use_colors() {
        colored::control::set_override(false);
    }

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    match cli.command {
        Commands::Run { recipe, format, limit } => {
            pipeflow::cli::run::run(recipe, format, limit, cli.verbose)
        }
        Commands::Graph { recipe, format } => pipeflow::cli::graph::run(recipe, format, cli.verbose),
        Commands::Validate { recipe } => pipeflow::cli::validate::run(recipe, cli.verbose),
        Commands::Kinds => pipeflow::cli::kinds::run(cli.verbose),
    }
}
