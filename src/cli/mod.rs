// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipeflow.

pub mod graph;
pub mod kinds;
pub mod run;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lazy dataflow graph runner
///
/// Build typed node graphs from YAML recipes and evaluate their outputs.
#[derive(Parser, Debug)]
#[clap(
    name = "pipeflow",
    version,
    about = "Build and evaluate lazy dataflow graphs from YAML recipes",
    long_about = None,
    after_help = "Examples:\n\
        pipeflow run recipe.yaml              Evaluate the recipe outputs\n\
        pipeflow graph recipe.yaml -f dot     Render the graph as DOT\n\
        pipeflow validate recipe.yaml         Check wiring and bodies\n\
        pipeflow kinds                        List available node kinds\n\n\
        See 'pipeflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate the outputs listed in a recipe
    Run {
        /// Recipe file
        recipe: PathBuf,

        /// Output format (text, json)
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,

        /// Stop after this many values per output
        #[clap(short, long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Show a recipe's graph
    Graph {
        /// Recipe file
        recipe: PathBuf,

        /// Output format (text, dot, mermaid)
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },

    /// Validate a recipe and the graph it builds
    Validate {
        /// Recipe file
        recipe: PathBuf,
    },

    /// List the node kinds recipes can use
    Kinds,
}

/// Output format for the run command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}
