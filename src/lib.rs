// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! # pipeflow - lazy dataflow graphs
//!
//! `pipeflow` models a computation as a graph of typed nodes. Each node
//! owns input and output ports and is bound to a body, a function from
//! input value sequences to output value sequences. Nothing runs until a
//! computed output is enumerated.
//!
//! ## Features
//!
//! - **Typed ports** - Inputs declare accepted types, outputs their produced type
//! - **Lazy evaluation** - `compute` builds a deferred chain; bodies run on enumeration
//! - **Cartesian semantics** - Multi-input bodies see every combination of input values
//! - **Change notifications** - Observers and recorded change sets for topology edits
//! - **Recipes** - Assemble graphs from YAML with the built-in node kinds
//!
//! ## Quick Start
//!
//! ```bash
//! # Evaluate a recipe
//! pipeflow run recipe.yaml
//!
//! # Render its graph
//! pipeflow graph recipe.yaml --format mermaid
//!
//! # List node kinds
//! pipeflow kinds
//! ```

pub mod body;
pub mod cli;
pub mod errors;
pub mod graph;
pub mod providers;
pub mod recipe;
pub mod utils;

// Re-export commonly used types
pub use body::{
    BodyProvider, BodyRegistry, DataType, InvocationContext, LazySequence, PipelineBody,
    PipelineBodyId, Value,
};
pub use errors::{PipelineError, PipelineResult};
pub use graph::{
    ChangeSet, GraphEvent, InputRef, OutputRef, PipelineConnection, PipelineGraph, PipelineNodeId,
    PipelineNodeKind,
};
pub use providers::{NodeProvider, StandardNodes};
pub use recipe::{LoadedRecipe, Recipe, RecipeLoader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
