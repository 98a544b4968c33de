// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Declarative graph recipes
//!
//! A recipe is a YAML description of how to assemble a graph from node
//! kinds. It is an input format only; graph state is never written back.

mod definition;
mod loader;

pub use definition::{PortSpec, Recipe, RecipeConnection, RecipeNode, RECIPE_VERSION};
pub use loader::{LoadedRecipe, RecipeLoader};
