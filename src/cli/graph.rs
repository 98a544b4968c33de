// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Graph command - visualize a recipe as a graph

use miette::Result;
use std::path::PathBuf;

use super::GraphFormat;
use crate::graph::GraphExporter;
use crate::recipe::{Recipe, RecipeLoader};

/// Run the graph command
pub fn run(recipe_path: PathBuf, format: GraphFormat, _verbose: bool) -> Result<()> {
    let recipe = Recipe::from_file(&recipe_path)?;
    let loaded = RecipeLoader::new().load(&recipe)?;
    let exporter = GraphExporter::new(&loaded.graph);

    let output = match format {
        GraphFormat::Text => exporter.to_text()?,
        GraphFormat::Dot => exporter.to_dot(),
        GraphFormat::Mermaid => exporter.to_mermaid(),
    };

    print!("{}", output);

    Ok(())
}
