// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Validate command - check a recipe and the graph it builds

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::graph::GraphValidator;
use crate::recipe::{Recipe, RecipeLoader};
use crate::utils::{dimmed, print_error, print_section, print_success, print_warning};

/// Run the validate command
pub fn run(recipe_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating recipe...".bold());
    println!();

    let recipe = match Recipe::from_file(&recipe_path) {
        Ok(r) => r,
        Err(e) => {
            print_error("Failed to parse recipe");
            println!();
            return Err(e.into());
        }
    };
    print_success("Recipe file is valid YAML");

    let loaded = match RecipeLoader::new().load(&recipe) {
        Ok(l) => l,
        Err(e) => {
            print_error("Failed to build graph");
            println!();
            return Err(e.into());
        }
    };
    print_success(&format!(
        "Graph built: {} nodes, {} connections",
        loaded.graph.node_count(),
        loaded.graph.connection_count()
    ));

    let validation = GraphValidator::validate(&loaded.graph);

    if !validation.errors.is_empty() {
        print_section(&"Errors".red().to_string());
        for error in &validation.errors {
            print_error(error);
        }
    }

    if validation.has_warnings() {
        print_section(&"Warnings".yellow().to_string());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        print_section("Recipe summary");
        println!("  Name: {}", recipe.name);
        if let Some(description) = &recipe.description {
            println!("  Description: {}", description);
        }
        println!("  Nodes: {}", recipe.nodes.len());
        for node in &recipe.nodes {
            println!("    - {} {}", node.name, dimmed(&format!("({})", node.kind)));
        }
        println!("  Outputs: {}", recipe.outputs.join(", "));
    }

    println!();

    if !validation.is_valid() {
        return Err(miette::miette!("Recipe validation failed"));
    }

    if validation.has_warnings() {
        println!("{}", "Recipe is valid but has warnings.".yellow().bold());
    } else {
        println!("{}", "Recipe is valid!".green().bold());
    }
    Ok(())
}
