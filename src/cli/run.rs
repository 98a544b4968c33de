// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Run command - evaluate a recipe's outputs

use colored::Colorize;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputFormat;
use crate::body::Value;
use crate::graph::GraphValidator;
use crate::recipe::{Recipe, RecipeLoader};
use crate::utils::print_warning;

#[derive(Debug, Serialize)]
struct RunReport {
    recipe: String,
    outputs: Vec<OutputReport>,
}

#[derive(Debug, Serialize)]
struct OutputReport {
    name: String,
    values: Vec<serde_json::Value>,
}

/// Run the recipe
pub fn run(recipe_path: PathBuf, format: OutputFormat, limit: Option<usize>, verbose: bool) -> Result<()> {
    let recipe = Recipe::from_file(&recipe_path)?;
    let loaded = RecipeLoader::new().load(&recipe)?;

    if loaded.outputs.is_empty() {
        return Err(miette::miette!(
            help = "List the outputs to evaluate under 'outputs'",
            "Recipe '{}' has no outputs to evaluate",
            recipe.name
        ));
    }

    if verbose {
        let validation = GraphValidator::validate(&loaded.graph);
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    let limit = limit.unwrap_or(usize::MAX);
    let mut report = RunReport {
        recipe: recipe.name.clone(),
        outputs: Vec::new(),
    };

    if format == OutputFormat::Text {
        println!("{} {}", "Running".bold(), recipe.name);
    }

    for (name, sequence) in loaded.evaluate()? {
        tracing::debug!(output = %name, "enumerating output");

        let mut values = Vec::new();
        for value in sequence.iter().take(limit) {
            values.push(value?);
        }

        match format {
            OutputFormat::Text => {
                let rendered: Vec<String> = values.iter().map(render).collect();
                println!("  {} = [{}]", name.cyan(), rendered.join(", "));
            }
            OutputFormat::Json => report.outputs.push(OutputReport {
                name,
                values: values.iter().map(to_json).collect(),
            }),
        }
    }

    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&report).map_err(crate::PipelineError::from)?;
        println!("{}", json);
    }

    Ok(())
}

fn render(value: &Value) -> String {
    match value.downcast_ref::<String>() {
        Ok(text) => format!("{:?}", text),
        Err(_) => format!("{:?}", value),
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    if let Ok(n) = value.downcast_ref::<i64>() {
        return serde_json::Value::from(*n);
    }
    if let Ok(x) = value.downcast_ref::<f64>() {
        return serde_json::Value::from(*x);
    }
    if let Ok(b) = value.downcast_ref::<bool>() {
        return serde_json::Value::from(*b);
    }
    if let Ok(text) = value.downcast_ref::<String>() {
        return serde_json::Value::from(text.as_str());
    }
    serde_json::Value::from(format!("{:?}", value))
}
