// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Recipe file structures
//!
//! A recipe names a set of node kinds, wires them together and lists the
//! outputs to evaluate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::errors::{PipelineError, PipelineResult};

/// Recipe loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe format version
    #[serde(default = "default_version")]
    pub version: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nodes in creation order
    pub nodes: Vec<RecipeNode>,

    /// Connections in creation order
    #[serde(default)]
    pub connections: Vec<RecipeConnection>,

    /// Outputs to evaluate, as `node` or `node.output`
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// The only recipe format version this crate reads
pub const RECIPE_VERSION: &str = "1";

fn default_version() -> String {
    RECIPE_VERSION.to_string()
}

impl Recipe {
    /// Load a recipe from a YAML file
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        if !path.exists() {
            return Err(PipelineError::RecipeNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and check a recipe from a YAML string
    pub fn from_yaml(yaml: &str) -> PipelineResult<Self> {
        let recipe: Self = serde_yaml::from_str(yaml)?;
        recipe.check()?;
        Ok(recipe)
    }

    /// Serialize recipe to YAML
    pub fn to_yaml(&self) -> PipelineResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Get a node by name
    pub fn get_node(&self, name: &str) -> Option<&RecipeNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Structural checks that need no node provider
    pub fn check(&self) -> PipelineResult<()> {
        if self.version.trim() != RECIPE_VERSION {
            return Err(PipelineError::InvalidRecipe {
                reason: format!("unsupported recipe version '{}'", self.version),
                help: Some(format!("Set 'version: \"{}\"' or omit the field", RECIPE_VERSION)),
            });
        }

        if self.nodes.is_empty() {
            return Err(PipelineError::InvalidRecipe {
                reason: format!("recipe '{}' declares no nodes", self.name),
                help: Some("Add at least one entry under 'nodes'".into()),
            });
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.name.is_empty() || node.name.contains('.') {
                return Err(PipelineError::InvalidRecipe {
                    reason: format!("invalid node name '{}'", node.name),
                    help: Some("Node names must be non-empty and must not contain '.'".into()),
                });
            }
            if !seen.insert(node.name.as_str()) {
                return Err(PipelineError::InvalidRecipe {
                    reason: format!("duplicate node name '{}'", node.name),
                    help: None,
                });
            }
        }

        let endpoints = self
            .connections
            .iter()
            .flat_map(|c| [c.from.as_str(), c.to.as_str()])
            .chain(self.outputs.iter().map(String::as_str));
        for endpoint in endpoints {
            let port = PortSpec::parse(endpoint)?;
            if !seen.contains(port.node.as_str()) {
                return Err(PipelineError::UnknownRecipeNode { name: port.node });
            }
        }

        Ok(())
    }
}

/// A node entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeNode {
    /// Name used by connections and outputs
    pub name: String,

    /// Node kind understood by the node provider
    pub kind: String,

    /// Display title; defaults to the kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A connection entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConnection {
    /// `node` or `node.output`
    pub from: String,

    /// `node` or `node.input`
    pub to: String,
}

/// Parsed `node[.port]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub node: String,
    /// Port name or index; `None` picks a default port
    pub port: Option<String>,
}

impl PortSpec {
    pub fn parse(spec: &str) -> PipelineResult<Self> {
        let spec = spec.trim();
        let (node, port) = match spec.split_once('.') {
            Some((node, port)) => (node, Some(port)),
            None => (spec, None),
        };

        if node.is_empty() || port.is_some_and(str::is_empty) {
            return Err(PipelineError::InvalidRecipe {
                reason: format!("malformed port reference '{}'", spec),
                help: Some("Use 'node' or 'node.port'".into()),
            });
        }

        Ok(Self {
            node: node.to_string(),
            port: port.map(str::to_string),
        })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.port {
            Some(port) => write!(f, "{}.{}", self.node, port),
            None => f.write_str(&self.node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUM: &str = r#"
name: sum
description: Adds two constants
nodes:
  - name: five
    kind: "const:5"
  - name: seven
    kind: "const:7"
  - name: add
    kind: math.add
    title: Sum
connections:
  - from: five
    to: add.lhs
  - from: seven.value
    to: add.rhs
outputs:
  - add
"#;

    #[test]
    fn test_parse_recipe() {
        let recipe = Recipe::from_yaml(SUM).unwrap();
        assert_eq!(recipe.name, "sum");
        assert_eq!(recipe.version, "1");
        assert_eq!(recipe.node_names(), vec!["five", "seven", "add"]);
        assert_eq!(recipe.get_node("add").unwrap().title.as_deref(), Some("Sum"));
        assert_eq!(recipe.connections.len(), 2);
        assert_eq!(recipe.outputs, vec!["add"]);
    }

    #[test]
    fn test_round_trip_yaml() {
        let recipe = Recipe::from_yaml(SUM).unwrap();
        let yaml = recipe.to_yaml().unwrap();
        let parsed = Recipe::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.node_names(), recipe.node_names());
        assert_eq!(parsed.connections.len(), recipe.connections.len());
    }

    #[test]
    fn test_port_spec() {
        assert_eq!(
            PortSpec::parse("add.lhs").unwrap(),
            PortSpec {
                node: "add".into(),
                port: Some("lhs".into())
            }
        );
        assert_eq!(PortSpec::parse(" add ").unwrap().port, None);
        assert!(PortSpec::parse(".lhs").is_err());
        assert!(PortSpec::parse("add.").is_err());
        assert_eq!(PortSpec::parse("add.1").unwrap().to_string(), "add.1");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = r#"
name: dup
nodes:
  - name: a
    kind: "const:1"
  - name: a
    kind: "const:2"
"#;
        let err = Recipe::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRecipe { .. }));
    }

    #[test]
    fn test_unknown_node_reference() {
        let yaml = r#"
name: missing
nodes:
  - name: a
    kind: "const:1"
outputs:
  - b.value
"#;
        let err = Recipe::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownRecipeNode { name } if name == "b"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let yaml = format!("version: \"2\"\n{}", SUM.trim_start());
        match Recipe::from_yaml(&yaml).unwrap_err() {
            PipelineError::InvalidRecipe { reason, help } => {
                assert!(reason.contains("'2'"));
                assert!(help.unwrap().contains("version"));
            }
            other => panic!("expected InvalidRecipe, got {:?}", other),
        }

        let yaml = format!("version: \"1\"\n{}", SUM.trim_start());
        assert!(Recipe::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn test_empty_recipe_rejected() {
        let err = Recipe::from_yaml("name: empty\nnodes: []\n").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRecipe { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Recipe::from_file(Path::new("/nonexistent/recipe.yaml")).unwrap_err();
        assert!(matches!(err, PipelineError::RecipeNotFound { .. }));
    }
}
