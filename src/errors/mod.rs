// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Error types
//!
//! Topology mistakes (foreign node ids, missing ports) are returned eagerly
//! from the call that made them. Data-dependent failures (unwired inputs,
//! failing bodies) travel inside lazy sequences and only surface when the
//! sequence is enumerated.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::body::DataType;
use crate::graph::{PipelineNodeId, PipelineNodeKind};

/// Result type for pipeflow operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Main error type for pipeflow
#[derive(Error, Debug, Diagnostic)]
pub enum PipelineError {
    // ─────────────────────────────────────────────────────────────────────────
    // Argument Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Node {node} does not belong to this graph")]
    #[diagnostic(
        code(pipeflow::node_not_in_graph),
        help("Node ids are only valid on the graph that created them")
    )]
    NodeNotInGraph { node: PipelineNodeId },

    #[error("Node {node} has no {direction} port at index {index}")]
    #[diagnostic(code(pipeflow::port_not_found))]
    PortNotFound {
        node: PipelineNodeId,
        direction: &'static str,
        index: usize,
    },

    #[error("Node {node} has no {direction} port to connect")]
    #[diagnostic(
        code(pipeflow::no_available_port),
        help("Declare ports with create_input/create_output when building the node")
    )]
    NoAvailablePort {
        node: PipelineNodeId,
        direction: &'static str,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Evaluation Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Input '{input}' ({index}) of node {node} is not connected")]
    #[diagnostic(
        code(pipeflow::not_connected),
        help("Connect an output to this input before enumerating the result")
    )]
    NotConnected {
        node: PipelineNodeId,
        index: usize,
        input: String,
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(pipeflow::type_mismatch))]
    TypeMismatch { expected: DataType, found: DataType },

    #[error("Node {node} has no body bound")]
    #[diagnostic(
        code(pipeflow::body_not_bound),
        help("Call set_body on the node builder")
    )]
    BodyNotBound { node: PipelineNodeId },

    #[error("Body '{body}' is not registered with the body provider")]
    #[diagnostic(code(pipeflow::body_not_found))]
    BodyNotFound { body: String },

    #[error(
        "Body of node {node} declares {body_inputs} inputs and {body_outputs} outputs, \
         but the node has {node_inputs} inputs and {node_outputs} outputs"
    )]
    #[diagnostic(code(pipeflow::arity_mismatch))]
    ArityMismatch {
        node: PipelineNodeId,
        body_inputs: usize,
        body_outputs: usize,
        node_inputs: usize,
        node_outputs: usize,
    },

    #[error("Input index {index} is out of range ({count} inputs declared)")]
    #[diagnostic(code(pipeflow::input_index_out_of_range))]
    InputIndexOutOfRange { index: usize, count: usize },

    #[error("Body of node {node} produced no sequence for output {index}")]
    #[diagnostic(code(pipeflow::output_index_out_of_range))]
    OutputIndexOutOfRange { node: PipelineNodeId, index: usize },

    #[error("Cycle detected while evaluating node {node}")]
    #[diagnostic(
        code(pipeflow::cycle_detected),
        help("A node cannot depend on its own output")
    )]
    CycleDetected { node: PipelineNodeId },

    #[error("Body failed: {message}")]
    #[diagnostic(code(pipeflow::body_failed))]
    BodyFailed { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Recipe Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Recipe file not found: {path}")]
    #[diagnostic(
        code(pipeflow::recipe_not_found),
        help("Pass the path of a YAML recipe, e.g. 'pipeflow run recipe.yaml'")
    )]
    RecipeNotFound { path: PathBuf },

    #[error("Invalid recipe: {reason}")]
    #[diagnostic(code(pipeflow::invalid_recipe))]
    InvalidRecipe {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Recipe references unknown node '{name}'")]
    #[diagnostic(
        code(pipeflow::unknown_recipe_node),
        help("Check that '{name}' is declared under 'nodes'")
    )]
    UnknownRecipeNode { name: String },

    #[error("Unknown node kind '{kind}'")]
    #[diagnostic(
        code(pipeflow::unknown_node_kind),
        help("Run 'pipeflow kinds' to list the available node kinds")
    )]
    UnknownNodeKind { kind: PipelineNodeKind },

    #[error("Node '{node}' has no {direction} named '{port}'")]
    #[diagnostic(code(pipeflow::unknown_port))]
    UnknownPort {
        node: String,
        direction: &'static str,
        port: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(pipeflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(pipeflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(pipeflow::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl PipelineError {
    /// Create a body failure from any displayable message
    pub fn body_failed(message: impl std::fmt::Display) -> Self {
        Self::BodyFailed {
            message: message.to_string(),
        }
    }

    /// Whether this error is a caller mistake reported at call time
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::NodeNotInGraph { .. } | Self::PortNotFound { .. } | Self::NoAvailablePort { .. }
        )
    }

    /// Whether this error is raised while enumerating a lazy sequence
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            Self::NotConnected { .. }
                | Self::TypeMismatch { .. }
                | Self::BodyNotBound { .. }
                | Self::BodyNotFound { .. }
                | Self::ArityMismatch { .. }
                | Self::InputIndexOutOfRange { .. }
                | Self::OutputIndexOutOfRange { .. }
                | Self::CycleDetected { .. }
                | Self::BodyFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let node = PipelineNodeId::new();
        assert!(PipelineError::NodeNotInGraph { node }.is_argument_error());
        assert!(!PipelineError::NodeNotInGraph { node }.is_evaluation_error());

        let err = PipelineError::NotConnected {
            node,
            index: 0,
            input: "x".into(),
        };
        assert!(err.is_evaluation_error());
        assert!(!err.is_argument_error());
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = PipelineError::TypeMismatch {
            expected: DataType::of::<i64>(),
            found: DataType::of::<String>(),
        };
        let msg = err.to_string();
        assert!(msg.contains("i64"));
        assert!(msg.contains("String"));
    }

    #[test]
    fn test_body_failed_helper() {
        let err = PipelineError::body_failed("division by zero");
        assert_eq!(err.to_string(), "Body failed: division by zero");
    }
}
