// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Ports and port references
//!
//! A port is addressed by its owning node and its index on that node.
//! Indices are assigned in creation order and never change.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::body::DataType;
use crate::graph::PipelineNodeId;

/// Address of an output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputRef {
    pub node: PipelineNodeId,
    pub index: usize,
}

impl OutputRef {
    pub fn new(node: PipelineNodeId, index: usize) -> Self {
        Self { node, index }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.out{}", self.node.short(), self.index)
    }
}

/// Address of an input port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputRef {
    pub node: PipelineNodeId,
    pub index: usize,
}

impl InputRef {
    pub fn new(node: PipelineNodeId, index: usize) -> Self {
        Self { node, index }
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.in{}", self.node.short(), self.index)
    }
}

/// A named input port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInput {
    node: PipelineNodeId,
    index: usize,
    name: String,
    accepted: Vec<DataType>,
}

impl PipelineInput {
    pub(crate) fn new(node: PipelineNodeId, index: usize, name: String, accepted: Vec<DataType>) -> Self {
        Self {
            node,
            index,
            name,
            accepted,
        }
    }

    pub fn node(&self) -> PipelineNodeId {
        self.node
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Types this input declares it accepts; empty means any
    pub fn accepted_types(&self) -> &[DataType] {
        &self.accepted
    }

    /// Whether a value of `data_type` is declared acceptable here
    pub fn accepts(&self, data_type: &DataType) -> bool {
        self.accepted.is_empty() || self.accepted.contains(data_type)
    }

    pub fn reference(&self) -> InputRef {
        InputRef::new(self.node, self.index)
    }

    /// Same port re-homed onto another node
    pub(crate) fn rebound(&self, node: PipelineNodeId) -> Self {
        Self {
            node,
            ..self.clone()
        }
    }
}

/// A named output port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    node: PipelineNodeId,
    index: usize,
    name: String,
    produced: Option<DataType>,
}

impl PipelineOutput {
    pub(crate) fn new(node: PipelineNodeId, index: usize, name: String, produced: Option<DataType>) -> Self {
        Self {
            node,
            index,
            name,
            produced,
        }
    }

    pub fn node(&self) -> PipelineNodeId {
        self.node
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type this output declares it produces, if any
    pub fn produced_type(&self) -> Option<DataType> {
        self.produced
    }

    pub fn reference(&self) -> OutputRef {
        OutputRef::new(self.node, self.index)
    }

    pub(crate) fn rebound(&self, node: PipelineNodeId) -> Self {
        Self {
            node,
            ..self.clone()
        }
    }
}

impl From<&PipelineOutput> for OutputRef {
    fn from(output: &PipelineOutput) -> Self {
        output.reference()
    }
}

impl From<&PipelineInput> for InputRef {
    fn from(input: &PipelineInput) -> Self {
        input.reference()
    }
}

/// Anything reachability queries can start or end at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Node(PipelineNodeId),
    Output(OutputRef),
    Input(InputRef),
}

impl Endpoint {
    /// Node owning this endpoint
    pub fn node(&self) -> PipelineNodeId {
        match self {
            Self::Node(node) => *node,
            Self::Output(output) => output.node,
            Self::Input(input) => input.node,
        }
    }
}

impl From<PipelineNodeId> for Endpoint {
    fn from(node: PipelineNodeId) -> Self {
        Self::Node(node)
    }
}

impl From<OutputRef> for Endpoint {
    fn from(output: OutputRef) -> Self {
        Self::Output(output)
    }
}

impl From<InputRef> for Endpoint {
    fn from(input: InputRef) -> Self {
        Self::Input(input)
    }
}

impl From<&PipelineOutput> for Endpoint {
    fn from(output: &PipelineOutput) -> Self {
        Self::Output(output.reference())
    }
}

impl From<&PipelineInput> for Endpoint {
    fn from(input: &PipelineInput) -> Self {
        Self::Input(input.reference())
    }
}
