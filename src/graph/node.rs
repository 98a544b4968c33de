// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Nodes and the deferred-construction builders that produce them
//!
//! Builders only record intent. Port identities depend on the owning
//! node's id, so nothing is finalized until [`NodeBuilder::build`] is
//! handed that id by the graph.

use crate::body::{DataType, PipelineBodyId};
use crate::graph::{PipelineInput, PipelineNodeId, PipelineOutput};

const DEFAULT_TITLE: &str = "Node";

/// A unit of computation with ordered input and output ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineNode {
    id: PipelineNodeId,
    title: String,
    inputs: Vec<PipelineInput>,
    outputs: Vec<PipelineOutput>,
    body: Option<PipelineBodyId>,
}

impl PipelineNode {
    pub fn id(&self) -> PipelineNodeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Input ports in creation order
    pub fn inputs(&self) -> &[PipelineInput] {
        &self.inputs
    }

    /// Output ports in creation order
    pub fn outputs(&self) -> &[PipelineOutput] {
        &self.outputs
    }

    /// Id of the bound body, if any
    pub fn body(&self) -> Option<&PipelineBodyId> {
        self.body.as_ref()
    }

    pub fn input(&self, index: usize) -> Option<&PipelineInput> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&PipelineOutput> {
        self.outputs.get(index)
    }

    /// Find an input by name
    pub fn input_named(&self, name: &str) -> Option<&PipelineInput> {
        self.inputs.iter().find(|i| i.name() == name)
    }

    /// Find an output by name
    pub fn output_named(&self, name: &str) -> Option<&PipelineOutput> {
        self.outputs.iter().find(|o| o.name() == name)
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    /// Copy of this node under a different id, ports included
    pub(crate) fn rebound(&self, id: PipelineNodeId) -> Self {
        Self {
            id,
            title: self.title.clone(),
            inputs: self.inputs.iter().map(|i| i.rebound(id)).collect(),
            outputs: self.outputs.iter().map(|o| o.rebound(id)).collect(),
            body: self.body.clone(),
        }
    }
}

/// Accumulates the configuration of one input port
#[derive(Debug, Clone, Default)]
pub struct InputBuilder {
    name: Option<String>,
    accepted: Vec<DataType>,
}

impl InputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the port name
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Declare `T` as an accepted type
    pub fn accept<T: 'static>(&mut self) -> &mut Self {
        self.accept_type(DataType::of::<T>())
    }

    pub fn accept_type(&mut self, data_type: DataType) -> &mut Self {
        if !self.accepted.contains(&data_type) {
            self.accepted.push(data_type);
        }
        self
    }

    /// Finalize into an immutable port descriptor
    pub fn build(&self, node: PipelineNodeId, index: usize, default_name: &str) -> PipelineInput {
        PipelineInput::new(
            node,
            index,
            port_name(self.name.as_deref(), default_name, "input", index),
            self.accepted.clone(),
        )
    }
}

/// Accumulates the configuration of one output port
#[derive(Debug, Clone, Default)]
pub struct OutputBuilder {
    name: Option<String>,
    produced: Option<DataType>,
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the port name
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Declare `T` as the produced type
    pub fn produce<T: 'static>(&mut self) -> &mut Self {
        self.produce_type(DataType::of::<T>())
    }

    pub fn produce_type(&mut self, data_type: DataType) -> &mut Self {
        self.produced = Some(data_type);
        self
    }

    /// Finalize into an immutable port descriptor
    pub fn build(&self, node: PipelineNodeId, index: usize, default_name: &str) -> PipelineOutput {
        PipelineOutput::new(
            node,
            index,
            port_name(self.name.as_deref(), default_name, "output", index),
            self.produced,
        )
    }
}

fn port_name(explicit: Option<&str>, default_name: &str, prefix: &str, index: usize) -> String {
    match explicit {
        Some(name) if !name.is_empty() => name.to_string(),
        _ if !default_name.is_empty() => default_name.to_string(),
        _ => format!("{}{}", prefix, index),
    }
}

/// Accumulates the configuration of a node
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    title: Option<String>,
    inputs: Vec<(String, InputBuilder)>,
    outputs: Vec<(String, OutputBuilder)>,
    body: Option<PipelineBodyId>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Bind the node to a registered body
    pub fn set_body(&mut self, body: PipelineBodyId) -> &mut Self {
        self.body = Some(body);
        self
    }

    /// Append an input port; its index is its position among inputs
    pub fn create_input<F>(&mut self, name: impl Into<String>, configure: F) -> &mut Self
    where
        F: FnOnce(&mut InputBuilder),
    {
        let mut builder = InputBuilder::new();
        configure(&mut builder);
        self.inputs.push((name.into(), builder));
        self
    }

    /// Append an output port; its index is its position among outputs
    pub fn create_output<F>(&mut self, name: impl Into<String>, configure: F) -> &mut Self
    where
        F: FnOnce(&mut OutputBuilder),
    {
        let mut builder = OutputBuilder::new();
        configure(&mut builder);
        self.outputs.push((name.into(), builder));
        self
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Finalize the node under `id`
    pub fn build(&self, id: PipelineNodeId) -> PipelineNode {
        PipelineNode {
            id,
            title: self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            inputs: self
                .inputs
                .iter()
                .enumerate()
                .map(|(index, (name, builder))| builder.build(id, index, name))
                .collect(),
            outputs: self
                .outputs
                .iter()
                .enumerate()
                .map(|(index, (name, builder))| builder.build(id, index, name))
                .collect(),
            body: self.body.clone(),
        }
    }
}
