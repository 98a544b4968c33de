// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Builds graphs from recipes
//!
//! Everything goes through the public graph surface: nodes are created by
//! kind through the node provider, then wired with `connect`.

use std::collections::HashMap;
use std::rc::Rc;

use crate::body::{BodyProvider, BodyRegistry, LazySequence, Value};
use crate::errors::{PipelineError, PipelineResult};
use crate::graph::{InputRef, OutputRef, PipelineGraph, PipelineNodeId, PipelineNodeKind};
use crate::providers::{NodeProvider, StandardNodes};
use crate::recipe::{PortSpec, Recipe};

/// Turns recipes into graphs
pub struct RecipeLoader {
    bodies: Rc<dyn BodyProvider>,
    nodes: Rc<dyn NodeProvider>,
}

impl RecipeLoader {
    /// Loader backed by a fresh body registry and the standard node kinds
    pub fn new() -> Self {
        let bodies: Rc<dyn BodyProvider> = Rc::new(BodyRegistry::new());
        let nodes = Rc::new(StandardNodes::new(Rc::clone(&bodies)));
        Self { bodies, nodes }
    }

    /// Loader using caller-supplied providers
    pub fn with_providers(bodies: Rc<dyn BodyProvider>, nodes: Rc<dyn NodeProvider>) -> Self {
        Self { bodies, nodes }
    }

    /// Build the graph a recipe describes
    pub fn load(&self, recipe: &Recipe) -> PipelineResult<LoadedRecipe> {
        recipe.check()?;

        let mut graph = PipelineGraph::new(Rc::clone(&self.bodies)).with_node_provider(Rc::clone(&self.nodes));
        let mut names = Vec::with_capacity(recipe.nodes.len());

        for entry in &recipe.nodes {
            let kind = PipelineNodeKind::new(entry.kind.as_str());
            let id = graph
                .create_node_of_kind(&kind)
                .ok_or(PipelineError::UnknownNodeKind { kind })?;
            if let Some(title) = &entry.title {
                graph.set_title(id, title.as_str())?;
            }
            names.push((entry.name.clone(), id));
        }
        let ids: HashMap<String, PipelineNodeId> = names.iter().cloned().collect();

        for connection in &recipe.connections {
            let from = PortSpec::parse(&connection.from)?;
            let to = PortSpec::parse(&connection.to)?;
            let output = resolve_output(&graph, &ids, &from)?;
            let input = resolve_input(&graph, &ids, &to)?;
            graph.connect(output, input)?;
        }

        let outputs = recipe
            .outputs
            .iter()
            .map(|spec| {
                let parsed = PortSpec::parse(spec)?;
                let output = resolve_output(&graph, &ids, &parsed)?;
                Ok((parsed.to_string(), output))
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        tracing::debug!(
            recipe = %recipe.name,
            nodes = graph.node_count(),
            connections = graph.connection_count(),
            "recipe loaded"
        );

        Ok(LoadedRecipe {
            name: recipe.name.clone(),
            graph,
            names,
            outputs,
        })
    }
}

impl Default for RecipeLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn node_id(ids: &HashMap<String, PipelineNodeId>, name: &str) -> PipelineResult<PipelineNodeId> {
    ids.get(name)
        .copied()
        .ok_or_else(|| PipelineError::UnknownRecipeNode { name: name.to_string() })
}

fn resolve_output(
    graph: &PipelineGraph,
    ids: &HashMap<String, PipelineNodeId>,
    spec: &PortSpec,
) -> PipelineResult<OutputRef> {
    let node = node_id(ids, &spec.node)?;
    let Some(port) = &spec.port else {
        return graph.first_output(node);
    };

    let outputs = graph.outputs_for_node(node)?;
    outputs
        .iter()
        .find(|o| o.name() == port)
        .or_else(|| port.parse::<usize>().ok().and_then(|i| outputs.get(i)))
        .map(|o| o.reference())
        .ok_or_else(|| PipelineError::UnknownPort {
            node: spec.node.clone(),
            direction: "output",
            port: port.clone(),
        })
}

fn resolve_input(
    graph: &PipelineGraph,
    ids: &HashMap<String, PipelineNodeId>,
    spec: &PortSpec,
) -> PipelineResult<InputRef> {
    let node = node_id(ids, &spec.node)?;
    let Some(port) = &spec.port else {
        return graph.free_input(node);
    };

    let inputs = graph.inputs_for_node(node)?;
    inputs
        .iter()
        .find(|i| i.name() == port)
        .or_else(|| port.parse::<usize>().ok().and_then(|i| inputs.get(i)))
        .map(|i| i.reference())
        .ok_or_else(|| PipelineError::UnknownPort {
            node: spec.node.clone(),
            direction: "input",
            port: port.clone(),
        })
}

/// A graph built from a recipe
#[derive(Debug)]
pub struct LoadedRecipe {
    pub name: String,
    pub graph: PipelineGraph,
    /// Recipe node names with their ids, in recipe order
    pub names: Vec<(String, PipelineNodeId)>,
    /// Requested outputs, labelled `node` or `node.output` as written
    pub outputs: Vec<(String, OutputRef)>,
}

impl LoadedRecipe {
    /// Id of a named recipe node
    pub fn node(&self, name: &str) -> Option<PipelineNodeId> {
        self.names.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Recipe name of a node id
    pub fn name_of(&self, id: PipelineNodeId) -> Option<&str> {
        self.names.iter().find(|(_, n)| *n == id).map(|(name, _)| name.as_str())
    }

    /// Compute every requested output
    ///
    /// Sequences are returned unenumerated; failures inside them surface
    /// only when iterated.
    pub fn evaluate(&self) -> PipelineResult<Vec<(String, LazySequence<Value>)>> {
        self.outputs
            .iter()
            .map(|(label, output)| Ok((label.clone(), self.graph.compute(*output)?)))
            .collect()
    }
}
