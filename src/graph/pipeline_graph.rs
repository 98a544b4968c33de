// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! The node/connection registry
//!
//! The graph stores topology only: nodes, their ports and the connections
//! between them. Values are never stored; they are produced on demand by
//! [`PipelineGraph::compute`].

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;

use crate::body::BodyProvider;
use crate::errors::{PipelineError, PipelineResult};
use crate::graph::events::Observers;
use crate::graph::{
    ChangeSet, Endpoint, GraphEvent, InputRef, NodeBuilder, ObserverId, OutputRef,
    PipelineConnection, PipelineInput, PipelineNode, PipelineNodeId, PipelineNodeKind,
    PipelineOutput,
};
use crate::providers::NodeProvider;

/// A mutable graph of typed nodes joined by directed connections
pub struct PipelineGraph {
    nodes: HashMap<PipelineNodeId, PipelineNode>,
    /// Node ids in creation order
    order: Vec<PipelineNodeId>,
    /// Connections in insertion order
    connections: Vec<PipelineConnection>,
    /// Node-level adjacency; edge weight counts the connections between a pair
    topology: DiGraphMap<PipelineNodeId, usize>,
    bodies: Rc<dyn BodyProvider>,
    node_provider: Option<Rc<dyn NodeProvider>>,
    observers: Observers,
}

impl fmt::Debug for PipelineGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineGraph")
            .field("nodes", &self.order.len())
            .field("connections", &self.connections.len())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl PipelineGraph {
    /// Create an empty graph resolving bodies through `bodies`
    pub fn new(bodies: Rc<dyn BodyProvider>) -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            connections: Vec::new(),
            topology: DiGraphMap::new(),
            bodies,
            node_provider: None,
            observers: Observers::default(),
        }
    }

    /// Use `provider` for [`PipelineGraph::create_node_of_kind`]
    pub fn with_node_provider(mut self, provider: Rc<dyn NodeProvider>) -> Self {
        self.node_provider = Some(provider);
        self
    }

    /// Body provider used by [`PipelineGraph::compute`]
    pub fn body_provider(&self) -> &Rc<dyn BodyProvider> {
        &self.bodies
    }

    pub fn node_provider(&self) -> Option<&Rc<dyn NodeProvider>> {
        self.node_provider.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Nodes
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a node through the builder DSL and add it
    pub fn create_node<F>(&mut self, build: F) -> PipelineNodeId
    where
        F: FnOnce(&mut NodeBuilder),
    {
        let mut builder = NodeBuilder::new();
        build(&mut builder);
        self.insert_node(builder.build(PipelineNodeId::new()))
    }

    /// Add a node described by a node kind
    ///
    /// Returns `None` when no node provider is set or the provider does
    /// not recognize `kind`.
    pub fn create_node_of_kind(&mut self, kind: &PipelineNodeKind) -> Option<PipelineNodeId> {
        let provider = self.node_provider.clone()?;
        if !provider.can_create_node(kind) {
            tracing::debug!(%kind, "node provider cannot create kind");
            return None;
        }

        let mut builder = NodeBuilder::new();
        builder.set_title(kind.as_str());
        provider.create_node(kind, &mut builder);
        Some(self.insert_node(builder.build(PipelineNodeId::new())))
    }

    fn insert_node(&mut self, node: PipelineNode) -> PipelineNodeId {
        let id = node.id();
        tracing::debug!(node = %id.short(), title = node.title(), "node created");
        self.topology.add_node(id);
        self.order.push(id);
        self.nodes.insert(id, node);
        self.observers.emit(&GraphEvent::NodeCreated(id));
        id
    }

    /// Remove a node and every connection touching it
    ///
    /// Observers see the node removal before any of the connection
    /// removals it triggers. Guards are asked about the node and then each
    /// of its connections before anything changes; a single veto leaves the
    /// graph untouched. Returns `false` for an unknown id or a veto.
    pub fn remove_node(&mut self, id: PipelineNodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }

        let incident: Vec<PipelineConnection> = self
            .connections
            .iter()
            .filter(|c| c.involves_node(id))
            .copied()
            .collect();
        let permitted = self.observers.permits(&GraphEvent::NodeRemoving(id))
            && incident
                .iter()
                .all(|c| self.observers.permits(&GraphEvent::ConnectionRemoving(*c)));
        if !permitted {
            return false;
        }

        self.observers.emit(&GraphEvent::NodeRemoving(id));
        for connection in &incident {
            self.remove_connection(connection);
        }

        self.nodes.remove(&id);
        self.order.retain(|n| *n != id);
        self.topology.remove_node(id);
        tracing::debug!(node = %id.short(), connections = incident.len(), "node removed");
        true
    }

    pub fn contains_node(&self, id: PipelineNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: PipelineNodeId) -> Option<&PipelineNode> {
        self.nodes.get(&id)
    }

    /// Node ids in creation order
    pub fn node_ids(&self) -> &[PipelineNodeId] {
        &self.order
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &PipelineNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Title of a node, `None` for an unknown id
    pub fn title_for_node(&self, id: PipelineNodeId) -> Option<&str> {
        self.nodes.get(&id).map(PipelineNode::title)
    }

    pub fn set_title(&mut self, id: PipelineNodeId, title: impl Into<String>) -> PipelineResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(PipelineError::NodeNotInGraph { node: id })?;
        node.set_title(title.into());
        Ok(())
    }

    /// Output ports of a node in creation order
    pub fn outputs_for_node(&self, id: PipelineNodeId) -> PipelineResult<&[PipelineOutput]> {
        Ok(self.require_node(id)?.outputs())
    }

    /// Input ports of a node in creation order
    pub fn inputs_for_node(&self, id: PipelineNodeId) -> PipelineResult<&[PipelineInput]> {
        Ok(self.require_node(id)?.inputs())
    }

    pub(crate) fn require_node(&self, id: PipelineNodeId) -> PipelineResult<&PipelineNode> {
        self.nodes.get(&id).ok_or(PipelineError::NodeNotInGraph { node: id })
    }

    pub(crate) fn require_output(&self, output: OutputRef) -> PipelineResult<&PipelineOutput> {
        self.require_node(output.node)?
            .output(output.index)
            .ok_or(PipelineError::PortNotFound {
                node: output.node,
                direction: "output",
                index: output.index,
            })
    }

    pub(crate) fn require_input(&self, input: InputRef) -> PipelineResult<&PipelineInput> {
        self.require_node(input.node)?
            .input(input.index)
            .ok_or(PipelineError::PortNotFound {
                node: input.node,
                direction: "input",
                index: input.index,
            })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connections
    // ─────────────────────────────────────────────────────────────────────────

    /// Connect an output to an input
    ///
    /// Both ports must belong to nodes of this graph. Connecting a pair
    /// that is already connected returns the existing connection. Declared
    /// port types are not enforced; a mismatch is only logged.
    pub fn connect(
        &mut self,
        output: impl Into<OutputRef>,
        input: impl Into<InputRef>,
    ) -> PipelineResult<PipelineConnection> {
        let output = output.into();
        let input = input.into();

        let produced = self.require_output(output)?.produced_type();
        let target = self.require_input(input)?;
        if let Some(produced) = produced {
            if !target.accepts(&produced) {
                tracing::warn!(
                    %output,
                    %input,
                    produced = %produced,
                    "connecting ports with mismatched types"
                );
            }
        }

        let connection = PipelineConnection::new(output, input);
        if !self.connections.contains(&connection) {
            self.insert_connection(connection);
        }
        Ok(connection)
    }

    /// Connect the first output of `from` to the first free input of `to`
    ///
    /// An input is free when nothing is connected to it yet. If every input
    /// of `to` is already wired, the first input receives the extra source.
    pub fn connect_nodes(
        &mut self,
        from: PipelineNodeId,
        to: PipelineNodeId,
    ) -> PipelineResult<PipelineConnection> {
        let output = self.first_output(from)?;
        let input = self.free_input(to)?;
        self.connect(output, input)
    }

    /// First output of a node
    pub fn first_output(&self, node: PipelineNodeId) -> PipelineResult<OutputRef> {
        self.outputs_for_node(node)?
            .first()
            .map(PipelineOutput::reference)
            .ok_or(PipelineError::NoAvailablePort {
                node,
                direction: "output",
            })
    }

    /// First input of a node with nothing connected, else its first input
    pub fn free_input(&self, node: PipelineNodeId) -> PipelineResult<InputRef> {
        let inputs = self.inputs_for_node(node)?;
        inputs
            .iter()
            .map(PipelineInput::reference)
            .find(|input| self.connections_into(*input).next().is_none())
            .or_else(|| inputs.first().map(PipelineInput::reference))
            .ok_or(PipelineError::NoAvailablePort {
                node,
                direction: "input",
            })
    }

    fn insert_connection(&mut self, connection: PipelineConnection) {
        let (from, to) = (connection.source.node, connection.target.node);
        match self.topology.edge_weight_mut(from, to) {
            Some(count) => *count += 1,
            None => {
                self.topology.add_edge(from, to, 1);
            }
        }
        self.connections.push(connection);
        tracing::debug!(%connection, "connection created");
        self.observers.emit(&GraphEvent::ConnectionCreated(connection));
    }

    /// Remove a connection; `false` if it does not exist or a guard vetoes it
    pub fn disconnect(&mut self, connection: &PipelineConnection) -> bool {
        if !self.connections.contains(connection)
            || !self.observers.permits(&GraphEvent::ConnectionRemoving(*connection))
        {
            return false;
        }
        self.remove_connection(connection);
        true
    }

    fn remove_connection(&mut self, connection: &PipelineConnection) {
        self.observers.emit(&GraphEvent::ConnectionRemoving(*connection));

        self.connections.retain(|c| c != connection);
        let (from, to) = (connection.source.node, connection.target.node);
        let remaining = match self.topology.edge_weight_mut(from, to) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };
        if remaining == 0 {
            self.topology.remove_edge(from, to);
        }
        tracing::debug!(%connection, "connection removed");
    }

    /// Connections in insertion order
    pub fn connections(&self) -> &[PipelineConnection] {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections feeding `input`, in insertion order
    pub fn connections_into(&self, input: InputRef) -> impl Iterator<Item = &PipelineConnection> {
        self.connections.iter().filter(move |c| c.target == input)
    }

    /// Connections leaving `output`, in insertion order
    pub fn connections_from(&self, output: OutputRef) -> impl Iterator<Item = &PipelineConnection> {
        self.connections.iter().filter(move |c| c.source == output)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reachability
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether a single connection leads from `from` to `to`
    pub fn are_directly_connected(&self, from: impl Into<Endpoint>, to: impl Into<Endpoint>) -> bool {
        let (from, to) = (from.into(), to.into());
        self.connections
            .iter()
            .any(|c| leaves(from, c) && arrives(to, c))
    }

    /// Whether a path of one or more connections leads from `from` to `to`
    ///
    /// A path passes through a node from any of its inputs to any of its
    /// outputs.
    pub fn are_connected(&self, from: impl Into<Endpoint>, to: impl Into<Endpoint>) -> bool {
        let (from, to) = (from.into(), to.into());
        if !self.contains_node(from.node()) || !self.contains_node(to.node()) {
            return false;
        }

        self.connections
            .iter()
            .filter(|c| leaves(from, c))
            .any(|first| {
                if arrives(to, first) {
                    return true;
                }
                let next = first.target.node;
                match to {
                    Endpoint::Node(node) => self.reaches(next, node),
                    Endpoint::Output(output) => self.reaches(next, output.node),
                    Endpoint::Input(input) => self
                        .connections_into(input)
                        .any(|last| self.reaches(next, last.source.node)),
                }
            })
    }

    fn reaches(&self, from: PipelineNodeId, to: PipelineNodeId) -> bool {
        has_path_connecting(&self.topology, from, to, None)
    }

    /// Node-level adjacency, for exporters and validators
    pub(crate) fn topology(&self) -> &DiGraphMap<PipelineNodeId, usize> {
        &self.topology
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Merging
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy every node and connection of `other` into this graph
    ///
    /// Copies get fresh node ids, so nothing collides with either graph and
    /// `other` is left untouched. Body ids are copied as-is and resolve
    /// through this graph's body provider. Returns the old→new id mapping.
    pub fn add_from_graph(&mut self, other: &PipelineGraph) -> HashMap<PipelineNodeId, PipelineNodeId> {
        let mapping: HashMap<PipelineNodeId, PipelineNodeId> = other
            .order
            .iter()
            .map(|old| (*old, PipelineNodeId::new()))
            .collect();

        for old in &other.order {
            if let (Some(node), Some(new)) = (other.nodes.get(old), mapping.get(old)) {
                self.insert_node(node.rebound(*new));
            }
        }
        for connection in &other.connections {
            if let Some(copy) = connection.remapped(|id| mapping.get(&id).copied()) {
                self.insert_connection(copy);
            }
        }

        tracing::debug!(
            nodes = mapping.len(),
            connections = other.connections.len(),
            "merged graph"
        );
        mapping
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Observation
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a callback for topology changes
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&GraphEvent) + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    /// Register a guard that may veto node and connection removals
    ///
    /// The guard sees `NodeRemoving` and `ConnectionRemoving` events before
    /// the change happens and blocks it by returning `ControlFlow::Break`.
    /// It is released with [`PipelineGraph::unsubscribe`] like an observer.
    pub fn subscribe_guard<F>(&mut self, guard: F) -> ObserverId
    where
        F: FnMut(&GraphEvent) -> ControlFlow<()> + 'static,
    {
        self.observers.guard(Box::new(guard))
    }

    /// Cancel a subscription; `false` if it was not active
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Run `action` and return the net topology changes it made
    pub fn recording_changes<F>(&mut self, action: F) -> ChangeSet
    where
        F: FnOnce(&mut Self),
    {
        self.record(action).1
    }

    /// Like [`PipelineGraph::recording_changes`] for fallible actions
    ///
    /// Mutations made before an error are kept; only the change set is
    /// discarded.
    pub fn try_recording_changes<R, F>(&mut self, action: F) -> PipelineResult<(R, ChangeSet)>
    where
        F: FnOnce(&mut Self) -> PipelineResult<R>,
    {
        let (result, changes) = self.record(action);
        result.map(|value| (value, changes))
    }

    fn record<R, F>(&mut self, action: F) -> (R, ChangeSet)
    where
        F: FnOnce(&mut Self) -> R,
    {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let id = self.subscribe(move |event| sink.borrow_mut().push(*event));

        let value = action(self);

        self.unsubscribe(id);
        let changes = ChangeSet::from_events(log.borrow().iter());
        (value, changes)
    }
}

/// Whether `connection` starts at `from`
///
/// Starting at an input means leaving through its node's outputs.
fn leaves(from: Endpoint, connection: &PipelineConnection) -> bool {
    match from {
        Endpoint::Node(node) => connection.source.node == node,
        Endpoint::Output(output) => connection.source == output,
        Endpoint::Input(input) => connection.source.node == input.node,
    }
}

/// Whether `connection` ends at `to`
fn arrives(to: Endpoint, connection: &PipelineConnection) -> bool {
    match to {
        Endpoint::Node(node) => connection.target.node == node,
        Endpoint::Input(input) => connection.target == input,
        Endpoint::Output(output) => connection.target.node == output.node,
    }
}
