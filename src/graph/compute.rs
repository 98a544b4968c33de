// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Lazy evaluation of node outputs
//!
//! [`PipelineGraph::compute`] collects the nodes the requested output
//! depends on and wires their lazy sequences together in dependency
//! order, one node at a time. Each upstream output is wired once per call
//! however many inputs read it. Wiring never runs a body: bodies are
//! invoked when a consumer pulls from the result, and an upstream branch
//! nobody reads is never invoked.
//!
//! Every call builds its own chain. Nothing is cached between calls, so
//! two outputs of the same node computed separately invoke its body twice.
//! Enumeration pulls through one iterator per node on the path, so very
//! deep chains need a correspondingly deep stack while they are drained.

use petgraph::algo::kosaraju_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::body::{InvocationContext, LazySequence, Value};
use crate::errors::{PipelineError, PipelineResult};
use crate::graph::{OutputRef, PipelineGraph, PipelineInput, PipelineNodeId};

type Wired = HashMap<OutputRef, LazySequence<Value>>;

impl PipelineGraph {
    /// Lazily compute the values of an output
    ///
    /// Fails immediately only if `output` is not a port of this graph.
    /// Everything else (unconnected inputs, missing bodies, cycles, body
    /// failures) is reported as an error item when the sequence is
    /// enumerated.
    pub fn compute(&self, output: impl Into<OutputRef>) -> PipelineResult<LazySequence<Value>> {
        let output = output.into();
        self.require_output(output)?;

        let upstream = self.upstream_of(output.node);
        let mut wired = Wired::new();
        let mut chain = Vec::new();

        // Components come sinks first; wire sources first
        for component in kosaraju_scc(&upstream).iter().rev() {
            let cyclic = component.len() > 1
                || component.iter().any(|node| upstream.contains_edge(*node, *node));

            for &node_id in component {
                let outputs = if cyclic {
                    self.cyclic_outputs(node_id)
                } else {
                    self.wire_node(node_id, &wired)
                };
                for (index, sequence) in outputs.into_iter().enumerate() {
                    chain.push(sequence.clone());
                    wired.insert(OutputRef::new(node_id, index), sequence);
                }
            }
        }

        let target = wired
            .remove(&output)
            .ok_or(PipelineError::PortNotFound {
                node: output.node,
                direction: "output",
                index: output.index,
            })?;
        tracing::trace!(%output, nodes = upstream.node_count(), "wired computation");

        // Consumers are released before their sources, so dropping the
        // result never unwinds the chain recursively
        chain.reverse();
        let held = Rc::new((target, chain));
        Ok(LazySequence::from_fn(move || held.0.iter()))
    }

    /// Like [`PipelineGraph::compute`], downcasting every value to `T`
    pub fn compute_as<T: Any + Clone>(&self, output: impl Into<OutputRef>) -> PipelineResult<LazySequence<T>> {
        Ok(self.compute(output)?.try_map(|value| value.downcast::<T>()))
    }

    /// `node` and every node it transitively reads from
    fn upstream_of(&self, node: PipelineNodeId) -> DiGraphMap<PipelineNodeId, ()> {
        let mut upstream = DiGraphMap::new();
        upstream.add_node(node);

        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            for source in self.topology().neighbors_directed(current, Direction::Incoming) {
                if !upstream.contains_node(source) {
                    upstream.add_node(source);
                    pending.push(source);
                }
                upstream.add_edge(source, current, ());
            }
        }
        upstream
    }

    fn cyclic_outputs(&self, node_id: PipelineNodeId) -> Vec<LazySequence<Value>> {
        failing(self.output_count(node_id), move || PipelineError::CycleDetected { node: node_id })
    }

    fn output_count(&self, node_id: PipelineNodeId) -> usize {
        self.node(node_id).map_or(0, |node| node.outputs().len())
    }

    /// One deferred sequence per output of `node_id`; its sources must
    /// already be in `wired`
    fn wire_node(&self, node_id: PipelineNodeId, wired: &Wired) -> Vec<LazySequence<Value>> {
        let Some(node) = self.node(node_id) else {
            return Vec::new();
        };
        let count = node.outputs().len();

        let Some(body_id) = node.body() else {
            return failing(count, move || PipelineError::BodyNotBound { node: node_id });
        };
        let Some(body) = self.body_provider().get_body(body_id) else {
            let body = body_id.to_string();
            return failing(count, move || PipelineError::BodyNotFound { body: body.clone() });
        };

        let (body_inputs, body_outputs) = (body.input_types().len(), body.output_types().len());
        let (node_inputs, node_outputs) = (node.inputs().len(), count);
        if body_inputs != node_inputs || body_outputs != node_outputs {
            return failing(count, move || PipelineError::ArityMismatch {
                node: node_id,
                body_inputs,
                body_outputs,
                node_inputs,
                node_outputs,
            });
        }

        let inputs = node
            .inputs()
            .iter()
            .map(|input| self.merged_input(input, wired))
            .collect();
        let context = Rc::new(InvocationContext::new(node_id, node.title(), inputs));
        let body = Rc::new(body);

        (0..count)
            .map(|index| {
                let (body, context) = (Rc::clone(&body), Rc::clone(&context));
                LazySequence::defer(move || {
                    tracing::trace!(node = %node_id.short(), title = context.title(), output = index, "invoking body");
                    let mut produced = body.invoke(&context);
                    if index < produced.len() {
                        produced.swap_remove(index)
                    } else {
                        LazySequence::failed(move || PipelineError::OutputIndexOutOfRange { node: node_id, index })
                    }
                })
            })
            .collect()
    }

    /// Merged sequence for one input: every source, in connection order
    fn merged_input(&self, input: &PipelineInput, wired: &Wired) -> LazySequence<Value> {
        let sources: Vec<LazySequence<Value>> = self
            .connections_into(input.reference())
            .map(|connection| match wired.get(&connection.source) {
                Some(sequence) => sequence.clone(),
                None => {
                    let OutputRef { node, index } = connection.source;
                    LazySequence::failed(move || PipelineError::PortNotFound {
                        node,
                        direction: "output",
                        index,
                    })
                }
            })
            .collect();

        if sources.is_empty() {
            let (node, index, name) = (input.node(), input.index(), input.name().to_string());
            return LazySequence::failed(move || PipelineError::NotConnected {
                node,
                index,
                input: name.clone(),
            });
        }

        LazySequence::concat(sources)
    }
}

fn failing<F>(count: usize, error: F) -> Vec<LazySequence<Value>>
where
    F: Fn() -> PipelineError + 'static,
{
    vec![LazySequence::failed(error); count]
}
