// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Graph validation
//!
//! Reports problems that would only surface while enumerating a computed
//! output, so they can be caught before evaluation. Never mutates the graph.

use crate::errors::PipelineError;
use crate::graph::{GraphExporter, PipelineGraph};

/// Graph validator
pub struct GraphValidator;

impl GraphValidator {
    /// Validate the wiring and body bindings of a graph
    pub fn validate(graph: &PipelineGraph) -> ValidationReport {
        let mut report = ValidationReport::new();

        if let Err(PipelineError::CycleDetected { node }) = GraphExporter::new(graph).topological_order() {
            let title = graph.title_for_node(node).unwrap_or("?");
            report.add_error(&format!("Cycle detected through node '{}' ({})", title, node.short()));
        }

        for node in graph.nodes() {
            let label = format!("'{}' ({})", node.title(), node.id().short());

            match node.body() {
                None => report.add_error(&format!("Node {}: no body bound", label)),
                Some(body_id) => match graph.body_provider().get_body(body_id) {
                    None => report.add_error(&format!("Node {}: body '{}' is not registered", label, body_id)),
                    Some(body) => {
                        if body.input_types().len() != node.inputs().len()
                            || body.output_types().len() != node.outputs().len()
                        {
                            report.add_error(&format!(
                                "Node {}: body declares {} inputs/{} outputs, node has {}/{}",
                                label,
                                body.input_types().len(),
                                body.output_types().len(),
                                node.inputs().len(),
                                node.outputs().len()
                            ));
                        }
                    }
                },
            }

            for input in node.inputs() {
                let mut sources = graph.connections_into(input.reference()).peekable();
                if sources.peek().is_none() {
                    report.add_warning(&format!("Node {}: input '{}' is not connected", label, input.name()));
                }

                for connection in sources {
                    let produced = graph
                        .node(connection.source.node)
                        .and_then(|n| n.output(connection.source.index))
                        .and_then(|o| o.produced_type());
                    if let Some(produced) = produced {
                        if !input.accepts(&produced) {
                            report.add_warning(&format!(
                                "Node {}: input '{}' does not accept {} from {}",
                                label,
                                input.name(),
                                produced,
                                connection.source
                            ));
                        }
                    }
                }
            }

            let isolated = !graph.connections().iter().any(|c| c.involves_node(node.id()));
            if isolated && graph.node_count() > 1 {
                report.add_warning(&format!("Node {}: not connected to anything", label));
            }
        }

        report
    }
}

/// Result of graph validation
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyProvider, BodyRegistry, PipelineBody, PipelineBodyId};
    use crate::graph::PipelineNodeId;
    use std::rc::Rc;

    fn setup() -> (Rc<BodyRegistry>, PipelineGraph) {
        let bodies = Rc::new(BodyRegistry::new());
        let graph = PipelineGraph::new(bodies.clone());
        (bodies, graph)
    }

    fn source(bodies: &BodyRegistry, graph: &mut PipelineGraph, value: i64) -> PipelineNodeId {
        let body = bodies.register(PipelineBody::source(vec![value]));
        graph.create_node(|b| {
            b.create_output("value", |o| {
                o.produce::<i64>();
            })
            .set_body(body);
        })
    }

    fn double(bodies: &BodyRegistry, graph: &mut PipelineGraph) -> PipelineNodeId {
        let body = bodies.register(PipelineBody::map1(|x: i64| x * 2));
        graph.create_node(|b| {
            b.create_input("x", |i| {
                i.accept::<i64>();
            })
            .create_output("y", |o| {
                o.produce::<i64>();
            })
            .set_body(body);
        })
    }

    #[test]
    fn test_valid_graph() {
        let (bodies, mut graph) = setup();
        let five = source(&bodies, &mut graph, 5);
        let twice = double(&bodies, &mut graph);
        graph.connect_nodes(five, twice).unwrap();

        let report = GraphValidator::validate(&graph);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(!report.has_warnings(), "{:?}", report.warnings);
    }

    #[test]
    fn test_unconnected_input_warns() {
        let (bodies, mut graph) = setup();
        double(&bodies, &mut graph);

        let report = GraphValidator::validate(&graph);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("not connected")));
    }

    #[test]
    fn test_body_problems_are_errors() {
        let (_bodies, mut graph) = setup();
        graph.create_node(|b| {
            b.set_title("unbound").create_output("out", |_| {});
        });
        graph.create_node(|b| {
            b.set_title("dangling")
                .create_output("out", |_| {})
                .set_body(PipelineBodyId::named("missing"));
        });

        let report = GraphValidator::validate(&graph);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors.iter().any(|e| e.contains("no body bound")));
        assert!(report.errors.iter().any(|e| e.contains("not registered")));
    }

    #[test]
    fn test_arity_mismatch_is_error() {
        let (bodies, mut graph) = setup();
        let body = bodies.register(PipelineBody::map1(|x: i64| x));
        graph.create_node(|b| {
            b.create_output("out", |_| {}).set_body(body);
        });

        let report = GraphValidator::validate(&graph);
        assert!(report.errors.iter().any(|e| e.contains("body declares 1 inputs")));
    }

    #[test]
    fn test_type_mismatch_warns() {
        let (bodies, mut graph) = setup();
        let body = bodies.register(PipelineBody::source(vec!["x".to_string()]));
        let text = graph.create_node(|b| {
            b.create_output("text", |o| {
                o.produce::<String>();
            })
            .set_body(body);
        });
        let twice = double(&bodies, &mut graph);
        graph.connect_nodes(text, twice).unwrap();

        let report = GraphValidator::validate(&graph);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("does not accept String")));
    }

    #[test]
    fn test_cycle_is_error() {
        let (bodies, mut graph) = setup();
        let a = double(&bodies, &mut graph);
        let b = double(&bodies, &mut graph);
        graph.connect_nodes(a, b).unwrap();
        graph.connect_nodes(b, a).unwrap();

        let report = GraphValidator::validate(&graph);
        assert!(report.errors.iter().any(|e| e.contains("Cycle")));
    }
}
