// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Textual renderings of a graph
//!
//! Mermaid and DOT diagrams plus a plain evaluation-order listing, for
//! inspecting a graph from a terminal.

use petgraph::algo::toposort;

use crate::errors::{PipelineError, PipelineResult};
use crate::graph::{PipelineConnection, PipelineGraph, PipelineNodeId};

/// Renders a graph as text
pub struct GraphExporter<'a> {
    graph: &'a PipelineGraph,
}

impl<'a> GraphExporter<'a> {
    pub fn new(graph: &'a PipelineGraph) -> Self {
        Self { graph }
    }

    /// Node ids in dependency order (sources first)
    pub fn topological_order(&self) -> PipelineResult<Vec<PipelineNodeId>> {
        toposort(self.graph.topology(), None).map_err(|cycle| PipelineError::CycleDetected {
            node: cycle.node_id(),
        })
    }

    /// Generate Mermaid diagram of the graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");

        for node in self.graph.nodes() {
            out.push_str(&format!(
                "    {}[\"{}\"]\n",
                mermaid_id(node.id()),
                escape(node.title())
            ));
        }

        for connection in self.graph.connections() {
            let (from, to) = self.port_names(connection);
            out.push_str(&format!(
                "    {} -->|{} → {}| {}\n",
                mermaid_id(connection.source.node),
                escape(&from),
                escape(&to),
                mermaid_id(connection.target.node)
            ));
        }

        out
    }

    /// Generate DOT diagram of the graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for node in self.graph.nodes() {
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\"];\n",
                node.id().short(),
                escape(node.title())
            ));
        }

        if !self.graph.connections().is_empty() {
            out.push('\n');
        }
        for connection in self.graph.connections() {
            let (from, to) = self.port_names(connection);
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [taillabel=\"{}\", headlabel=\"{}\"];\n",
                connection.source.node.short(),
                connection.target.node.short(),
                escape(&from),
                escape(&to)
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of evaluation order
    pub fn to_text(&self) -> PipelineResult<String> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, id) in order.iter().enumerate() {
            let Some(node) = self.graph.node(*id) else {
                continue;
            };

            out.push_str(&format!("{}. {} ({})", i + 1, node.title(), id.short()));

            let mut feeds: Vec<String> = Vec::new();
            for input in node.inputs() {
                for connection in self.graph.connections_into(input.reference()) {
                    let source = self
                        .graph
                        .title_for_node(connection.source.node)
                        .unwrap_or("?");
                    feeds.push(format!("{} <- {}", input.name(), source));
                }
            }
            if !feeds.is_empty() {
                out.push_str(&format!(" [{}]", feeds.join(", ")));
            }

            out.push('\n');
        }

        Ok(out)
    }

    fn port_names(&self, connection: &PipelineConnection) -> (String, String) {
        let from = self
            .graph
            .node(connection.source.node)
            .and_then(|n| n.output(connection.source.index))
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| connection.source.index.to_string());
        let to = self
            .graph
            .node(connection.target.node)
            .and_then(|n| n.input(connection.target.index))
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| connection.target.index.to_string());
        (from, to)
    }
}

fn mermaid_id(id: PipelineNodeId) -> String {
    format!("n{}", id.short())
}

fn escape(text: &str) -> String {
    text.replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyRegistry;
    use std::rc::Rc;

    fn chain() -> (PipelineGraph, Vec<PipelineNodeId>) {
        let mut graph = PipelineGraph::new(Rc::new(BodyRegistry::new()));
        let ids: Vec<_> = ["source", "double", "sink"]
            .iter()
            .map(|title| {
                graph.create_node(|b| {
                    b.set_title(*title)
                        .create_input("in", |_| {})
                        .create_output("out", |_| {});
                })
            })
            .collect();
        graph.connect_nodes(ids[1], ids[2]).unwrap();
        graph.connect_nodes(ids[0], ids[1]).unwrap();
        (graph, ids)
    }

    #[test]
    fn test_topological_order() {
        let (graph, ids) = chain();
        let order = GraphExporter::new(&graph).topological_order().unwrap();
        assert_eq!(order, ids);
    }

    #[test]
    fn test_mermaid_output() {
        let (graph, ids) = chain();
        let mermaid = GraphExporter::new(&graph).to_mermaid();

        assert!(mermaid.starts_with("graph LR"));
        assert!(mermaid.contains("[\"double\"]"));
        assert!(mermaid.contains(&format!(
            "n{} -->|out → in| n{}",
            ids[0].short(),
            ids[1].short()
        )));
    }

    #[test]
    fn test_dot_output() {
        let (graph, ids) = chain();
        let dot = GraphExporter::new(&graph).to_dot();
        assert!(dot.starts_with("digraph pipeline {"));
        assert!(dot.contains(&format!("\"{}\" -> \"{}\"", ids[1].short(), ids[2].short())));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_text_output() {
        let (graph, _) = chain();
        let text = GraphExporter::new(&graph).to_text().unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1. source"));
        assert!(lines[2].contains("in <- double"));
    }

    #[test]
    fn test_text_reports_cycle() {
        let (mut graph, ids) = chain();
        graph.connect_nodes(ids[2], ids[0]).unwrap();
        let result = GraphExporter::new(&graph).to_text();
        assert!(matches!(result, Err(PipelineError::CycleDetected { .. })));
    }
}
