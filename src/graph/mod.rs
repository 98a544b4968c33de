// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Dataflow graph topology
//!
//! Nodes with named, typed ports joined by directed connections, plus the
//! machinery around them: builders, change notifications, lazy
//! evaluation, export and validation.

mod compute;
mod connection;
mod events;
mod export;
mod ids;
mod node;
mod pipeline_graph;
mod port;
mod validation;

pub use connection::PipelineConnection;
pub use events::{ChangeSet, GraphEvent, ObserverId};
pub use export::GraphExporter;
pub use ids::{PipelineNodeId, PipelineNodeKind};
pub use node::{InputBuilder, NodeBuilder, OutputBuilder, PipelineNode};
pub use pipeline_graph::PipelineGraph;
pub use port::{Endpoint, InputRef, OutputRef, PipelineInput, PipelineOutput};
pub use validation::{GraphValidator, ValidationReport};
