// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Connection (edge) definitions for the graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::{InputRef, OutputRef, PipelineNodeId};

/// A directed edge from an output port to an input port
///
/// Two connections are equal when they join the same endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PipelineConnection {
    pub source: OutputRef,
    pub target: InputRef,
}

impl PipelineConnection {
    pub fn new(source: OutputRef, target: InputRef) -> Self {
        Self { source, target }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node: PipelineNodeId) -> bool {
        self.source.node == node || self.target.node == node
    }

    /// Same connection with both endpoints re-homed through `map`
    pub(crate) fn remapped<F>(&self, map: F) -> Option<Self>
    where
        F: Fn(PipelineNodeId) -> Option<PipelineNodeId>,
    {
        Some(Self {
            source: OutputRef::new(map(self.source.node)?, self.source.index),
            target: InputRef::new(map(self.target.node)?, self.target.index),
        })
    }
}

impl fmt::Display for PipelineConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
