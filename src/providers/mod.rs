// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Node-kind providers
//!
//! A provider turns a [`PipelineNodeKind`] tag into a configured node
//! builder: ports plus a bound body. The graph consults its provider only
//! from [`PipelineGraph::create_node_of_kind`].
//!
//! [`PipelineGraph::create_node_of_kind`]: crate::graph::PipelineGraph::create_node_of_kind

mod standard;

pub use standard::{KindInfo, StandardNodes};

use crate::graph::{NodeBuilder, PipelineNodeKind};

/// Source of node templates addressed by kind
pub trait NodeProvider {
    /// Whether `kind` is recognized
    fn can_create_node(&self, kind: &PipelineNodeKind) -> bool;

    /// Populate `builder` with the ports and body for `kind`
    ///
    /// Only called after `can_create_node` returned true for `kind`.
    fn create_node(&self, kind: &PipelineNodeKind, builder: &mut NodeBuilder);
}
