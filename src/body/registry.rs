// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! In-memory body registry

use std::cell::RefCell;
use std::collections::HashMap;

use crate::body::{BodyProvider, PipelineBody, PipelineBodyId};

/// Standard [`BodyProvider`] keeping bodies in memory
///
/// Registration goes through `&self` so one registry can be shared (via
/// `Rc`) between a graph and the node providers that populate it.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    bodies: RefCell<HashMap<PipelineBodyId, PipelineBody>>,
}

impl BodyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body under a caller-chosen id
    ///
    /// Returns the body previously registered under that id, if any.
    pub fn register_with_id(&self, id: PipelineBodyId, body: PipelineBody) -> Option<PipelineBody> {
        tracing::debug!(body = %id, "registering body");
        self.bodies.borrow_mut().insert(id, body)
    }

    /// Whether a body is registered under `id`
    pub fn contains(&self, id: &PipelineBodyId) -> bool {
        self.bodies.borrow().contains_key(id)
    }

    /// Number of registered bodies
    pub fn len(&self) -> usize {
        self.bodies.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.borrow().is_empty()
    }
}

impl BodyProvider for BodyRegistry {
    fn register(&self, body: PipelineBody) -> PipelineBodyId {
        let id = PipelineBodyId::new();
        self.register_with_id(id.clone(), body);
        id
    }

    fn get_body(&self, id: &PipelineBodyId) -> Option<PipelineBody> {
        self.bodies.borrow().get(id).cloned()
    }
}
