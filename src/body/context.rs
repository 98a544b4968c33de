// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Invocation context handed to node bodies

use std::any::Any;

use crate::body::{LazySequence, Value};
use crate::errors::PipelineError;
use crate::graph::PipelineNodeId;

/// What a body sees when it is invoked
///
/// Each declared input is exposed as one merged lazy sequence: the
/// concatenation of every connected upstream output, in connection order.
/// Reading an input never evaluates anything until the returned sequence
/// is enumerated.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    node: PipelineNodeId,
    title: String,
    inputs: Vec<LazySequence<Value>>,
}

impl InvocationContext {
    /// Create a context for `node` with one sequence per declared input
    pub fn new(node: PipelineNodeId, title: impl Into<String>, inputs: Vec<LazySequence<Value>>) -> Self {
        Self {
            node,
            title: title.into(),
            inputs,
        }
    }

    /// Node being evaluated
    pub fn node(&self) -> PipelineNodeId {
        self.node
    }

    /// Title of the node being evaluated
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of declared inputs
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Untyped merged sequence for an input
    pub fn raw_input(&self, index: usize) -> LazySequence<Value> {
        match self.inputs.get(index) {
            Some(seq) => seq.clone(),
            None => {
                let count = self.inputs.len();
                LazySequence::failed(move || PipelineError::InputIndexOutOfRange { index, count })
            }
        }
    }

    /// Merged sequence for an input, downcast to `T`
    ///
    /// A value of the wrong type surfaces as `TypeMismatch` when pulled.
    pub fn get_indexed_input<T: Any + Clone>(&self, index: usize) -> LazySequence<T> {
        self.raw_input(index).try_map(|value| value.downcast::<T>())
    }

    /// The only input of a single-input body
    ///
    /// Returns `None` unless exactly one input is declared.
    pub fn try_get_indexed_inputs<T: Any + Clone>(&self) -> Option<LazySequence<T>> {
        (self.inputs.len() == 1).then(|| self.get_indexed_input::<T>(0))
    }

    /// Inputs 0 and 1 of a two-input body
    pub fn get_indexed_inputs2<A, B>(&self) -> (LazySequence<A>, LazySequence<B>)
    where
        A: Any + Clone,
        B: Any + Clone,
    {
        (self.get_indexed_input(0), self.get_indexed_input(1))
    }

    /// Inputs 0, 1 and 2 of a three-input body
    pub fn get_indexed_inputs3<A, B, C>(&self) -> (LazySequence<A>, LazySequence<B>, LazySequence<C>)
    where
        A: Any + Clone,
        B: Any + Clone,
        C: Any + Clone,
    {
        (
            self.get_indexed_input(0),
            self.get_indexed_input(1),
            self.get_indexed_input(2),
        )
    }
}
