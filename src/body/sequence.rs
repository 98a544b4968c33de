// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Lazy pull sequences
//!
//! A [`LazySequence`] is a recipe for producing values, not the values
//! themselves. Every call to [`LazySequence::iter`] starts a fresh
//! enumeration; nothing runs before that. Failures are items of the
//! sequence, so an error only surfaces once a consumer pulls that far.

use std::fmt;
use std::rc::Rc;

use crate::errors::{PipelineError, PipelineResult};

/// Iterator handed out by [`LazySequence::iter`]
pub type SequenceIter<T> = Box<dyn Iterator<Item = PipelineResult<T>>>;

type Factory<T> = dyn Fn() -> SequenceIter<T>;

/// A restartable, lazily evaluated sequence of fallible values
pub struct LazySequence<T> {
    factory: Rc<Factory<T>>,
}

impl<T> Clone for LazySequence<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for LazySequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazySequence { .. }")
    }
}

impl<T: 'static> LazySequence<T> {
    /// Build a sequence from an iterator factory
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn() -> SequenceIter<T> + 'static,
    {
        Self {
            factory: Rc::new(factory),
        }
    }

    /// Sequence with no values
    pub fn empty() -> Self {
        Self::from_fn(|| Box::new(std::iter::empty()))
    }

    /// Sequence that fails on first pull
    ///
    /// The error is created anew on every enumeration.
    pub fn failed<F>(error: F) -> Self
    where
        F: Fn() -> PipelineError + 'static,
    {
        Self::from_fn(move || Box::new(std::iter::once(Err(error()))))
    }

    /// Sequence built on demand from a generator closure
    ///
    /// `generator` runs each time the sequence is enumerated, never before.
    pub fn generate<F, I>(generator: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::from_fn(move || Box::new(generator().into_iter().map(Ok)))
    }

    /// Sequence whose construction is postponed until enumeration
    pub fn defer<F>(make: F) -> Self
    where
        F: Fn() -> LazySequence<T> + 'static,
    {
        Self::from_fn(move || make().iter())
    }

    /// Concatenate sequences, preserving order
    pub fn concat(parts: Vec<LazySequence<T>>) -> Self {
        match parts.len() {
            0 => Self::empty(),
            1 => parts.into_iter().next().unwrap_or_else(Self::empty),
            _ => {
                let parts = Rc::new(parts);
                Self::from_fn(move || {
                    let parts = Rc::clone(&parts);
                    let count = parts.len();
                    Box::new((0..count).flat_map(move |i| parts[i].iter()))
                })
            }
        }
    }

    /// Start a new enumeration
    pub fn iter(&self) -> SequenceIter<T> {
        (self.factory)()
    }

    /// Enumerate into a vector, stopping at the first failure
    pub fn to_vec(&self) -> PipelineResult<Vec<T>> {
        self.iter().collect()
    }

    /// Transform every value
    pub fn map<U, F>(&self, f: F) -> LazySequence<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        LazySequence::from_fn(move || {
            let f = Rc::clone(&f);
            Box::new(source.iter().map(move |item| item.map(|v| f(v))))
        })
    }

    /// Transform every value with a fallible function
    pub fn try_map<U, F>(&self, f: F) -> LazySequence<U>
    where
        U: 'static,
        F: Fn(T) -> PipelineResult<U> + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        LazySequence::from_fn(move || {
            let f = Rc::clone(&f);
            Box::new(source.iter().map(move |item| item.and_then(|v| f(v))))
        })
    }

    /// Replace every value with a sequence and flatten, in order
    ///
    /// A failed outer item is forwarded as-is and the enumeration moves on.
    pub fn flat_map<U, F>(&self, f: F) -> LazySequence<U>
    where
        U: 'static,
        F: Fn(T) -> LazySequence<U> + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        LazySequence::from_fn(move || {
            let f = Rc::clone(&f);
            Box::new(source.iter().flat_map(move |item| -> SequenceIter<U> {
                match item {
                    Ok(v) => f(v).iter(),
                    Err(e) => Box::new(std::iter::once(Err(e))),
                }
            }))
        })
    }
}

impl<T: Clone + 'static> LazySequence<T> {
    /// Sequence with a single value
    pub fn once(value: T) -> Self {
        Self::from_fn(move || Box::new(std::iter::once(Ok(value.clone()))))
    }

    /// Sequence over a fixed list of values
    pub fn from_values(values: Vec<T>) -> Self {
        let values = Rc::new(values);
        Self::from_fn(move || {
            let values = Rc::clone(&values);
            let count = values.len();
            Box::new((0..count).map(move |i| Ok(values[i].clone())))
        })
    }

    /// Cartesian combination of several sequences
    ///
    /// Yields one row per combination. The first sequence is the outermost
    /// loop and the last one varies fastest. With no sequences the result
    /// is a single empty row.
    pub fn combinations(inputs: Vec<LazySequence<T>>) -> LazySequence<Vec<T>> {
        inputs
            .into_iter()
            .fold(LazySequence::once(Vec::new()), |rows, input| {
                rows.flat_map(move |prefix: Vec<T>| {
                    input.map(move |value| {
                        let mut row = prefix.clone();
                        row.push(value);
                        row
                    })
                })
            })
    }
}

impl<'a, T: 'static> IntoIterator for &'a LazySequence<T> {
    type Item = PipelineResult<T>;
    type IntoIter = SequenceIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
