// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Node bodies and their evaluation plumbing
//!
//! A body is the computation bound to a node. Nodes never hold a body
//! directly; they hold a [`PipelineBodyId`] that is resolved through a
//! [`BodyProvider`] when an output is computed.

mod context;
mod registry;
mod sequence;
mod value;

pub use context::InvocationContext;
pub use registry::BodyRegistry;
pub use sequence::{LazySequence, SequenceIter};
pub use value::{DataType, Value};

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::errors::{PipelineError, PipelineResult};

/// Opaque reference to a registered body
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineBodyId(String);

impl PipelineBodyId {
    /// Mint a fresh, unique body id
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Body id with a caller-chosen name
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PipelineBodyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PipelineBodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signature of a body's compute function
///
/// Returns one lazy sequence per declared output. It must not fail
/// synchronously: failures belong inside the returned sequences.
pub type ComputeFn = dyn Fn(&InvocationContext) -> Vec<LazySequence<Value>>;

/// A computation unit bound to nodes by id
#[derive(Clone)]
pub struct PipelineBody {
    inputs: Vec<DataType>,
    outputs: Vec<DataType>,
    compute: Rc<ComputeFn>,
}

impl fmt::Debug for PipelineBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBody")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl PipelineBody {
    /// Create a body from declared types and a raw compute function
    pub fn new<F>(inputs: Vec<DataType>, outputs: Vec<DataType>, compute: F) -> Self
    where
        F: Fn(&InvocationContext) -> Vec<LazySequence<Value>> + 'static,
    {
        Self::from_parts(inputs, outputs, Rc::new(compute))
    }

    /// Create a body around an already shared compute function
    pub fn from_parts(inputs: Vec<DataType>, outputs: Vec<DataType>, compute: Rc<ComputeFn>) -> Self {
        Self {
            inputs,
            outputs,
            compute,
        }
    }

    /// Declared input types, in port order
    pub fn input_types(&self) -> &[DataType] {
        &self.inputs
    }

    /// Declared output types, in port order
    pub fn output_types(&self) -> &[DataType] {
        &self.outputs
    }

    /// Run the compute function, producing one sequence per output
    pub fn invoke(&self, context: &InvocationContext) -> Vec<LazySequence<Value>> {
        (self.compute)(context)
    }

    /// Body with no inputs emitting a fixed list of values
    pub fn source<T>(values: Vec<T>) -> Self
    where
        T: Any + Clone + fmt::Debug,
    {
        let values: Vec<Value> = values.into_iter().map(Value::new).collect();
        Self::new(vec![], vec![DataType::of::<T>()], move |_| {
            vec![LazySequence::from_values(values.clone())]
        })
    }

    /// Body with no inputs emitting whatever `generator` yields
    ///
    /// The generator runs once per enumeration of the output and never
    /// when nothing pulls from it.
    pub fn generator<T, F, I>(generator: F) -> Self
    where
        T: Any + fmt::Debug,
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let generator = Rc::new(generator);
        Self::new(vec![], vec![DataType::of::<T>()], move |_| {
            let generator = Rc::clone(&generator);
            vec![LazySequence::generate(move || generator().into_iter().map(Value::new))]
        })
    }

    /// Single-input, single-output body applying `f` to every value
    pub fn map1<A, R, F>(f: F) -> Self
    where
        A: Any + Clone,
        R: Any + fmt::Debug,
        F: Fn(A) -> R + 'static,
    {
        Self::try_map1(move |a: A| Ok(f(a)))
    }

    /// Like [`PipelineBody::map1`] with a fallible function
    pub fn try_map1<A, R, F>(f: F) -> Self
    where
        A: Any + Clone,
        R: Any + fmt::Debug,
        F: Fn(A) -> PipelineResult<R> + 'static,
    {
        Self::cartesian(
            vec![DataType::of::<A>()],
            vec![DataType::of::<R>()],
            move |row| Ok(vec![Value::new(f(argument::<A>(row, 0)?)?)]),
        )
    }

    /// Two-input, single-output body over every combination of inputs
    pub fn map2<A, B, R, F>(f: F) -> Self
    where
        A: Any + Clone,
        B: Any + Clone,
        R: Any + fmt::Debug,
        F: Fn(A, B) -> R + 'static,
    {
        Self::try_map2(move |a: A, b: B| Ok(f(a, b)))
    }

    /// Like [`PipelineBody::map2`] with a fallible function
    pub fn try_map2<A, B, R, F>(f: F) -> Self
    where
        A: Any + Clone,
        B: Any + Clone,
        R: Any + fmt::Debug,
        F: Fn(A, B) -> PipelineResult<R> + 'static,
    {
        Self::cartesian(
            vec![DataType::of::<A>(), DataType::of::<B>()],
            vec![DataType::of::<R>()],
            move |row| {
                let a = argument::<A>(row, 0)?;
                let b = argument::<B>(row, 1)?;
                Ok(vec![Value::new(f(a, b)?)])
            },
        )
    }

    /// Body evaluating `f` over the cartesian product of its inputs
    ///
    /// `f` receives one value per input and returns one value per output.
    /// Input 0 is the outermost loop; the last input varies fastest. Each
    /// output is its own lazy chain, so `f` runs once per combination for
    /// every output that gets enumerated.
    pub fn cartesian<F>(inputs: Vec<DataType>, outputs: Vec<DataType>, f: F) -> Self
    where
        F: Fn(&[Value]) -> PipelineResult<Vec<Value>> + 'static,
    {
        let output_count = outputs.len();
        let f = Rc::new(f);
        Self::new(inputs, outputs, move |context| {
            let rows = LazySequence::combinations(
                (0..context.input_count())
                    .map(|index| context.raw_input(index))
                    .collect(),
            );
            (0..output_count)
                .map(|slot| {
                    let f = Rc::clone(&f);
                    rows.try_map(move |row| {
                        let mut produced = f(row.as_slice())?;
                        if slot < produced.len() {
                            Ok(produced.swap_remove(slot))
                        } else {
                            Err(PipelineError::body_failed(format!(
                                "expected {} output values, got {}",
                                slot + 1,
                                produced.len()
                            )))
                        }
                    })
                })
                .collect()
        })
    }
}

/// Downcast the value at `index` of a cartesian row
///
/// A row shorter than `index` reports `InputIndexOutOfRange`, which is what
/// a body sees when its node has fewer inputs than it reads.
pub fn argument<T: Any + Clone>(row: &[Value], index: usize) -> PipelineResult<T> {
    row.get(index)
        .ok_or(PipelineError::InputIndexOutOfRange {
            index,
            count: row.len(),
        })?
        .downcast::<T>()
}

/// Registry of bodies addressable by id
pub trait BodyProvider {
    /// Store a body and return the id it can be resolved by
    fn register(&self, body: PipelineBody) -> PipelineBodyId;

    /// Resolve a body id
    fn get_body(&self, id: &PipelineBodyId) -> Option<PipelineBody>;

    /// Register a body from its declared types and compute function
    fn register_fn(
        &self,
        inputs: Vec<DataType>,
        outputs: Vec<DataType>,
        compute: Rc<ComputeFn>,
    ) -> PipelineBodyId {
        self.register(PipelineBody::from_parts(inputs, outputs, compute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PipelineNodeId;

    fn context(inputs: Vec<Vec<i64>>) -> InvocationContext {
        InvocationContext::new(
            PipelineNodeId::new(),
            "test",
            inputs
                .into_iter()
                .map(|values| LazySequence::from_values(values.into_iter().map(Value::new).collect()))
                .collect(),
        )
    }

    fn drain(seq: &LazySequence<Value>) -> Vec<i64> {
        seq.iter().map(|v| v.unwrap().downcast::<i64>().unwrap()).collect()
    }

    #[test]
    fn test_source_body() {
        let body = PipelineBody::source(vec![5i64, 7]);
        assert!(body.input_types().is_empty());
        assert_eq!(body.output_types(), &[DataType::of::<i64>()]);

        let outputs = body.invoke(&context(vec![]));
        assert_eq!(outputs.len(), 1);
        assert_eq!(drain(&outputs[0]), vec![5, 7]);
    }

    #[test]
    fn test_map1_body() {
        let body = PipelineBody::map1(|x: i64| x * 2);
        let outputs = body.invoke(&context(vec![vec![1, 2, 3]]));
        assert_eq!(drain(&outputs[0]), vec![2, 4, 6]);
    }

    #[test]
    fn test_try_map1_failure_is_deferred() {
        let body = PipelineBody::try_map1(|x: i64| {
            x.checked_neg().ok_or_else(|| PipelineError::body_failed("overflow"))
        });
        let outputs = body.invoke(&context(vec![vec![3, i64::MIN]]));
        let items: Vec<_> = outputs[0].iter().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().downcast::<i64>().unwrap(), -3);
        assert!(matches!(items[1], Err(PipelineError::BodyFailed { .. })));
    }

    #[test]
    fn test_missing_inputs_fail_without_panicking() {
        let body = PipelineBody::map1(|x: i64| x + 1);
        let outputs = body.invoke(&context(vec![]));
        assert!(matches!(
            outputs[0].to_vec(),
            Err(PipelineError::InputIndexOutOfRange { index: 0, count: 0 })
        ));

        let body = PipelineBody::map2(|a: i64, b: i64| a + b);
        let outputs = body.invoke(&context(vec![vec![1]]));
        assert!(matches!(
            outputs[0].to_vec(),
            Err(PipelineError::InputIndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_map2_is_cartesian() {
        let body = PipelineBody::map2(|a: i64, b: i64| a * 10 + b);
        let outputs = body.invoke(&context(vec![vec![1, 2], vec![3, 4, 5]]));
        assert_eq!(drain(&outputs[0]), vec![13, 14, 15, 23, 24, 25]);
    }

    #[test]
    fn test_try_map2_failure_is_deferred() {
        let body = PipelineBody::try_map2(|a: i64, b: i64| {
            if b == 0 {
                Err(PipelineError::body_failed("division by zero"))
            } else {
                Ok(a / b)
            }
        });
        let outputs = body.invoke(&context(vec![vec![4], vec![2, 0]]));
        let items: Vec<_> = outputs[0].iter().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(PipelineError::BodyFailed { .. })));
    }

    #[test]
    fn test_cartesian_multiple_outputs() {
        let body = PipelineBody::cartesian(
            vec![DataType::of::<i64>(), DataType::of::<i64>()],
            vec![DataType::of::<i64>(), DataType::of::<i64>()],
            |row| {
                let a = row[0].downcast::<i64>()?;
                let b = row[1].downcast::<i64>()?;
                Ok(vec![Value::new(a / b), Value::new(a % b)])
            },
        );
        let outputs = body.invoke(&context(vec![vec![5], vec![2]]));
        assert_eq!(drain(&outputs[0]), vec![2]);
        assert_eq!(drain(&outputs[1]), vec![1]);
    }

    #[test]
    fn test_generator_runs_only_when_pulled() {
        use std::cell::Cell;

        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let body = PipelineBody::generator(move || {
            counter.set(counter.get() + 1);
            vec![1i64, 2]
        });

        let outputs = body.invoke(&context(vec![]));
        assert_eq!(runs.get(), 0);
        assert_eq!(drain(&outputs[0]), vec![1, 2]);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_body_id_uniqueness() {
        assert_ne!(PipelineBodyId::new(), PipelineBodyId::new());
        assert_eq!(PipelineBodyId::named("math.add").as_str(), "math.add");
    }
}
