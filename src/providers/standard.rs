// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Built-in integer node kinds

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::body::{argument, BodyProvider, DataType, PipelineBody, PipelineBodyId, Value};
use crate::errors::PipelineError;
use crate::graph::{NodeBuilder, PipelineNodeKind};
use crate::providers::NodeProvider;

/// Description of a node kind, for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    pub kind: &'static str,
    pub inputs: &'static [&'static str],
    pub outputs: &'static [&'static str],
    pub summary: &'static str,
}

const CATALOG: &[KindInfo] = &[
    KindInfo {
        kind: "const:<n>",
        inputs: &[],
        outputs: &["value"],
        summary: "Emits the integer n",
    },
    KindInfo {
        kind: "range:<start>..<end>",
        inputs: &[],
        outputs: &["value"],
        summary: "Emits start, start+1, ... up to end (exclusive)",
    },
    KindInfo {
        kind: "math.add",
        inputs: &["lhs", "rhs"],
        outputs: &["result"],
        summary: "lhs + rhs for every combination of inputs",
    },
    KindInfo {
        kind: "math.subtract",
        inputs: &["lhs", "rhs"],
        outputs: &["result"],
        summary: "lhs - rhs for every combination of inputs",
    },
    KindInfo {
        kind: "math.multiply",
        inputs: &["lhs", "rhs"],
        outputs: &["result"],
        summary: "lhs * rhs for every combination of inputs",
    },
    KindInfo {
        kind: "math.divide",
        inputs: &["lhs", "rhs"],
        outputs: &["result"],
        summary: "lhs / rhs, truncating; fails on division by zero",
    },
    KindInfo {
        kind: "math.divmod",
        inputs: &["dividend", "divisor"],
        outputs: &["quotient", "remainder"],
        summary: "Quotient and remainder of an integer division",
    },
    KindInfo {
        kind: "math.negate",
        inputs: &["value"],
        outputs: &["result"],
        summary: "-value",
    },
    KindInfo {
        kind: "math.double",
        inputs: &["value"],
        outputs: &["result"],
        summary: "value * 2",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StandardKind {
    Constant(i64),
    Range(i64, i64),
    Add,
    Subtract,
    Multiply,
    Divide,
    DivMod,
    Negate,
    Double,
}

impl StandardKind {
    fn parse(kind: &str) -> Option<Self> {
        if let Some(value) = kind.strip_prefix("const:") {
            return value.trim().parse().ok().map(Self::Constant);
        }
        if let Some(bounds) = kind.strip_prefix("range:") {
            let (start, end) = bounds.split_once("..")?;
            return Some(Self::Range(start.trim().parse().ok()?, end.trim().parse().ok()?));
        }
        match kind {
            "math.add" => Some(Self::Add),
            "math.subtract" => Some(Self::Subtract),
            "math.multiply" => Some(Self::Multiply),
            "math.divide" => Some(Self::Divide),
            "math.divmod" => Some(Self::DivMod),
            "math.negate" => Some(Self::Negate),
            "math.double" => Some(Self::Double),
            _ => None,
        }
    }

    fn info(&self) -> &'static KindInfo {
        let index = match self {
            Self::Constant(_) => 0,
            Self::Range(..) => 1,
            Self::Add => 2,
            Self::Subtract => 3,
            Self::Multiply => 4,
            Self::Divide => 5,
            Self::DivMod => 6,
            Self::Negate => 7,
            Self::Double => 8,
        };
        &CATALOG[index]
    }
}

/// Node provider for the built-in `i64` arithmetic kinds
///
/// Fixed kinds share one body each, registered up front. Parameterized
/// kinds (`const:`, `range:`) register a body the first time a given
/// parameter is seen and reuse it for every later node with that parameter.
pub struct StandardNodes {
    bodies: Rc<dyn BodyProvider>,
    fixed: HashMap<&'static str, PipelineBodyId>,
    parameterized: RefCell<HashMap<StandardKind, PipelineBodyId>>,
}

impl StandardNodes {
    /// Register the fixed-kind bodies with `bodies`
    pub fn new(bodies: Rc<dyn BodyProvider>) -> Self {
        let mut fixed = HashMap::new();
        fixed.insert("math.add", bodies.register(checked_binary(i64::checked_add, "overflow")));
        fixed.insert(
            "math.subtract",
            bodies.register(checked_binary(i64::checked_sub, "overflow")),
        );
        fixed.insert(
            "math.multiply",
            bodies.register(checked_binary(i64::checked_mul, "overflow")),
        );
        fixed.insert(
            "math.divide",
            bodies.register(checked_binary(i64::checked_div, "division by zero")),
        );
        fixed.insert("math.divmod", bodies.register(divmod_body()));
        fixed.insert("math.negate", bodies.register(checked_unary(i64::checked_neg, "overflow")));
        fixed.insert(
            "math.double",
            bodies.register(checked_unary(|x| x.checked_mul(2), "overflow")),
        );

        tracing::debug!(kinds = fixed.len(), "registered standard node bodies");
        Self {
            bodies,
            fixed,
            parameterized: RefCell::new(HashMap::new()),
        }
    }

    /// Every kind this provider understands
    pub fn catalog() -> &'static [KindInfo] {
        CATALOG
    }

    fn body_for(&self, kind: StandardKind, name: &str) -> PipelineBodyId {
        match kind {
            StandardKind::Constant(value) => {
                self.parameterized_body(kind, || PipelineBody::source(vec![value]))
            }
            StandardKind::Range(start, end) => {
                self.parameterized_body(kind, || PipelineBody::generator(move || start..end))
            }
            _ => match self.fixed.get(name) {
                Some(id) => id.clone(),
                None => PipelineBodyId::named(name),
            },
        }
    }

    fn parameterized_body(&self, kind: StandardKind, body: impl FnOnce() -> PipelineBody) -> PipelineBodyId {
        self.parameterized
            .borrow_mut()
            .entry(kind)
            .or_insert_with(|| {
                tracing::debug!(?kind, "registering parameterized body");
                self.bodies.register(body())
            })
            .clone()
    }
}

impl NodeProvider for StandardNodes {
    fn can_create_node(&self, kind: &PipelineNodeKind) -> bool {
        StandardKind::parse(kind.as_str()).is_some()
    }

    fn create_node(&self, kind: &PipelineNodeKind, builder: &mut NodeBuilder) {
        let Some(parsed) = StandardKind::parse(kind.as_str()) else {
            return;
        };
        let info = parsed.info();

        for input in info.inputs {
            builder.create_input(*input, |i| {
                i.accept::<i64>();
            });
        }
        for output in info.outputs {
            builder.create_output(*output, |o| {
                o.produce::<i64>();
            });
        }
        builder.set_body(self.body_for(parsed, kind.as_str()));
    }
}

fn checked_binary(op: fn(i64, i64) -> Option<i64>, failure: &'static str) -> PipelineBody {
    PipelineBody::try_map2(move |a: i64, b: i64| {
        op(a, b).ok_or_else(|| PipelineError::body_failed(format!("{} ({}, {})", failure, a, b)))
    })
}

fn checked_unary(op: fn(i64) -> Option<i64>, failure: &'static str) -> PipelineBody {
    PipelineBody::try_map1(move |x: i64| {
        op(x).ok_or_else(|| PipelineError::body_failed(format!("{} ({})", failure, x)))
    })
}

fn divmod_body() -> PipelineBody {
    PipelineBody::cartesian(
        vec![DataType::of::<i64>(), DataType::of::<i64>()],
        vec![DataType::of::<i64>(), DataType::of::<i64>()],
        |row| {
            let dividend = argument::<i64>(row, 0)?;
            let divisor = argument::<i64>(row, 1)?;
            match (dividend.checked_div(divisor), dividend.checked_rem(divisor)) {
                (Some(quotient), Some(remainder)) => Ok(vec![Value::new(quotient), Value::new(remainder)]),
                _ => Err(PipelineError::body_failed(format!(
                    "division by zero ({}, {})",
                    dividend, divisor
                ))),
            }
        },
    )
}
