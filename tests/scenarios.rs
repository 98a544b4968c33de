// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! End-to-end graph scenarios against the public API

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pipeflow::body::argument;
use pipeflow::graph::{Endpoint, GraphEvent};
use pipeflow::{
    BodyProvider, BodyRegistry, DataType, InputRef, InvocationContext, LazySequence, OutputRef,
    PipelineBody, PipelineError, PipelineGraph, PipelineNodeId, Value,
};

struct Fixture {
    bodies: Rc<BodyRegistry>,
    graph: PipelineGraph,
}

impl Fixture {
    fn new() -> Self {
        let bodies = Rc::new(BodyRegistry::new());
        let graph = PipelineGraph::new(bodies.clone());
        Self { bodies, graph }
    }

    fn source(&mut self, value: i64) -> PipelineNodeId {
        let body = self.bodies.register(PipelineBody::source(vec![value]));
        self.graph.create_node(|b| {
            b.set_title(format!("source {}", value))
                .create_output("value", |o| {
                    o.produce::<i64>();
                })
                .set_body(body);
        })
    }

    fn unary(&mut self, title: &str, f: fn(i64) -> i64) -> PipelineNodeId {
        let body = self.bodies.register(PipelineBody::map1(f));
        self.graph.create_node(|b| {
            b.set_title(title)
                .create_input("x", |i| {
                    i.accept::<i64>();
                })
                .create_output("result", |o| {
                    o.produce::<i64>();
                })
                .set_body(body);
        })
    }

    fn values(&self, node: PipelineNodeId, index: usize) -> Vec<i64> {
        self.graph
            .compute_as::<i64>(OutputRef::new(node, index))
            .unwrap()
            .to_vec()
            .unwrap()
    }
}

#[test]
fn test_chain_of_unary_nodes() {
    let mut fx = Fixture::new();
    let five = fx.source(5);
    let mult = fx.unary("mult", |x| x * 2);
    let add = fx.unary("add", |x| x + 2);
    fx.graph.connect_nodes(five, mult).unwrap();
    fx.graph.connect_nodes(mult, add).unwrap();

    assert_eq!(fx.values(add, 0), vec![12]);
}

#[test]
fn test_multiple_sources_concatenate_in_connection_order() {
    let mut fx = Fixture::new();
    let five = fx.source(5);
    let seven = fx.source(7);
    let mult = fx.unary("mult", |x| x * 2);
    let add = fx.unary("add", |x| x + 2);
    fx.graph.connect_nodes(five, mult).unwrap();
    fx.graph.connect_nodes(seven, mult).unwrap();
    fx.graph.connect_nodes(mult, add).unwrap();

    assert_eq!(fx.values(add, 0), vec![12, 16]);
}

#[test]
fn test_cartesian_combination_of_inputs() {
    let mut fx = Fixture::new();
    let one = fx.source(1);
    let two = fx.source(2);
    let mult = fx.unary("mult", |x| x * 2);
    let div = fx.unary("div", |x| x / 2);
    fx.graph.connect_nodes(one, mult).unwrap();
    fx.graph.connect_nodes(two, div).unwrap();

    let body = fx.bodies.register(PipelineBody::map2(|a: i64, b: i64| a + b));
    let adder = fx.graph.create_node(|b| {
        b.set_title("adder")
            .create_input("v1", |_| {})
            .create_input("v2", |_| {})
            .create_output("sum", |_| {})
            .set_body(body);
    });

    fx.graph.connect(OutputRef::new(one, 0), InputRef::new(adder, 0)).unwrap();
    fx.graph.connect(OutputRef::new(mult, 0), InputRef::new(adder, 0)).unwrap();
    fx.graph.connect(OutputRef::new(two, 0), InputRef::new(adder, 1)).unwrap();
    fx.graph.connect(OutputRef::new(div, 0), InputRef::new(adder, 1)).unwrap();

    assert_eq!(fx.values(adder, 0), vec![3, 2, 4, 3]);
}

#[test]
fn test_node_with_two_outputs() {
    let mut fx = Fixture::new();
    let dividend = fx.source(5);
    let divisor = fx.source(2);

    let body = fx.bodies.register(PipelineBody::cartesian(
        vec![DataType::of::<i64>(), DataType::of::<i64>()],
        vec![DataType::of::<i64>(), DataType::of::<i64>()],
        |row| {
            let a = argument::<i64>(row, 0)?;
            let b = argument::<i64>(row, 1)?;
            Ok(vec![Value::new(a / b), Value::new(a % b)])
        },
    ));
    let divmod = fx.graph.create_node(|b| {
        b.create_input("dividend", |_| {})
            .create_input("divisor", |_| {})
            .create_output("division", |_| {})
            .create_output("remainder", |_| {})
            .set_body(body);
    });
    fx.graph.connect_nodes(dividend, divmod).unwrap();
    fx.graph.connect_nodes(divisor, divmod).unwrap();

    assert_eq!(fx.values(divmod, 0), vec![2]);
    assert_eq!(fx.values(divmod, 1), vec![1]);
}

#[test]
fn test_unused_input_is_never_evaluated() {
    let mut fx = Fixture::new();
    let five = fx.source(5);

    let invoked = Rc::new(Cell::new(false));
    let flag = Rc::clone(&invoked);
    let generator = fx.bodies.register(PipelineBody::generator(move || {
        flag.set(true);
        vec![1i64]
    }));
    let unused = fx.graph.create_node(|b| {
        b.create_output("value", |_| {}).set_body(generator);
    });

    let first_only = fx.bodies.register(PipelineBody::new(
        vec![DataType::of::<i64>(), DataType::of::<i64>()],
        vec![DataType::of::<i64>()],
        |ctx: &InvocationContext| vec![ctx.raw_input(0)],
    ));
    let reader = fx.graph.create_node(|b| {
        b.create_input("used", |_| {})
            .create_input("ignored", |_| {})
            .create_output("out", |_| {})
            .set_body(first_only);
    });
    fx.graph.connect_nodes(five, reader).unwrap();
    fx.graph.connect_nodes(unused, reader).unwrap();

    assert_eq!(fx.values(reader, 0), vec![5]);
    assert!(!invoked.get());
}

#[test]
fn test_unconnected_input_fails_on_enumeration() {
    let mut fx = Fixture::new();
    let mult = fx.unary("mult", |x| x * 2);
    let add = fx.unary("add", |x| x + 2);
    fx.graph.connect_nodes(mult, add).unwrap();

    let result = fx.graph.compute(OutputRef::new(add, 0));
    let sequence = result.unwrap();
    match sequence.to_vec() {
        Err(PipelineError::NotConnected { node, index, .. }) => {
            assert_eq!(node, mult);
            assert_eq!(index, 0);
        }
        other => panic!("expected NotConnected, got {:?}", other),
    }
}

#[test]
fn test_bodies_run_again_per_enumeration() {
    let mut fx = Fixture::new();
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let body = fx.bodies.register(PipelineBody::generator(move || {
        counter.set(counter.get() + 1);
        vec![1i64, 2, 3]
    }));
    let source = fx.graph.create_node(|b| {
        b.create_output("value", |_| {}).set_body(body);
    });

    let sequence = fx.graph.compute_as::<i64>(OutputRef::new(source, 0)).unwrap();
    assert_eq!(runs.get(), 0);
    assert_eq!(sequence.to_vec().unwrap(), vec![1, 2, 3]);
    assert_eq!(sequence.iter().take(1).count(), 1);
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_recorded_changes_cancel_out() {
    let mut fx = Fixture::new();
    let keep = fx.source(1);

    let changes = fx.graph.recording_changes(|graph| {
        let temp = graph.create_node(|b| {
            b.create_input("x", |_| {});
        });
        graph.connect_nodes(keep, temp).unwrap();
        graph.remove_node(temp);
    });

    assert!(changes.is_empty(), "{:?}", changes);
    assert_eq!(fx.graph.node_count(), 1);
}

#[test]
fn test_recorded_changes_report_net_effect() {
    let mut fx = Fixture::new();
    let old = fx.source(1);
    let mult = fx.unary("mult", |x| x * 2);
    let existing = fx.graph.connect_nodes(old, mult).unwrap();

    let mut created = None;
    let changes = fx.graph.recording_changes(|graph| {
        graph.remove_node(old);
        created = Some(graph.create_node(|b| {
            b.create_output("value", |_| {});
        }));
    });

    assert!(changes.nodes_removed.contains(&old));
    assert!(changes.connections_removed.contains(&existing));
    assert!(changes.nodes_created.contains(&created.unwrap()));
    assert!(changes.connections_created.is_empty());
}

#[test]
fn test_node_removal_notifies_before_connections() {
    let mut fx = Fixture::new();
    let five = fx.source(5);
    let mult = fx.unary("mult", |x| x * 2);
    let add = fx.unary("add", |x| x + 2);
    fx.graph.connect_nodes(five, mult).unwrap();
    fx.graph.connect_nodes(mult, add).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    fx.graph.subscribe(move |event| sink.borrow_mut().push(*event));

    assert!(fx.graph.remove_node(mult));

    let events = log.borrow();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], GraphEvent::NodeRemoving(mult));
    assert!(events[1..]
        .iter()
        .all(|e| matches!(e, GraphEvent::ConnectionRemoving(c) if c.involves_node(mult))));
    assert_eq!(fx.graph.connection_count(), 0);
}

#[test]
fn test_foreign_node_is_rejected() {
    let mut fx = Fixture::new();
    let mut other = Fixture::new();
    let local = fx.unary("local", |x| x);
    let foreign = other.source(1);

    let err = fx.graph.connect_nodes(foreign, local).unwrap_err();
    assert!(matches!(err, PipelineError::NodeNotInGraph { node } if node == foreign));
    assert!(err.is_argument_error());
    assert!(fx.graph.compute(OutputRef::new(foreign, 0)).is_err());
}

#[test]
fn test_reachability_through_chain() {
    let mut fx = Fixture::new();
    let five = fx.source(5);
    let mult = fx.unary("mult", |x| x * 2);
    let add = fx.unary("add", |x| x + 2);
    let lonely = fx.unary("lonely", |x| x);
    fx.graph.connect_nodes(five, mult).unwrap();
    fx.graph.connect_nodes(mult, add).unwrap();

    assert!(fx.graph.are_connected(five, add));
    assert!(fx.graph.are_connected(OutputRef::new(five, 0), InputRef::new(add, 0)));
    assert!(!fx.graph.are_directly_connected(five, add));
    assert!(fx.graph.are_directly_connected(Endpoint::Node(five), Endpoint::Node(mult)));
    assert!(!fx.graph.are_connected(add, five));
    assert!(!fx.graph.are_connected(five, lonely));
}

#[test]
fn test_merged_graph_evaluates_independently() {
    let mut fx = Fixture::new();
    let five = fx.source(5);
    let mult = fx.unary("mult", |x| x * 2);
    fx.graph.connect_nodes(five, mult).unwrap();

    let mut merged = PipelineGraph::new(fx.bodies.clone());
    let mapping = merged.add_from_graph(&fx.graph);
    assert_eq!(merged.node_count(), 2);
    assert_eq!(merged.connection_count(), 1);

    let copy = mapping[&mult];
    assert_ne!(copy, mult);
    let values = merged.compute_as::<i64>(OutputRef::new(copy, 0)).unwrap();
    assert_eq!(values.to_vec().unwrap(), vec![10]);
    assert_eq!(fx.graph.node_count(), 2);
}

#[test]
fn test_lazy_sequence_helpers() {
    let seq = LazySequence::from_values(vec![1i64, 2, 3]).map(|x| x * 10);
    assert_eq!(seq.to_vec().unwrap(), vec![10, 20, 30]);
    assert_eq!(seq.to_vec().unwrap(), vec![10, 20, 30]);
}
