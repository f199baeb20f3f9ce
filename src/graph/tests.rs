use super::*;
use crate::error::CompileError;
use crate::ops::catalog::{self, math_node, random_node};
use crate::ops::OperationTable;
use crate::runtime::CompiledGraph;
use crate::value::Value;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn table() -> Arc<OperationTable> {
    Arc::new(OperationTable::standard().unwrap())
}

fn position(compiled: &CompiledGraph, key: NodeKey) -> Option<usize> {
    compiled.nodes().iter().position(|node| node.source() == key)
}

#[test]
fn test_chain_reuses_one_slot() {
    let mut graph = GraphDescription::new();
    let out = graph.add_node(NodeDescription::output());
    let cos = graph.add_node(math_node(catalog::COSINE, &[0.0]));
    let sin = graph.add_node(math_node(catalog::SINE, &[0.0]));
    let rand = graph.add_node(random_node());

    graph.connect(rand.output(0), sin.input(0));
    graph.connect(sin.output(0), cos.input(0));
    graph.connect(cos.output(0), out.input(0));

    let compiled = compile(&graph, table()).unwrap();
    let order: Vec<NodeKey> = compiled.nodes().iter().map(|node| node.source()).collect();
    assert_eq!(order, vec![rand, sin, cos, out]);
    assert_eq!(compiled.output_index(), Some(3));
    assert_eq!(compiled.slot_count(), 1);

    for node in compiled.nodes() {
        assert!(node.input_slots().iter().all(|slot| *slot == Some(Slot::new(0))));
        assert!(node.output_slots().iter().all(|slot| *slot == Some(Slot::new(0))));
    }
    assert!(compiled.validate().is_ok());
}

#[test]
fn test_fan_out_keeps_slot_until_last_consumer() {
    // rand feeds both sin and cos, which are summed
    let mut graph = GraphDescription::new();
    let rand = graph.add_node(random_node());
    let sin = graph.add_node(math_node(catalog::SINE, &[0.0]));
    let cos = graph.add_node(math_node(catalog::COSINE, &[0.0]));
    let add = graph.add_node(math_node(catalog::ADD, &[0.0, 0.0]));
    let out = graph.add_node(NodeDescription::output());

    graph.connect(rand.output(0), sin.input(0));
    graph.connect(rand.output(0), cos.input(0));
    graph.connect(sin.output(0), add.input(0));
    graph.connect(cos.output(0), add.input(1));
    graph.connect(add.output(0), out.input(0));

    let compiled = compile(&graph, table()).unwrap();
    let node = |key| &compiled.nodes()[position(&compiled, key).unwrap()];

    assert_eq!(node(rand).output_slots(), &[Some(Slot::new(0))]);
    assert_eq!(node(sin).output_slots(), &[Some(Slot::new(1))]);
    // rand's slot is free again once cos has bound it
    assert_eq!(node(cos).output_slots(), &[Some(Slot::new(0))]);
    assert_eq!(
        node(add).input_slots(),
        &[Some(Slot::new(1)), Some(Slot::new(0))]
    );
    assert_eq!(compiled.slot_count(), 2);
    assert_eq!(compiled.stats().peak_live_slots, 2);
}

#[test]
fn test_unreachable_nodes_are_eliminated() {
    let mut graph = GraphDescription::new();
    let rand = graph.add_node(random_node());
    let out = graph.add_node(NodeDescription::output());
    let dangling = graph.add_node(math_node(catalog::SINE, &[0.0]));
    let orphan = graph.add_node(math_node(catalog::COSINE, &[0.0]));

    graph.connect(rand.output(0), out.input(0));
    // dangling reads rand but nothing reads dangling
    graph.connect(rand.output(0), dangling.input(0));

    let compiled = compile(&graph, table()).unwrap();
    assert_eq!(compiled.nodes().len(), 2);
    assert!(position(&compiled, dangling).is_none());
    assert!(position(&compiled, orphan).is_none());

    let stats = compiled.stats();
    assert_eq!(stats.live_nodes, 2);
    assert_eq!(stats.eliminated_nodes, 2);
    // only the live consumer counts, so the slot is released after the output binds it
    assert_eq!(compiled.slot_count(), 1);
}

#[test]
fn test_unread_output_gets_no_slot() {
    let mut graph = GraphDescription::new();
    let split = graph.add_node(NodeDescription::new(catalog::ADD).outputs(3));
    let out = graph.add_node(NodeDescription::output());
    graph.connect(split.output(1), out.input(0));

    let compiled = compile(&graph, table()).unwrap();
    let node = &compiled.nodes()[0];
    assert_eq!(node.output_slots(), &[None, Some(Slot::new(0)), None]);
    assert_eq!(compiled.slot_count(), 1);
}

#[test]
fn test_unwired_inputs_keep_literal_defaults() {
    let mut graph = GraphDescription::new();
    let add = graph.add_node(math_node(catalog::ADD, &[2.0, 4.0]));
    let out = graph.add_node(NodeDescription::output());
    graph.connect(add.output(0), out.input(0));

    let compiled = compile(&graph, table()).unwrap();
    let node = &compiled.nodes()[0];
    assert_eq!(node.input_slots(), &[None, None]);
    assert_eq!(node.input_cache(), &[Value::Float(2.0), Value::Float(4.0)]);
    // the output input has no default literal
    assert_eq!(compiled.nodes()[1].input_cache(), &[Value::Empty]);
}

#[test]
fn test_parameter_slots_are_reserved_first() {
    let mut graph = GraphDescription::new();
    let speed = graph.add_parameter("speed", 4.0_f32);
    let unused = graph.add_parameter("unused", 1.0_f32);
    let read = graph.add_node(NodeDescription::parameter(speed));
    let add = graph.add_node(math_node(catalog::ADD, &[0.0, 1.5]));
    let out = graph.add_node(NodeDescription::output());

    graph.connect(read.output(0), add.input(0));
    graph.connect(add.output(0), out.input(0));

    let compiled = compile(&graph, table()).unwrap();
    let params = compiled.parameters();
    assert_eq!(params.len(), 2);
    assert_eq!((params[0].id(), params[0].slot()), (speed, Slot::new(0)));
    assert_eq!((params[1].id(), params[1].slot()), (unused, Slot::new(1)));
    assert_eq!(params[0].name(), "speed");

    let read = &compiled.nodes()[position(&compiled, read).unwrap()];
    assert_eq!(read.role(), NodeRole::ParameterRead(speed));
    assert_eq!(read.input_slots(), &[Some(Slot::new(0))]);
    assert_eq!(read.output_slots(), &[Some(Slot::new(2))]);
    assert_eq!(compiled.slot_count(), 3);
}

#[test]
fn test_output_without_inputs_compiles() {
    let mut graph = GraphDescription::new();
    let out = graph.add_node(NodeDescription::output());

    let compiled = compile(&graph, table()).unwrap();
    assert_eq!(compiled.nodes().len(), 1);
    assert_eq!(compiled.output_node().map(|node| node.source()), Some(out));
    assert_eq!(compiled.slot_count(), 0);
}

#[test]
fn test_missing_output_node() {
    let mut graph = GraphDescription::new();
    graph.add_node(random_node());

    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::NoOutputNode
    );
}

#[test]
fn test_multiple_output_nodes() {
    let mut graph = GraphDescription::new();
    graph.add_node(NodeDescription::output());
    graph.add_node(NodeDescription::output());

    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::MultipleOutputNodes(2)
    );
}

#[test]
fn test_cycle_is_rejected() {
    let mut graph = GraphDescription::new();
    let a = graph.add_node(math_node(catalog::ADD, &[0.0, 0.0]));
    let b = graph.add_node(math_node(catalog::ADD, &[0.0, 0.0]));
    let out = graph.add_node(NodeDescription::output());

    graph.connect(a.output(0), b.input(0));
    graph.connect(b.output(0), a.input(0));
    graph.connect(a.output(0), out.input(0));

    match compile(&graph, table()) {
        Err(CompileError::CycleDetected(path)) => {
            assert_eq!(path.len(), 2);
            assert!(path.contains(&a) && path.contains(&b));
        }
        other => panic!("Expected cycle error, got {:?}", other),
    }
}

#[test]
fn test_unknown_operation_on_live_node() {
    let unknown = OpId::new(3, 6, 0);
    let mut graph = GraphDescription::new();
    let node = graph.add_node(NodeDescription::new(unknown).outputs(1));
    let out = graph.add_node(NodeDescription::output());
    graph.connect(node.output(0), out.input(0));

    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::UnknownOperation { node, op: unknown }
    );
}

#[test]
fn test_unknown_operation_on_dead_node_is_ignored() {
    let mut graph = GraphDescription::new();
    graph.add_node(NodeDescription::new(OpId::new(40, 1, 0)).outputs(1));
    graph.add_node(NodeDescription::output());

    assert!(compile(&graph, table()).is_ok());
}

#[test]
fn test_socket_range_errors() {
    let mut graph = GraphDescription::new();
    let rand = graph.add_node(random_node());
    let out = graph.add_node(NodeDescription::output());
    graph.connect(rand.output(1), out.input(0));
    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::NoSuchOutput {
            node: rand,
            socket: 1
        }
    );

    let mut graph = GraphDescription::new();
    let rand = graph.add_node(random_node());
    let out = graph.add_node(NodeDescription::output());
    graph.connect(rand.output(0), out.input(3));
    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::NoSuchInput {
            node: out,
            socket: 3
        }
    );
}

#[test]
fn test_second_wire_into_input_is_rejected() {
    let mut graph = GraphDescription::new();
    let a = graph.add_node(random_node());
    let b = graph.add_node(random_node());
    let out = graph.add_node(NodeDescription::output());
    graph.connect(a.output(0), out.input(0));
    graph.connect(b.output(0), out.input(0));

    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::InputAlreadyWired {
            node: out,
            socket: 0
        }
    );
}

#[test]
fn test_wire_into_parameter_input_is_rejected() {
    let mut graph = GraphDescription::new();
    let id = graph.add_parameter("p", 1.0_f32);
    let rand = graph.add_node(random_node());
    let read = graph.add_node(NodeDescription::parameter(id));
    let out = graph.add_node(NodeDescription::output());
    graph.connect(rand.output(0), read.input(0));
    graph.connect(read.output(0), out.input(0));

    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::InputAlreadyWired {
            node: read,
            socket: 0
        }
    );
}

#[test]
fn test_wire_from_missing_node() {
    let mut other = GraphDescription::new();
    other.add_node(random_node());
    let foreign = other.add_node(random_node());

    let mut graph = GraphDescription::new();
    let out = graph.add_node(NodeDescription::output());
    graph.connect(foreign.output(0), out.input(0));

    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::MissingNode(foreign)
    );
}

#[test]
fn test_removed_node_takes_its_wires() {
    let mut graph = GraphDescription::new();
    let rand = graph.add_node(random_node());
    let out = graph.add_node(NodeDescription::output());
    graph.connect(rand.output(0), out.input(0));

    assert!(graph.remove_node(rand));
    assert!(graph.wires().is_empty());
    assert!(!graph.remove_node(rand));

    let compiled = compile(&graph, table()).unwrap();
    assert_eq!(compiled.nodes().len(), 1);
}

#[test]
fn test_disconnect() {
    let mut graph = GraphDescription::new();
    let rand = graph.add_node(random_node());
    let out = graph.add_node(NodeDescription::output());
    graph.connect(rand.output(0), out.input(0));

    assert!(graph.disconnect(rand.output(0), out.input(0)));
    assert!(!graph.disconnect(rand.output(0), out.input(0)));

    let compiled = compile(&graph, table()).unwrap();
    assert_eq!(compiled.stats().eliminated_nodes, 1);
}

#[test]
fn test_node_validation_errors() {
    let mut graph = GraphDescription::new();
    graph.add_node(NodeDescription::output());
    let wide = graph.add_node(NodeDescription::new(catalog::ADD).outputs(MAX_NODE_SOCKETS + 1));
    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::TooManySockets {
            node: wide,
            count: MAX_NODE_SOCKETS + 1,
            max: MAX_NODE_SOCKETS
        }
    );

    let mut graph = GraphDescription::new();
    graph.add_node(NodeDescription::output());
    let bad = graph.add_node(NodeDescription::new(catalog::ADD).literal(1.0_f32).input(Some(1)));
    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::MissingLiteral {
            node: bad,
            socket: 0,
            literal: 1
        }
    );

    let mut graph = GraphDescription::new();
    graph.add_node(NodeDescription::output());
    let missing = ParameterId::new_v4();
    let read = graph.add_node(NodeDescription::parameter(missing));
    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::UnknownParameter {
            node: read,
            parameter: missing
        }
    );
}

#[test]
fn test_listing_names_each_node() {
    let mut graph = GraphDescription::new();
    let id = graph.add_parameter("gain", 2.0_f32);
    let read = graph.add_node(NodeDescription::parameter(id));
    let out = graph.add_node(NodeDescription::output());
    graph.connect(read.output(0), out.input(0));

    let listing = compile(&graph, table()).unwrap().to_string();
    assert!(listing.contains("param \"gain\" -> $0"));
    assert!(listing.contains("(6, 1, 0) Get Parameter"));
    assert!(listing.contains("(1, 1, 0) Graph Output"));
    assert!(listing.contains("; output"));
}

#[test]
fn test_deep_chain_compiles() {
    let depth = 100_000;
    let mut graph = GraphDescription::new();
    let mut head = graph.add_node(random_node()).output(0);
    for _ in 0..depth {
        let node = graph.add_node(math_node(catalog::ABSOLUTE, &[0.0]));
        graph.connect(head, node.input(0));
        head = node.output(0);
    }
    let out = graph.add_node(NodeDescription::output());
    graph.connect(head, out.input(0));

    let compiled = compile(&graph, table()).unwrap();
    assert_eq!(compiled.nodes().len(), depth + 2);
    assert_eq!(compiled.output_node().map(|node| node.source()), Some(out));
    assert_eq!(compiled.slot_count(), 1);
}

#[test]
fn test_output_role_must_match_output_op() {
    let mut graph = GraphDescription::new();
    graph.add_node(NodeDescription::output());
    let disguised = graph.add_node(NodeDescription {
        role: NodeRole::Operation,
        ..NodeDescription::output()
    });
    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::RoleMismatch {
            node: disguised,
            op: OpId::OUTPUT,
            role: NodeRole::Operation
        }
    );

    let mut graph = GraphDescription::new();
    graph.add_node(NodeDescription::output());
    let impostor = graph.add_node(NodeDescription {
        role: NodeRole::Output,
        ..math_node(catalog::ADD, &[0.0, 0.0])
    });
    assert_eq!(
        compile(&graph, table()).unwrap_err(),
        CompileError::RoleMismatch {
            node: impostor,
            op: catalog::ADD,
            role: NodeRole::Output
        }
    );
}

/// For node `i`, the producers wired into its inputs. All producers come earlier.
fn random_dag() -> impl Strategy<Value = (Vec<Vec<usize>>, usize)> {
    (
        prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..4), 1..40),
        any::<prop::sample::Index>(),
    )
        .prop_map(|(nodes, root)| {
            let n = nodes.len();
            let inputs: Vec<Vec<usize>> = nodes
                .into_iter()
                .enumerate()
                .map(|(i, inputs)| {
                    if i == 0 {
                        Vec::new()
                    } else {
                        inputs.into_iter().map(|ix| ix.index(i)).collect()
                    }
                })
                .collect();
            (inputs, root.index(n))
        })
}

proptest! {
    #[test]
    fn test_compiled_order_and_liveness((dag, root) in random_dag()) {
        let mut graph = GraphDescription::new();
        let keys: Vec<NodeKey> = dag
            .iter()
            .map(|_| {
                graph.add_node(
                    NodeDescription::new(catalog::ADD)
                        .with_literals(vec![Value::Float(0.0)])
                        .outputs(1),
                )
            })
            .collect();
        for (consumer, inputs) in dag.iter().enumerate() {
            for (socket, &producer) in inputs.iter().enumerate() {
                if let Some(node) = graph.node_mut(keys[consumer]) {
                    node.inputs.push(Some(0));
                }
                graph.connect(keys[producer].output(0), keys[consumer].input(socket));
            }
        }
        let out = graph.add_node(NodeDescription::output());
        graph.connect(keys[root].output(0), out.input(0));

        let compiled = compile(&graph, table()).unwrap();
        prop_assert!(compiled.validate().is_ok());

        let mut reachable = HashSet::from([root]);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for &producer in &dag[node] {
                if reachable.insert(producer) {
                    stack.push(producer);
                }
            }
        }

        let positions: HashMap<NodeKey, usize> = compiled
            .nodes()
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.source(), pos))
            .collect();
        prop_assert_eq!(positions.len(), reachable.len() + 1);
        prop_assert_eq!(compiled.output_index(), Some(reachable.len()));
        prop_assert_eq!(compiled.stats().eliminated_nodes, dag.len() - reachable.len());

        let mut wires: Vec<(usize, usize, usize)> = graph
            .wires()
            .iter()
            .filter_map(|wire| {
                let to = *positions.get(&wire.to.node)?;
                Some((positions[&wire.from.node], to, wire.to.index))
            })
            .collect();
        wires.sort_unstable();

        for &(from, to, socket) in &wires {
            // producers run before their consumers
            prop_assert!(from < to);

            let slot = compiled.nodes()[from].output_slots()[0];
            prop_assert!(slot.is_some());
            prop_assert_eq!(compiled.nodes()[to].input_slots()[socket], slot);

            // nothing in between overwrites the wire's slot
            for between in &compiled.nodes()[from + 1..to] {
                prop_assert!(!between.output_slots().contains(&slot));
            }
        }
    }
}
