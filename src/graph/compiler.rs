use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arrayvec::ArrayVec;
use log::{debug, warn};

use super::description::{GraphDescription, NodeDescription};
use super::slots::SlotAllocator;
use super::topology::{dependency_order, TopologyError};
use super::types::{
    InputSocket, NodeKey, NodeRole, OpId, OutputSocket, ParameterId, Slot, MAX_NODE_SOCKETS,
};
use crate::error::CompileError;
use crate::ops::OperationTable;
use crate::runtime::{CompileStats, CompiledGraph, CompiledNode, Parameter};
use crate::value::Value;

/// Compiles `graph` into a flat node list bound to a shared slot array.
///
/// Only nodes the output node depends on are kept. They are emitted in
/// dependency order, and every wire gets a slot that is reused once the wire's
/// last consumer has been bound.
pub fn compile(
    graph: &GraphDescription,
    table: Arc<OperationTable>,
) -> Result<CompiledGraph, CompileError> {
    let incoming = check_structure(graph)?;
    let output = find_output(graph)?;

    let order = dependency_order(output, |key: &NodeKey| {
        let inputs = graph.node(*key).map_or(0, |node| node.inputs.len());
        (0..inputs)
            .filter_map(|index| incoming.get(&key.input(index)).map(|from| from.node))
            .collect()
    })
    .map_err(|err| match err {
        TopologyError::CycleDetected { path } => CompileError::CycleDetected(path),
    })?;

    let live: HashSet<NodeKey> = order.iter().copied().collect();
    let mut consumers: HashMap<OutputSocket, usize> = HashMap::new();
    for (to, from) in &incoming {
        if live.contains(&to.node) {
            *consumers.entry(*from).or_default() += 1;
        }
    }

    let mut slots = SlotAllocator::new();

    let mut parameter_slots: HashMap<ParameterId, Slot> = HashMap::new();
    let mut parameters = Vec::new();
    for (id, param) in graph.parameters() {
        let slot = slots.register_parameter_slot();
        parameter_slots.insert(id, slot);
        parameters.push(Parameter {
            id,
            name: param.name.clone(),
            value: param.value.clone(),
            slot,
        });
    }

    let mut nodes = Vec::with_capacity(order.len());
    let mut read_parameters = HashSet::new();
    for &key in &order {
        let Some(node) = graph.node(key) else {
            return Err(CompileError::MissingNode(key));
        };

        let op_index = table.resolve(node.op).ok_or(CompileError::UnknownOperation {
            node: key,
            op: node.op,
        })?;

        let mut input_slots = ArrayVec::new();
        let mut input_cache = ArrayVec::new();
        for (index, default) in node.inputs.iter().enumerate() {
            let slot = match (incoming.get(&key.input(index)), node.role) {
                (Some(from), _) => Some(slots.use_input(from).map_err(|_| {
                    CompileError::UnregisteredWire {
                        node: from.node,
                        socket: from.index,
                    }
                })?),
                (None, NodeRole::ParameterRead(id)) if index == 0 => {
                    read_parameters.insert(id);
                    parameter_slots.get(&id).copied()
                }
                (None, _) => None,
            };

            input_slots.push(slot);
            input_cache.push(
                default
                    .and_then(|literal| node.literals.get(literal))
                    .cloned()
                    .unwrap_or(Value::Empty),
            );
        }

        let output_slots = (0..node.outputs)
            .map(|index| {
                let wire = key.output(index);
                let readers = consumers.get(&wire).copied().unwrap_or(0);
                slots.register_output(wire, readers)
            })
            .collect();

        nodes.push(CompiledNode {
            op: node.op,
            op_index,
            role: node.role,
            source: key,
            literals: node.literals.clone(),
            input_slots,
            output_slots,
            input_cache,
        });
    }

    let output_index = nodes.len().checked_sub(1);
    if let Some(sink) = output_index.and_then(|index| nodes.get(index)) {
        if sink.input_slots.iter().all(Option::is_none) {
            warn!("Output node has no wired inputs; the graph publishes its defaults only");
        }
    }
    for param in &parameters {
        if !read_parameters.contains(&param.id) {
            warn!("Parameter '{}' is not read by any live node", param.name);
        }
    }

    let stats = CompileStats {
        live_nodes: nodes.len(),
        eliminated_nodes: graph.node_count() - nodes.len(),
        slot_count: slots.slot_count(),
        peak_live_slots: slots.peak_live_slots(),
    };
    debug!(
        "Compiled {} nodes ({} unreachable) into {} slots, {} parameters",
        stats.live_nodes,
        stats.eliminated_nodes,
        stats.slot_count,
        parameters.len()
    );

    Ok(CompiledGraph {
        nodes,
        parameters,
        output: output_index,
        slot_count: slots.slot_count(),
        table,
        stats,
    })
}

fn find_output(graph: &GraphDescription) -> Result<NodeKey, CompileError> {
    let outputs: Vec<NodeKey> = graph
        .nodes()
        .filter(|(_, node)| node.op == OpId::OUTPUT)
        .map(|(key, _)| key)
        .collect();

    match outputs.as_slice() {
        [] => Err(CompileError::NoOutputNode),
        [output] => Ok(*output),
        many => Err(CompileError::MultipleOutputNodes(many.len())),
    }
}

/// Validates nodes and wires, returning the wire feeding each connected input.
fn check_structure(
    graph: &GraphDescription,
) -> Result<HashMap<InputSocket, OutputSocket>, CompileError> {
    for (key, node) in graph.nodes() {
        check_node(graph, key, node)?;
    }

    let mut incoming = HashMap::new();
    for wire in graph.wires() {
        let producer = graph
            .node(wire.from.node)
            .ok_or(CompileError::MissingNode(wire.from.node))?;
        if wire.from.index >= producer.outputs {
            return Err(CompileError::NoSuchOutput {
                node: wire.from.node,
                socket: wire.from.index,
            });
        }

        let consumer = graph
            .node(wire.to.node)
            .ok_or(CompileError::MissingNode(wire.to.node))?;
        if wire.to.index >= consumer.inputs.len() {
            return Err(CompileError::NoSuchInput {
                node: wire.to.node,
                socket: wire.to.index,
            });
        }

        let bound_to_parameter =
            matches!(consumer.role, NodeRole::ParameterRead(_)) && wire.to.index == 0;
        if bound_to_parameter || incoming.insert(wire.to, wire.from).is_some() {
            return Err(CompileError::InputAlreadyWired {
                node: wire.to.node,
                socket: wire.to.index,
            });
        }
    }

    Ok(incoming)
}

fn check_node(
    graph: &GraphDescription,
    key: NodeKey,
    node: &NodeDescription,
) -> Result<(), CompileError> {
    let count = node.inputs.len().max(node.outputs);
    if count > MAX_NODE_SOCKETS {
        return Err(CompileError::TooManySockets {
            node: key,
            count,
            max: MAX_NODE_SOCKETS,
        });
    }

    for (socket, default) in node.inputs.iter().enumerate() {
        if let Some(literal) = *default {
            if literal >= node.literals.len() {
                return Err(CompileError::MissingLiteral {
                    node: key,
                    socket,
                    literal,
                });
            }
        }
    }

    // The output triple and the output role always travel together.
    if (node.op == OpId::OUTPUT) != (node.role == NodeRole::Output) {
        return Err(CompileError::RoleMismatch {
            node: key,
            op: node.op,
            role: node.role,
        });
    }

    if let NodeRole::ParameterRead(parameter) = node.role {
        if graph.parameter(parameter).is_none() {
            return Err(CompileError::UnknownParameter {
                node: key,
                parameter,
            });
        }
    }

    Ok(())
}
