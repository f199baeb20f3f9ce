use thiserror::Error;

use crate::graph::{NodeKey, NodeRole, OpId, ParameterId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("operation {0} is registered more than once")]
    DuplicateOperation(OpId),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[error("wire was used before its producer registered it")]
    UnregisteredWire,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("graph has no output node")]
    NoOutputNode,
    #[error("graph has {0} output nodes, expected exactly one")]
    MultipleOutputNodes(usize),
    #[error("wire references missing node {0:?}")]
    MissingNode(NodeKey),
    #[error("node {node:?} has no output socket {socket}")]
    NoSuchOutput { node: NodeKey, socket: usize },
    #[error("node {node:?} has no input socket {socket}")]
    NoSuchInput { node: NodeKey, socket: usize },
    #[error("input socket {socket} of node {node:?} has more than one wire")]
    InputAlreadyWired { node: NodeKey, socket: usize },
    #[error("node {node:?} declares {count} sockets, at most {max} are supported")]
    TooManySockets {
        node: NodeKey,
        count: usize,
        max: usize,
    },
    #[error("input socket {socket} of node {node:?} defaults to missing literal {literal}")]
    MissingLiteral {
        node: NodeKey,
        socket: usize,
        literal: usize,
    },
    #[error("node {node:?} reads undeclared parameter {parameter}")]
    UnknownParameter {
        node: NodeKey,
        parameter: ParameterId,
    },
    #[error("node {node:?} has operation {op} but role {role:?}")]
    RoleMismatch {
        node: NodeKey,
        op: OpId,
        role: NodeRole,
    },
    #[error("operation {op} of node {node:?} is not in the operation table")]
    UnknownOperation { node: NodeKey, op: OpId },
    #[error("cycle detected through nodes {0:?}")]
    CycleDetected(Vec<NodeKey>),
    #[error("output {socket} of node {node:?} was read before it was registered")]
    UnregisteredWire { node: NodeKey, socket: usize },
}

/// Broken invariants of a compiled graph. These indicate a compiler defect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("node {node} binds {slots} inputs but caches {cache}")]
    InputCacheMismatch {
        node: usize,
        slots: usize,
        cache: usize,
    },
    #[error("node {node} binds slot {slot} outside of {slot_count} slots")]
    SlotOutOfRange {
        node: usize,
        slot: usize,
        slot_count: usize,
    },
    #[error("parameter {parameter} owns slot {slot} outside of {slot_count} slots")]
    ParameterSlotOutOfRange {
        parameter: ParameterId,
        slot: usize,
        slot_count: usize,
    },
    #[error("node {node} dispatches to an operation outside the table")]
    OperationOutOfRange { node: usize },
    #[error("output node index {index} is outside of {len} nodes")]
    OutputOutOfRange { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("no parameter with id {0}")]
    UnknownParameter(ParameterId),
    #[error("no parameter named '{0}'")]
    UnknownParameterName(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid runtime config: {0}")]
    Parse(#[from] toml::de::Error),
}
