use std::fmt;

use slotmap::new_key_type;
use uuid::Uuid;

/// Upper bound on declared inputs or outputs of a single node.
pub const MAX_NODE_SOCKETS: usize = 32;

new_key_type! { pub struct NodeKey; }

impl NodeKey {
    pub fn input(self, index: usize) -> InputSocket {
        InputSocket { node: self, index }
    }

    pub fn output(self, index: usize) -> OutputSocket {
        OutputSocket { node: self, index }
    }
}

/// Operation identifier: `(group, kind, method)`.
///
/// `group` and `kind` classify the authored node; `method` selects an overload and is
/// always 0 in the bundled catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId {
    pub group: u16,
    pub kind: u16,
    pub method: u16,
}

impl OpId {
    /// The graph output sink. Exactly one node per graph carries it.
    pub const OUTPUT: OpId = OpId::new(1, 1, 0);
    /// Parameter read: passes the parameter's slot through to its output.
    pub const PARAMETER: OpId = OpId::new(6, 1, 0);

    pub const fn new(group: u16, kind: u16, method: u16) -> Self {
        Self {
            group,
            kind,
            method,
        }
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.group, self.kind, self.method)
    }
}

/// Stable identity of a graph parameter, owned by the authoring side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(Uuid);

impl ParameterId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputSocket {
    pub node: NodeKey,
    pub index: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputSocket {
    pub node: NodeKey,
    pub index: usize,
}

/// A directed connection from a producer's output socket to a consumer's input socket.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Wire {
    pub from: OutputSocket,
    pub to: InputSocket,
}

/// Index into the shared variable array of a compiled graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u32);

impl Slot {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// How a node takes part in evaluation. Execution mechanics are identical for all roles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Operation,
    /// Reads a parameter: input 0 is bound to the parameter's reserved slot.
    ParameterRead(ParameterId),
    /// The designated sink whose inputs are published after every evaluation.
    Output,
}
