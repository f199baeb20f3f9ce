use indexmap::IndexMap;
use slotmap::SlotMap;

use super::types::{InputSocket, NodeKey, NodeRole, OpId, OutputSocket, ParameterId, Wire};
use crate::value::Value;

/// One authored node as handed over by the editor.
#[derive(Clone, Debug)]
pub struct NodeDescription {
    pub op: OpId,
    pub role: NodeRole,
    /// Values baked into the node at authoring time.
    pub literals: Vec<Value>,
    /// One entry per declared input: the literal that backs the input while it is unwired.
    pub inputs: Vec<Option<usize>>,
    /// Number of declared outputs.
    pub outputs: usize,
}

impl NodeDescription {
    pub fn new(op: OpId) -> Self {
        let role = if op == OpId::OUTPUT {
            NodeRole::Output
        } else {
            NodeRole::Operation
        };

        Self {
            op,
            role,
            literals: Vec::new(),
            inputs: Vec::new(),
            outputs: 0,
        }
    }

    /// The graph output sink with a single float input.
    pub fn output() -> Self {
        Self::new(OpId::OUTPUT).input(None)
    }

    /// A parameter read node for `parameter`.
    pub fn parameter(parameter: ParameterId) -> Self {
        Self {
            role: NodeRole::ParameterRead(parameter),
            ..Self::new(OpId::PARAMETER)
        }
        .input(None)
        .outputs(1)
    }

    pub fn literal(mut self, value: impl Into<Value>) -> Self {
        self.literals.push(value.into());
        self
    }

    pub fn with_literals(mut self, literals: Vec<Value>) -> Self {
        self.literals = literals;
        self
    }

    /// Declares an input backed by literal `default` while unwired.
    pub fn input(mut self, default: Option<usize>) -> Self {
        self.inputs.push(default);
        self
    }

    /// Declares an input together with a fresh literal holding its default.
    pub fn input_literal(mut self, default: impl Into<Value>) -> Self {
        let index = self.literals.len();
        self.literals.push(default.into());
        self.inputs.push(Some(index));
        self
    }

    pub fn outputs(mut self, count: usize) -> Self {
        self.outputs = count;
        self
    }

    /// Whether this node carries the reserved output triple.
    pub fn is_output(&self) -> bool {
        self.op == OpId::OUTPUT
    }
}

#[derive(Clone, Debug)]
pub struct ParameterDescription {
    pub name: String,
    pub value: Value,
}

/// The authored graph: nodes, wires and parameters.
///
/// This is the boundary type between the editor and the compiler. It performs no
/// validation on insertion; [`compile`](crate::graph::compile) checks structure.
#[derive(Clone, Debug, Default)]
pub struct GraphDescription {
    nodes: SlotMap<NodeKey, NodeDescription>,
    wires: Vec<Wire>,
    parameters: IndexMap<ParameterId, ParameterDescription>,
}

impl GraphDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: NodeDescription) -> NodeKey {
        self.nodes.insert(node)
    }

    pub fn node(&self, key: NodeKey) -> Option<&NodeDescription> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut NodeDescription> {
        self.nodes.get_mut(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &NodeDescription)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Removes a node along with every wire attached to it.
    pub fn remove_node(&mut self, key: NodeKey) -> bool {
        if self.nodes.remove(key).is_none() {
            return false;
        }
        self.wires
            .retain(|wire| wire.from.node != key && wire.to.node != key);
        true
    }

    pub fn connect(&mut self, from: OutputSocket, to: InputSocket) {
        self.wires.push(Wire { from, to });
    }

    pub fn disconnect(&mut self, from: OutputSocket, to: InputSocket) -> bool {
        let original_len = self.wires.len();
        self.wires.retain(|wire| !(wire.from == from && wire.to == to));
        self.wires.len() != original_len
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Adds a parameter under a freshly generated identity.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ParameterId {
        let id = ParameterId::new_v4();
        self.insert_parameter(id, name, value);
        id
    }

    /// Adds or replaces a parameter under an identity chosen by the editor.
    pub fn insert_parameter(
        &mut self,
        id: ParameterId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.parameters.insert(
            id,
            ParameterDescription {
                name: name.into(),
                value: value.into(),
            },
        );
    }

    pub fn remove_parameter(&mut self, id: ParameterId) -> bool {
        self.parameters.shift_remove(&id).is_some()
    }

    pub fn parameter(&self, id: ParameterId) -> Option<&ParameterDescription> {
        self.parameters.get(&id)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (ParameterId, &ParameterDescription)> {
        self.parameters.iter().map(|(id, param)| (*id, param))
    }
}
