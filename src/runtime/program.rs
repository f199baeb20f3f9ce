use std::fmt;
use std::sync::Arc;

use super::node::CompiledNode;
use crate::error::ProgramError;
use crate::graph::{ParameterId, Slot};
use crate::ops::OperationTable;
use crate::value::Value;

/// A named external value written into its reserved slot before every evaluation.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub(crate) id: ParameterId,
    pub(crate) name: String,
    pub(crate) value: Value,
    pub(crate) slot: Slot,
}

impl Parameter {
    pub fn id(&self) -> ParameterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub live_nodes: usize,
    pub eliminated_nodes: usize,
    pub slot_count: usize,
    pub peak_live_slots: usize,
}

/// Output of [`compile`](crate::graph::compile): nodes in dependency order plus the
/// slot layout they were bound against.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    pub(crate) nodes: Vec<CompiledNode>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) output: Option<usize>,
    pub(crate) slot_count: usize,
    pub(crate) table: Arc<OperationTable>,
    pub(crate) stats: CompileStats,
}

impl CompiledGraph {
    /// A graph with no nodes. Ticking it never evaluates anything.
    pub fn empty(table: Arc<OperationTable>) -> Self {
        Self {
            nodes: Vec::new(),
            parameters: Vec::new(),
            output: None,
            slot_count: 0,
            table,
            stats: CompileStats::default(),
        }
    }

    pub fn nodes(&self) -> &[CompiledNode] {
        &self.nodes
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Position of the output node in [`nodes`](Self::nodes).
    pub fn output_index(&self) -> Option<usize> {
        self.output
    }

    pub fn output_node(&self) -> Option<&CompiledNode> {
        self.output.and_then(|index| self.nodes.get(index))
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn table(&self) -> &Arc<OperationTable> {
        &self.table
    }

    pub fn stats(&self) -> CompileStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks the binding invariants every runtime relies on.
    pub fn validate(&self) -> Result<(), ProgramError> {
        let slot_count = self.slot_count;
        let in_range = |slot: Option<Slot>| slot.map_or(true, |s| s.index() < slot_count);

        for (index, node) in self.nodes.iter().enumerate() {
            if node.input_slots.len() != node.input_cache.len() {
                return Err(ProgramError::InputCacheMismatch {
                    node: index,
                    slots: node.input_slots.len(),
                    cache: node.input_cache.len(),
                });
            }

            let bad_slot = node
                .input_slots
                .iter()
                .chain(node.output_slots.iter())
                .find(|slot| !in_range(**slot));
            if let Some(Some(slot)) = bad_slot {
                return Err(ProgramError::SlotOutOfRange {
                    node: index,
                    slot: slot.index(),
                    slot_count,
                });
            }

            if self.table.get(node.op_index).is_none() {
                return Err(ProgramError::OperationOutOfRange { node: index });
            }
        }

        for param in &self.parameters {
            if param.slot.index() >= slot_count {
                return Err(ProgramError::ParameterSlotOutOfRange {
                    parameter: param.id,
                    slot: param.slot.index(),
                    slot_count,
                });
            }
        }

        if let Some(index) = self.output {
            if index >= self.nodes.len() {
                return Err(ProgramError::OutputOutOfRange {
                    index,
                    len: self.nodes.len(),
                });
            }
        }

        Ok(())
    }
}

fn write_slots(f: &mut fmt::Formatter<'_>, slots: &[Option<Slot>]) -> fmt::Result {
    write!(f, "[")?;
    for (i, slot) in slots.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match slot {
            Some(slot) => write!(f, "{}", slot)?,
            None => write!(f, "_")?,
        }
    }
    write!(f, "]")
}

impl fmt::Display for CompiledGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; {} slots", self.slot_count)?;
        for param in &self.parameters {
            writeln!(f, "param {:?} -> {}", param.name, param.slot)?;
        }
        for (index, node) in self.nodes.iter().enumerate() {
            let name = self
                .table
                .get(node.op_index)
                .map_or("?", |registration| registration.name);
            write!(f, "{:>4}: {} {:<14} ", index, node.op, name)?;
            write_slots(f, &node.input_slots)?;
            write!(f, " -> ")?;
            write_slots(f, &node.output_slots)?;
            if Some(index) == self.output {
                write!(f, "  ; output")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
