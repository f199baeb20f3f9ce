use arrayvec::ArrayVec;

use super::context::ExecutionContext;
use crate::graph::{NodeKey, NodeRole, OpId, Slot, MAX_NODE_SOCKETS};
use crate::ops::{Invocation, OpIndex};
use crate::value::Value;

/// Execution-ready form of an authored node.
///
/// A compiled node keeps no state between ticks beyond its literals and slot
/// bindings; every intermediate value lives in the [`ExecutionContext`].
#[derive(Debug, Clone)]
pub struct CompiledNode {
    pub(crate) op: OpId,
    pub(crate) op_index: OpIndex,
    pub(crate) role: NodeRole,
    pub(crate) source: NodeKey,
    pub(crate) literals: Vec<Value>,
    pub(crate) input_slots: ArrayVec<Option<Slot>, MAX_NODE_SOCKETS>,
    pub(crate) output_slots: ArrayVec<Option<Slot>, MAX_NODE_SOCKETS>,
    pub(crate) input_cache: ArrayVec<Value, MAX_NODE_SOCKETS>,
}

impl CompiledNode {
    pub fn op(&self) -> OpId {
        self.op
    }

    pub fn op_index(&self) -> OpIndex {
        self.op_index
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// The authored node this was compiled from.
    pub fn source(&self) -> NodeKey {
        self.source
    }

    pub fn literals(&self) -> &[Value] {
        &self.literals
    }

    /// Slot feeding each input, `None` for inputs that keep their literal.
    pub fn input_slots(&self) -> &[Option<Slot>] {
        &self.input_slots
    }

    /// Slot receiving each output, `None` for outputs nobody reads.
    pub fn output_slots(&self) -> &[Option<Slot>] {
        &self.output_slots
    }

    /// Input values as of the most recent execution.
    pub fn input_cache(&self) -> &[Value] {
        &self.input_cache
    }

    pub fn execute(&mut self, context: &mut ExecutionContext) {
        for (cached, slot) in self.input_cache.iter_mut().zip(&self.input_slots) {
            if let Some(slot) = slot {
                *cached = context.slots[slot.index()].clone();
            }
        }

        let Some(registration) = context.table.get(self.op_index) else {
            debug_assert!(false, "operation {} has no table entry", self.op);
            return;
        };
        let operation = registration.operation;

        let mut invocation = Invocation::new(self, &mut context.slots, &mut context.rng);
        operation(&mut invocation);
    }
}
