use std::sync::Arc;

use rand::rngs::StdRng;

use crate::graph::Slot;
use crate::ops::OperationTable;
use crate::value::Value;

/// Live state shared by all nodes of one runtime during evaluation.
#[derive(Debug)]
pub struct ExecutionContext {
    pub(crate) slots: Vec<Value>,
    pub(crate) table: Arc<OperationTable>,
    pub(crate) rng: StdRng,
}

impl ExecutionContext {
    pub fn new(slot_count: usize, table: Arc<OperationTable>, rng: StdRng) -> Self {
        Self {
            slots: vec![Value::Empty; slot_count],
            table,
            rng,
        }
    }

    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    pub fn slot(&self, slot: Slot) -> Option<&Value> {
        self.slots.get(slot.index())
    }

    pub fn table(&self) -> &Arc<OperationTable> {
        &self.table
    }

    #[inline]
    pub(crate) fn write(&mut self, slot: Slot, value: Value) {
        self.slots[slot.index()] = value;
    }
}
