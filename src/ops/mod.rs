pub mod catalog;


use std::collections::HashSet;
use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::TableError;
use crate::graph::OpId;
use crate::runtime::CompiledNode;
use crate::value::{FromValue, Value};

/// Executable behavior of one operation kind.
pub type Operation = fn(&mut Invocation<'_>);

/// Compact dispatch index resolved once per node at compile time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpIndex(u32);

impl OpIndex {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone)]
pub struct Registration {
    pub op: OpId,
    pub name: &'static str,
    pub operation: Operation,
}

impl Registration {
    pub const fn new(op: OpId, name: &'static str, operation: Operation) -> Self {
        Self {
            op,
            name,
            operation,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("op", &self.op)
            .field("name", &self.name)
            .field("operation", &"<fn>")
            .finish()
    }
}

/// Dense `group -> kind -> method` lookup over a flat array of operations.
///
/// Built once from an explicit registration list and immutable afterwards, so a
/// single table can be shared by any number of runtimes.
pub struct OperationTable {
    index: Vec<Vec<Vec<Option<OpIndex>>>>,
    entries: Vec<Registration>,
}

impl OperationTable {
    pub fn build(
        registrations: impl IntoIterator<Item = Registration>,
    ) -> Result<Self, TableError> {
        let mut index: Vec<Vec<Vec<Option<OpIndex>>>> = Vec::new();
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for registration in registrations {
            let op = registration.op;
            if !seen.insert(op) {
                return Err(TableError::DuplicateOperation(op));
            }

            let (group, kind, method) = (
                usize::from(op.group),
                usize::from(op.kind),
                usize::from(op.method),
            );
            if index.len() <= group {
                index.resize_with(group + 1, Vec::new);
            }
            let kinds = &mut index[group];
            if kinds.len() <= kind {
                kinds.resize_with(kind + 1, Vec::new);
            }
            let methods = &mut kinds[kind];
            if methods.len() <= method {
                methods.resize(method + 1, None);
            }

            methods[method] = Some(OpIndex(entries.len() as u32));
            entries.push(registration);
        }

        Ok(Self { index, entries })
    }

    /// The table over [`catalog::registrations`].
    pub fn standard() -> Result<Self, TableError> {
        Self::build(catalog::registrations())
    }

    #[inline]
    pub fn resolve(&self, op: OpId) -> Option<OpIndex> {
        self.index
            .get(usize::from(op.group))?
            .get(usize::from(op.kind))?
            .get(usize::from(op.method))
            .copied()
            .flatten()
    }

    pub fn lookup(&self, group: u16, kind: u16, method: u16) -> Option<&Registration> {
        self.resolve(OpId::new(group, kind, method))
            .and_then(|index| self.get(index))
    }

    #[inline]
    pub fn get(&self, index: OpIndex) -> Option<&Registration> {
        self.entries.get(index.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.iter()
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("operations", &self.entries.len())
            .field("groups", &self.index.len())
            .finish()
    }
}

/// What an operation sees while it runs: the node's refreshed inputs and literals,
/// write access to the node's output slots, and the context's random source.
pub struct Invocation<'a> {
    node: &'a CompiledNode,
    slots: &'a mut [Value],
    rng: &'a mut StdRng,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(node: &'a CompiledNode, slots: &'a mut [Value], rng: &'a mut StdRng) -> Self {
        Self { node, slots, rng }
    }

    /// Input `index` as `T`. Missing or mismatched inputs read as zero.
    #[inline]
    pub fn input<T: FromValue>(&self, index: usize) -> T {
        T::from_value(self.node.input_cache().get(index).unwrap_or(&Value::Empty))
    }

    pub fn input_value(&self, index: usize) -> Value {
        self.node
            .input_cache()
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_input_connection(&self, index: usize) -> bool {
        matches!(self.node.input_slots().get(index), Some(Some(_)))
    }

    #[inline]
    pub fn literal<T: FromValue>(&self, index: usize) -> T {
        T::from_value(self.node.literals().get(index).unwrap_or(&Value::Empty))
    }

    /// Stores `value` as output `index`. Outputs nobody reads are dropped.
    #[inline]
    pub fn ret(&mut self, index: usize, value: impl Into<Value>) {
        debug_assert!(
            index < self.node.output_slots().len(),
            "operation {} wrote undeclared output {}",
            self.node.op(),
            index
        );
        if let Some(Some(slot)) = self.node.output_slots().get(index) {
            self.slots[slot.index()] = value.into();
        }
    }

    /// Uniform sample from `[0, 1)`.
    pub fn random(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}
