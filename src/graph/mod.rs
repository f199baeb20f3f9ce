mod compiler;
mod description;
mod slots;
pub mod topology;
pub mod types;

#[cfg(test)]
mod tests;

pub use compiler::compile;
pub use description::{GraphDescription, NodeDescription, ParameterDescription};
pub use slots::SlotAllocator;
pub use topology::{dependency_order, TopologyError};
pub use types::{
    InputSocket, NodeKey, NodeRole, OpId, OutputSocket, ParameterId, Slot, Wire,
    MAX_NODE_SOCKETS,
};
