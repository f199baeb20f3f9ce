//! Compiles authored expression graphs into a flat, slot-allocated program and
//! evaluates it at a throttled rate.

pub mod config;
pub mod error;
pub mod graph;
pub mod ops;
pub mod runtime;
pub mod value;

pub use config::{RuntimeConfig, ThrottleMode};
pub use error::{CompileError, ConfigError, ProgramError, RuntimeError, SlotError, TableError};
pub use graph::*;
pub use ops::{Invocation, OpIndex, Operation, OperationTable, Registration};
pub use runtime::{CompileStats, CompiledGraph, CompiledNode, ExecutionContext, GraphRuntime, Parameter};
pub use value::{coerce, FromValue, Value, ValueObject};
