mod context;
mod node;
mod program;


pub use context::ExecutionContext;
pub use node::CompiledNode;
pub use program::{CompileStats, CompiledGraph, Parameter};

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::config::{RuntimeConfig, ThrottleMode};
use crate::error::RuntimeError;
use crate::graph::ParameterId;
use crate::ops::OperationTable;
use crate::value::{coerce, Value};

/// Runs a compiled graph at a throttled rate.
///
/// The host calls [`tick`](Self::tick) once per frame with the elapsed time. Once
/// enough time has accumulated the graph is evaluated: parameters are written into
/// their slots, every node executes in dependency order and the output node's
/// inputs are published as floats.
#[derive(Debug)]
pub struct GraphRuntime {
    nodes: Vec<CompiledNode>,
    parameters: Vec<Parameter>,
    output: Option<usize>,
    context: ExecutionContext,
    config: RuntimeConfig,
    accumulated: f32,
    outputs: Vec<f32>,
    evaluations: u64,
}

impl GraphRuntime {
    pub fn new(graph: CompiledGraph, config: RuntimeConfig) -> Self {
        debug_assert!(
            graph.validate().is_ok(),
            "compiled graph violates its binding invariants: {:?}",
            graph.validate()
        );

        let rng = config.make_rng();
        let context = ExecutionContext::new(graph.slot_count, graph.table, rng);
        Self {
            nodes: graph.nodes,
            parameters: graph.parameters,
            output: graph.output,
            context,
            config,
            accumulated: 0.0,
            outputs: Vec::new(),
            evaluations: 0,
        }
    }

    /// A runtime without nodes. Ticks accumulate time but publish nothing.
    pub fn empty(table: Arc<OperationTable>, config: RuntimeConfig) -> Self {
        Self::new(CompiledGraph::empty(table), config)
    }

    /// Swaps in a freshly compiled graph.
    ///
    /// Slots and parameters are rebuilt from `graph`. Accumulated time, the random
    /// source and the last published outputs carry over until the next evaluation.
    pub fn load(&mut self, graph: CompiledGraph) {
        debug_assert!(graph.validate().is_ok());
        debug!(
            "Loading graph with {} nodes and {} slots",
            graph.nodes.len(),
            graph.slot_count
        );

        self.context.slots = vec![Value::Empty; graph.slot_count];
        self.context.table = graph.table;
        self.nodes = graph.nodes;
        self.parameters = graph.parameters;
        self.output = graph.output;
    }

    /// Advances the throttle by `dt` seconds. Returns whether the graph was evaluated.
    ///
    /// Non-finite deltas are ignored and leave the accumulator untouched.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !dt.is_finite() {
            warn!("Ignoring non-finite tick delta {}", dt);
            return false;
        }
        self.accumulated += dt;

        let interval = self.config.update_interval();
        if self.accumulated < interval {
            return false;
        }

        match self.config.throttle {
            ThrottleMode::Reset => self.accumulated = 0.0,
            ThrottleMode::CarryRemainder if interval > 0.0 => self.accumulated -= interval,
            ThrottleMode::CarryRemainder => self.accumulated = 0.0,
        }

        self.evaluate()
    }

    /// Evaluates the graph once, ignoring the throttle. Returns `false` for an empty
    /// graph, whose last published outputs are kept.
    pub fn evaluate(&mut self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        for param in &self.parameters {
            self.context.write(param.slot, param.value.clone());
        }

        for node in &mut self.nodes {
            node.execute(&mut self.context);
        }

        if let Some(sink) = self.output.and_then(|index| self.nodes.get(index)) {
            self.outputs.clear();
            self.outputs
                .extend(sink.input_cache.iter().map(coerce::<f32>));
        }

        self.evaluations += 1;
        trace!("Evaluation {} published {:?}", self.evaluations, self.outputs);
        true
    }

    /// First published output, `0.0` before anything has been evaluated.
    pub fn output(&self) -> f32 {
        self.outputs.first().copied().unwrap_or(0.0)
    }

    pub fn outputs(&self) -> &[f32] {
        &self.outputs
    }

    /// Sets a parameter value. It reaches the graph on the next evaluation.
    pub fn set_parameter(
        &mut self,
        id: ParameterId,
        value: impl Into<Value>,
    ) -> Result<(), RuntimeError> {
        let param = self
            .parameters
            .iter_mut()
            .find(|param| param.id == id)
            .ok_or(RuntimeError::UnknownParameter(id))?;
        param.value = value.into();
        Ok(())
    }

    pub fn set_parameter_by_name(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), RuntimeError> {
        let param = self
            .parameters
            .iter_mut()
            .find(|param| param.name == name)
            .ok_or_else(|| RuntimeError::UnknownParameterName(name.to_string()))?;
        param.value = value.into();
        Ok(())
    }

    pub fn parameter(&self, id: ParameterId) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|param| param.id == id)
            .map(|param| &param.value)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn nodes(&self) -> &[CompiledNode] {
        &self.nodes
    }

    pub fn slot_count(&self) -> usize {
        self.context.slots.len()
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Number of evaluations since the runtime was created.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}
