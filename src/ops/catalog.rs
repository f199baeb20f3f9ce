//! Operations of the bundled node catalog.
//!
//! Group 1 holds the graph's own nodes, group 3 the math nodes and group 6 the
//! parameter read. Ids match what the authoring surface assigns.

use super::{Invocation, Registration};
use crate::graph::{NodeDescription, OpId};

pub const GRAPH_OUTPUT: OpId = OpId::OUTPUT;
pub const RANDOM_FLOAT: OpId = OpId::new(1, 2, 0);

pub const ADD: OpId = OpId::new(3, 1, 0);
pub const SUBTRACT: OpId = OpId::new(3, 2, 0);
pub const MULTIPLY: OpId = OpId::new(3, 3, 0);
pub const MODULO: OpId = OpId::new(3, 4, 0);
pub const DIVIDE: OpId = OpId::new(3, 5, 0);
pub const ABSOLUTE: OpId = OpId::new(3, 7, 0);
pub const CEIL: OpId = OpId::new(3, 8, 0);
pub const COSINE: OpId = OpId::new(3, 9, 0);
pub const FLOOR: OpId = OpId::new(3, 10, 0);
pub const ROUND: OpId = OpId::new(3, 13, 0);
pub const SATURATE: OpId = OpId::new(3, 14, 0);
pub const SINE: OpId = OpId::new(3, 15, 0);
pub const SQRT: OpId = OpId::new(3, 16, 0);
pub const TANGENT: OpId = OpId::new(3, 17, 0);
pub const POWER: OpId = OpId::new(3, 23, 0);

pub const PARAMETER_READ: OpId = OpId::PARAMETER;

pub fn registrations() -> Vec<Registration> {
    vec![
        Registration::new(GRAPH_OUTPUT, "Graph Output", |_| {}),
        Registration::new(RANDOM_FLOAT, "Random Float", random_float),
        Registration::new(ADD, "Add", |node| binary(node, |a, b| a + b)),
        Registration::new(SUBTRACT, "Subtract", |node| binary(node, |a, b| a - b)),
        Registration::new(MULTIPLY, "Multiply", |node| binary(node, |a, b| a * b)),
        Registration::new(MODULO, "Modulo", |node| binary(node, |a, b| a % b)),
        Registration::new(DIVIDE, "Divide", |node| binary(node, |a, b| a / b)),
        Registration::new(ABSOLUTE, "Absolute", |node| unary(node, f32::abs)),
        Registration::new(CEIL, "Ceil", |node| unary(node, f32::ceil)),
        Registration::new(COSINE, "Cosine", |node| unary(node, f32::cos)),
        Registration::new(FLOOR, "Floor", |node| unary(node, f32::floor)),
        Registration::new(ROUND, "Round", |node| unary(node, f32::round_ties_even)),
        Registration::new(SATURATE, "Saturate", |node| {
            unary(node, |a| a.clamp(0.0, 1.0))
        }),
        Registration::new(SINE, "Sine", |node| unary(node, f32::sin)),
        Registration::new(SQRT, "Square Root", |node| unary(node, f32::sqrt)),
        Registration::new(TANGENT, "Tangent", |node| unary(node, f32::tan)),
        Registration::new(POWER, "Power", |node| binary(node, f32::powf)),
        Registration::new(PARAMETER_READ, "Get Parameter", parameter_read),
    ]
}

/// A math node whose inputs default to `defaults` while unwired, with one output.
pub fn math_node(op: OpId, defaults: &[f32]) -> NodeDescription {
    defaults
        .iter()
        .fold(NodeDescription::new(op), |node, &default| {
            node.input_literal(default)
        })
        .outputs(1)
}

pub fn random_node() -> NodeDescription {
    NodeDescription::new(RANDOM_FLOAT).outputs(1)
}

fn unary(node: &mut Invocation<'_>, f: fn(f32) -> f32) {
    let a = node.input::<f32>(0);
    node.ret(0, f(a));
}

fn binary(node: &mut Invocation<'_>, f: fn(f32, f32) -> f32) {
    let a = node.input::<f32>(0);
    let b = node.input::<f32>(1);
    node.ret(0, f(a, b));
}

fn random_float(node: &mut Invocation<'_>) {
    let value = node.random();
    node.ret(0, value);
}

// The parameter's slot is bound as input 0; whatever it holds passes through untouched.
fn parameter_read(node: &mut Invocation<'_>) {
    let value = node.input_value(0);
    node.ret(0, value);
}
