// Run with: cargo flamegraph --bin profile_graph
// Or: RUST_LOG=debug cargo run --release --bin profile_graph

use expression_graph::ops::catalog::{self, math_node, random_node};
use expression_graph::{
    compile, GraphDescription, GraphRuntime, NodeDescription, OperationTable, OutputSocket,
    RuntimeConfig,
};
use std::sync::Arc;

/// A wide graph: `lanes` random sources pushed through a chain of math nodes, each
/// scaled by a shared `gain` parameter and folded into one sum.
fn build_graph(lanes: usize, depth: usize) -> GraphDescription {
    let mut graph = GraphDescription::new();
    let gain = graph.add_parameter("gain", 0.5_f32);
    let ops = [
        catalog::SINE,
        catalog::ABSOLUTE,
        catalog::SQRT,
        catalog::COSINE,
        catalog::SATURATE,
    ];

    let mut sum: Option<OutputSocket> = None;
    for lane in 0..lanes {
        let mut head = graph.add_node(random_node()).output(0);
        for step in 0..depth {
            let node = graph.add_node(math_node(ops[(lane * 3 + step) % ops.len()], &[0.0]));
            graph.connect(head, node.input(0));
            head = node.output(0);
        }

        let read = graph.add_node(NodeDescription::parameter(gain));
        let scaled = graph.add_node(math_node(catalog::MULTIPLY, &[0.0, 0.0]));
        graph.connect(head, scaled.input(0));
        graph.connect(read.output(0), scaled.input(1));

        sum = Some(match sum {
            Some(acc) => {
                let add = graph.add_node(math_node(catalog::ADD, &[0.0, 0.0]));
                graph.connect(acc, add.input(0));
                graph.connect(scaled.output(0), add.input(1));
                add.output(0)
            }
            None => scaled.output(0),
        });
    }

    let out = graph.add_node(NodeDescription::output());
    if let Some(sum) = sum {
        graph.connect(sum, out.input(0));
    }
    graph
}

fn main() {
    env_logger::init();

    let num_ticks = 1_000_000;
    let frame_time = 1.0 / 240.0;

    let table = match OperationTable::standard() {
        Ok(table) => Arc::new(table),
        Err(err) => {
            eprintln!("failed to build operation table: {}", err);
            return;
        }
    };

    let graph = build_graph(64, 12);
    let start = std::time::Instant::now();
    let compiled = match compile(&graph, table) {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("failed to compile graph: {}", err);
            return;
        }
    };
    let stats = compiled.stats();

    println!("=== Layered graph (64 lanes x 12 ops) ===");
    println!("Compiled in {:?}", start.elapsed());
    println!(
        "{} live nodes, {} slots (peak {} live)",
        stats.live_nodes, stats.slot_count, stats.peak_live_slots
    );

    let config = RuntimeConfig::default()
        .with_updates_per_second(0.0)
        .with_seed(1);
    let mut runtime = GraphRuntime::new(compiled, config);

    println!("Evaluating {} ticks...", num_ticks);
    let start = std::time::Instant::now();

    for _ in 0..num_ticks {
        runtime.tick(frame_time);
    }

    let elapsed = start.elapsed();
    println!("Processed {} ticks in {:?}", num_ticks, elapsed);
    println!(
        "Ticks per second: {:.2}",
        num_ticks as f64 / elapsed.as_secs_f64()
    );
    println!(
        "Nanoseconds per tick: {:.2}",
        elapsed.as_nanos() as f64 / num_ticks as f64
    );
    println!("Last output: {}", runtime.output());
}
