use clap::Parser;
use kairo::graph::{Graph, Node};
use kairo::semantics::{BooleanOp, ComparisonOp, ListConfig, ListOp, NodeKind};
use kairo::snapshot;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::fs;

/// A CLI tool to generate random acyclic workspace snapshots for kairo
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_graph.json")]
    output: String,

    /// Number of input nodes
    #[arg(long, default_value_t = 4)]
    inputs: usize,

    /// Number of computed nodes layered on top of the inputs
    #[arg(long, default_value_t = 12)]
    operations: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.inputs == 0 {
        eprintln!("Error: --inputs must be at least 1");
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    println!(
        "Generating graph ({} inputs, {} operations)...",
        cli.inputs, cli.operations
    );

    let graph = generate_graph(&mut rng, cli.inputs, cli.operations)?;
    fs::write(&cli.output, snapshot::to_json(&graph)?)?;

    println!(
        "Successfully generated {} nodes and {} edges into '{}'",
        graph.len(),
        graph.edge_count(),
        cli.output
    );

    Ok(())
}

/// Builds a graph whose edges always point from an earlier node to a later
/// one, so the result is acyclic.
fn generate_graph(
    rng: &mut StdRng,
    inputs: usize,
    operations: usize,
) -> Result<Graph, Box<dyn std::error::Error>> {
    let mut graph = Graph::new();
    let mut numeric: Vec<String> = Vec::new();
    let mut boolean: Vec<String> = Vec::new();

    for i in 0..inputs {
        let id = format!("input-{}", i);
        let value = rng.random_range(-20..=20) as f64;
        graph.add_node(Node::new(id.as_str(), NodeKind::NumberInput).with_value(value))?;
        numeric.push(id);
    }

    let list_id = "input-list".to_string();
    let items: Vec<f64> = (0..5).map(|_| rng.random_range(-9..=9) as f64).collect();
    graph.add_node(
        Node::new(list_id.as_str(), NodeKind::ListInput)
            .with_value(kairo::ast::Value::List(items.into_iter().map(Into::into).collect())),
    )?;

    for i in 0..operations {
        let id = format!("op-{}", i);
        match rng.random_range(0..6) {
            0 | 1 => {
                let kind = [
                    NodeKind::Addition,
                    NodeKind::Subtraction,
                    NodeKind::Multiplication,
                    NodeKind::Division,
                ]
                .choose(rng)
                .cloned()
                .unwrap_or(NodeKind::Addition);
                add_binary(&mut graph, rng, &id, kind, &numeric, &["a", "b"])?;
                numeric.push(id);
            }
            2 => {
                let op = *ComparisonOp::ALL.choose(rng).unwrap_or(&ComparisonOp::Equal);
                add_binary(
                    &mut graph,
                    rng,
                    &id,
                    NodeKind::Comparison(op),
                    &numeric,
                    &["left", "right"],
                )?;
                boolean.push(id);
            }
            3 if boolean.len() >= 2 => {
                let op = *BooleanOp::ALL.choose(rng).unwrap_or(&BooleanOp::And);
                add_binary(
                    &mut graph,
                    rng,
                    &id,
                    NodeKind::BooleanOperation(op),
                    &boolean,
                    &["left", "right"],
                )?;
                boolean.push(id);
            }
            4 if !boolean.is_empty() => {
                graph.add_node(Node::new(id.as_str(), NodeKind::IfElse))?;
                connect_random(&mut graph, rng, &boolean, &id, "condition")?;
                connect_random(&mut graph, rng, &numeric, &id, "true")?;
                connect_random(&mut graph, rng, &numeric, &id, "false")?;
                numeric.push(id);
            }
            _ => {
                let op = *[ListOp::Sort, ListOp::Reverse, ListOp::Length, ListOp::Map]
                    .choose(rng)
                    .unwrap_or(&ListOp::Sort);
                graph.add_node(Node::new(
                    id.as_str(),
                    NodeKind::ListOperation(ListConfig::new(op)),
                ))?;
                graph.connect(&list_id, &id, Some("target"))?;
                if op == ListOp::Length {
                    numeric.push(id);
                }
            }
        }
    }

    if let Some(last) = numeric.last().cloned() {
        graph.add_node(Node::new("display", NodeKind::Display))?;
        graph.connect(&last, "display", Some("input"))?;
    }
    Ok(graph)
}

fn add_binary(
    graph: &mut Graph,
    rng: &mut StdRng,
    id: &str,
    kind: NodeKind,
    pool: &[String],
    handles: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    graph.add_node(Node::new(id, kind))?;
    for handle in handles {
        connect_random(graph, rng, pool, id, handle)?;
    }
    Ok(())
}

fn connect_random(
    graph: &mut Graph,
    rng: &mut StdRng,
    pool: &[String],
    target: &str,
    handle: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(source) = pool.choose(rng) {
        graph.connect(source, target, Some(handle))?;
    }
    Ok(())
}
