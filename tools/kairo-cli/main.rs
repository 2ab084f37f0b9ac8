use clap::{Args, Parser, Subcommand};
use kairo::compiler::DEFAULT_FUNCTION_NAME;
use kairo::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Evaluate dataflow graph snapshots and compile them to Python
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the Python program for a snapshot
    Compile(CompileArgs),
    /// Evaluate a snapshot and print every node's live value
    Eval(EvalArgs),
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// Path to the workspace snapshot JSON file
    snapshot_path: String,

    /// Read nodes of a custom type as a built-in kind, e.g. `number=numberInput`
    #[arg(long = "alias", value_name = "TYPE=KIND")]
    aliases: Vec<String>,
}

#[derive(Args, Debug)]
struct CompileArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// Write the program to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Name of the generated function
    #[arg(long, default_value = DEFAULT_FUNCTION_NAME)]
    function_name: String,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Omit the header comment
    #[arg(long)]
    no_header: bool,

    /// Omit the `if __name__ == "__main__":` block
    #[arg(long)]
    no_main: bool,
}

#[derive(Args, Debug)]
struct EvalArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// Override an input literal before evaluating, e.g. `a=5` or `l=[1,2]`
    #[arg(long = "set", value_name = "NODE=VALUE")]
    overrides: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("kairo={}", level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Compile(args) => run_compile(args),
        Command::Eval(args) => run_eval(args),
    }
}

fn load_graph(args: &SnapshotArgs) -> Graph {
    let json = fs::read_to_string(&args.snapshot_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read snapshot file '{}': {}",
            args.snapshot_path, e
        ))
    });

    let mut reader = SnapshotReader::new();
    for alias in &args.aliases {
        let (custom, kind) = split_pair(alias)
            .unwrap_or_else(|| exit_with_error(&format!("Invalid alias '{}', expected TYPE=KIND", alias)));
        reader = reader.with_kind_alias(custom, kind);
    }

    reader
        .read_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load snapshot: {}", e)))
}

fn run_compile(args: CompileArgs) {
    let graph = load_graph(&args.snapshot);

    let compile_start = Instant::now();
    let program = Compiler::builder(&graph)
        .with_function_name(&args.function_name)
        .with_indent(" ".repeat(args.indent))
        .with_header(!args.no_header)
        .with_main_block(!args.no_main)
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    let compile_duration = compile_start.elapsed();

    for diagnostic in &program.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    match args.output {
        Some(path) => {
            fs::write(&path, format!("{}\n", program.source)).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path, e))
            });
            eprintln!(
                "Compiled {} nodes into '{}' in {:?}",
                graph.len(),
                path,
                compile_duration
            );
        }
        None => println!("{}", program.source),
    }
}

fn run_eval(args: EvalArgs) {
    let graph = load_graph(&args.snapshot);
    let mut engine = Engine::new(graph);

    let eval_start = Instant::now();
    engine
        .settle_all()
        .unwrap_or_else(|e| exit_with_error(&format!("Evaluation failed: {}", e)));

    for text in &args.overrides {
        let (id, literal) = split_pair(text)
            .unwrap_or_else(|| exit_with_error(&format!("Invalid override '{}', expected NODE=VALUE", text)));
        let value = serde_json::from_str::<Value>(literal).unwrap_or_else(|_| Value::from(literal));
        let changes = engine
            .set_value(id, value)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to set '{}': {}", id, e)));
        eprintln!("{}: {} node(s) changed", id, changes.len());
    }
    let eval_duration = eval_start.elapsed();

    println!("--- Live Values ---");
    for node in engine.graph().nodes() {
        let label = node.name.as_deref().unwrap_or(node.id.as_str());
        println!("{:<20} {:<18} {}", label, node.kind.to_string(), node.value);
    }
    println!("-------------------");
    println!("Evaluation: {:?}", eval_duration);
}

fn split_pair(text: &str) -> Option<(&str, &str)> {
    text.split_once('=')
        .map(|(left, right)| (left.trim(), right.trim()))
        .filter(|(left, _)| !left.is_empty())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
