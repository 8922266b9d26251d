use clap::{ArgAction, Parser};
use gradeflow::prelude::*;
use serde::Deserialize;
use std::fs;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*};

// --- Input file format ---
// Either a single `{ "source-id": points }` map, or a list of students.

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInputs {
    Batch(Vec<RawStudent>),
    Single(InputMap),
}

#[derive(Deserialize)]
struct RawStudent {
    student: String,
    #[serde(alias = "points")]
    inputs: InputMap,
}

/// Validates and evaluates grading models saved by the graph editor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the editor graph JSON file
    graph_path: String,
    /// Optional path to the points JSON file; without it the graph is only validated
    inputs_path: Option<String>,

    /// Evaluate with incomplete inputs, showing unevaluable nodes instead of failing
    #[arg(short, long)]
    preview: bool,

    /// Reject graphs that only have warnings
    #[arg(long)]
    strict: bool,

    /// Map an editor node type onto a built-in one, e.g. `attainment=source`
    #[arg(long = "type-mapping", value_name = "USER=CANONICAL")]
    type_mappings: Vec<String>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli);
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(level))
        .init();
}

fn run(cli: Cli) {
    let total_start = Instant::now();

    // --- 1. Import ---
    let graph_json = fs::read_to_string(&cli.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read graph file '{}': {}", cli.graph_path, e))
    });
    let importer = cli
        .type_mappings
        .iter()
        .fold(GraphImporter::builder(), |builder, mapping| {
            let (user, canonical) = mapping.split_once('=').unwrap_or_else(|| {
                exit_with_error(&format!(
                    "Invalid type mapping '{}', expected USER=CANONICAL",
                    mapping
                ))
            });
            builder.with_type_mapping(user.trim(), canonical.trim())
        })
        .build();
    let graph = importer
        .from_json(&graph_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to import graph: {}", e)));

    // --- 2. Validation ---
    let validate_start = Instant::now();
    let validator = Validator::builder().warnings_as_errors(cli.strict).build();
    let validated = match validator.validate(graph) {
        Ok(validated) => validated,
        Err(errors) => {
            eprintln!("\nGrading model is invalid ({} problems):", errors.len());
            for error in &errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(1);
        }
    };
    let validate_duration = validate_start.elapsed();

    println!(
        "Grading model is valid: {} nodes, {} edges",
        validated.len(),
        validated.graph().edges.len()
    );
    for warning in validated.warnings() {
        println!("  warning: {}", warning);
    }

    let evaluator = Evaluator::new(validated);
    println!(
        "Evaluation order: {}",
        evaluator.schedule().node_ids(evaluator.graph()).join(" -> ")
    );

    let Some(inputs_path) = cli.inputs_path else {
        return;
    };

    // --- 3. Evaluation ---
    let inputs_json = fs::read_to_string(&inputs_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read inputs file '{}': {}", inputs_path, e))
    });
    let inputs: RawInputs = serde_json::from_str(&inputs_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse inputs JSON: {}", e)));

    let eval_start = Instant::now();
    match inputs {
        RawInputs::Single(inputs) if cli.preview => print_preview(&evaluator, &inputs),
        RawInputs::Single(inputs) => {
            let result = evaluator
                .evaluate(&inputs)
                .unwrap_or_else(|e| exit_with_error(&format!("Evaluation failed: {}", e)));
            println!("\n  -> Final grade: {}", result.final_grade);
            println!("  -> Reason: {}", result.reason);
        }
        RawInputs::Batch(students) => {
            let batch: Vec<(String, InputMap)> = students
                .into_iter()
                .map(|s| (s.student, s.inputs))
                .collect();
            println!();
            if cli.preview {
                for (student, result) in evaluator.evaluate_partial_batch(&batch) {
                    match result {
                        Ok(preview) => println!("  {}: {} (preview)", student, preview.final_grade),
                        Err(e) => println!("  {}: error: {}", student, e),
                    }
                }
                return print_timings(validate_duration, eval_start, total_start);
            }
            for (student, result) in evaluator.evaluate_batch(&batch) {
                match result {
                    Ok(result) => println!("  {}: {} ({})", student, result.final_grade, result.reason),
                    Err(e) => println!("  {}: error: {}", student, e),
                }
            }
        }
    }
    print_timings(validate_duration, eval_start, total_start);
}

fn print_timings(validate_duration: Duration, eval_start: Instant, total_start: Instant) {
    let eval_duration = eval_start.elapsed();

    println!("\n--- Performance Summary ---");
    println!("Validation:           {:?}", validate_duration);
    println!("Evaluation:           {:?}", eval_duration);
    println!("-----------------------------");
    println!("Total Execution:      {:?}", total_start.elapsed());
}

fn print_preview(evaluator: &Evaluator, inputs: &InputMap) {
    let preview = evaluator
        .evaluate_partial(inputs)
        .unwrap_or_else(|e| exit_with_error(&format!("Preview failed: {}", e)));
    println!();
    for id in evaluator.schedule().node_ids(evaluator.graph()) {
        if let Some(value) = preview.get(id) {
            println!("  {:<24} {}", id, value);
        }
    }
    println!("\n  -> Final grade (preview): {}", preview.final_grade);
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
