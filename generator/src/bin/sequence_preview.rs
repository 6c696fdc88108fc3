//! Sequence preview for the N-back generator
//!
//! Generates one sequence and prints it with its target flags, lure tags and
//! validation result.
//!
//! Usage:
//!   cargo run -p nback-generator --bin sequence-preview -- [OPTIONS]
//!
//! Options:
//!   --n-back <N>      N of the N-back task (default: 2)
//!   --trials <N>      Sequence length (default: 10)
//!   --seed <N>        Random seed for reproducibility (default: OS entropy)
//!   --practice        Use practice constraints (lower target rate, no lures)
//!   --config <FILE>   Load constraints from a JSON file; flags above override it
//!   --json            Print the trials as JSON instead of text

use nback_generator::{validate, SequenceConstraints, SequenceGenerator, TrialSpec};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let opts = parse_args(&args);

    let constraints = match build_constraints(&opts) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(2);
        }
    };

    let mut generator = match SequenceGenerator::new(constraints) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(2);
        }
    };

    let generated = match generator.run() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if opts.json_output {
        match serde_json::to_string_pretty(&generated.trials) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let c = generator.constraints();
    let summary = generated.summary();
    let violations = validate(&generated.trials, c);

    println!("n_back: {} trials: {}", c.n_back, c.n_trials);
    println!("seq:        {}", symbols(&generated.trials));
    println!("is_target:  {}", flags(&generated.trials));
    println!(
        "lure_type:  {}",
        generated
            .trials
            .iter()
            .map(|t| t.lure_type.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!(
        "iti_ms:     {}",
        generated
            .trials
            .iter()
            .map(|t| t.iti_ms.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!();
    println!(
        "targets: {} (planned {}), n-1 lures: {}, n+1 lures: {}, demoted lures: {}",
        summary.targets,
        generated.planned_targets,
        summary.lures_n_minus_1,
        summary.lures_n_plus_1,
        summary.demoted_lures
    );
    println!("accepted on attempt {}", generated.attempt);
    if violations.passed() {
        println!("valid: ok");
    } else {
        for v in &violations {
            println!("valid: {}", v);
        }
    }
}

#[derive(Debug, Default)]
struct PreviewOptions {
    n_back: Option<usize>,
    trials: Option<usize>,
    seed: Option<u64>,
    practice: bool,
    config_path: Option<PathBuf>,
    json_output: bool,
}

fn parse_args(args: &[String]) -> PreviewOptions {
    let mut opts = PreviewOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--n-back" => {
                i += 1;
                if i < args.len() {
                    opts.n_back = args[i].parse().ok();
                }
            }
            "--trials" => {
                i += 1;
                if i < args.len() {
                    opts.trials = args[i].parse().ok();
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    opts.seed = args[i].parse().ok();
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    opts.config_path = Some(PathBuf::from(&args[i]));
                }
            }
            "--practice" => opts.practice = true,
            "--json" => opts.json_output = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    opts
}

fn build_constraints(opts: &PreviewOptions) -> Result<SequenceConstraints, String> {
    let mut constraints = match &opts.config_path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            serde_json::from_str(&source)
                .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?
        }
        None => {
            let n_back = opts.n_back.unwrap_or(2);
            let trials = opts.trials.unwrap_or(10);
            if opts.practice {
                SequenceConstraints::practice(n_back, trials)
            } else {
                SequenceConstraints::block(n_back, trials)
            }
        }
    };

    if let Some(n_back) = opts.n_back {
        constraints.n_back = n_back;
    }
    if let Some(trials) = opts.trials {
        constraints.n_trials = trials;
    }
    if let Some(seed) = opts.seed {
        constraints.seed = Some(seed);
    }
    Ok(constraints)
}

fn symbols(trials: &[TrialSpec]) -> String {
    trials.iter().map(|t| t.stimulus).collect()
}

fn flags(trials: &[TrialSpec]) -> String {
    trials
        .iter()
        .map(|t| if t.is_target { '1' } else { '0' })
        .collect()
}

fn print_help() {
    println!(
        r#"N-back Sequence Preview

USAGE:
    cargo run -p nback-generator --bin sequence-preview -- [OPTIONS]

OPTIONS:
    --n-back <N>       N of the N-back task (default: 2)
    --trials <N>       Sequence length (default: 10)
    --seed <N>         Random seed for reproducibility (default: OS entropy)
    --practice         Practice constraints: 25% targets, no lures
    --config <FILE>    Load constraints from JSON; other flags override it
    --json             Print trials as JSON
    --help, -h         Print this help message

ENVIRONMENT:
    RUST_LOG           Log filter, e.g. RUST_LOG=nback_generator=debug

EXAMPLES:
    # Preview a 3-back block of 40 trials
    cargo run -p nback-generator --bin sequence-preview -- --n-back 3 --trials 40 --seed 7

    # Same constraints the task would load from a file
    cargo run -p nback-generator --bin sequence-preview -- --config block.json --json
"#
    );
}
