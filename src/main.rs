use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use edgesep::{compute_edge_separator, read_graph, Config, Error, GuessCutType, MatchingStrategy};

/// Compute a balanced 2-way edge separator of a sparse graph.
#[derive(Parser)]
#[command(name = "edgesep", version)]
struct Cli {
    /// Input matrix in Matrix Market coordinate format
    input: PathBuf,

    /// PRNG seed for the random initial guess
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Matching strategy for coarsening
    #[arg(long, value_enum, default_value_t = MatchingArg::HemDavisPa)]
    matching: MatchingArg,

    /// Initial guess strategy on the coarsest graph
    #[arg(long, value_enum, default_value_t = GuessArg::Pseudoperipheral)]
    guess: GuessArg,

    /// Desired fraction of node weight in side 1, the target side
    #[arg(long, default_value_t = 0.5)]
    target_split: f64,

    /// Allowed deviation from the target split
    #[arg(long, default_value_t = 0.01)]
    tolerance: f64,

    /// Refinement passes per level
    #[arg(long, default_value_t = 1)]
    dances: usize,

    /// Run the expensive internal consistency checks
    #[arg(long)]
    check: bool,

    /// Log engine progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum MatchingArg {
    Random,
    Hem,
    HemSr,
    HemSrDeg,
    HemPa,
    HemDavisPa,
}

#[derive(Clone, Copy, ValueEnum)]
enum GuessArg {
    Qp,
    Random,
    NaturalOrder,
    Pseudoperipheral,
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return code;
        }
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config {
        random_seed: cli.seed,
        matching_strategy: match cli.matching {
            MatchingArg::Random => MatchingStrategy::Random,
            MatchingArg::Hem => MatchingStrategy::Hem,
            MatchingArg::HemSr => MatchingStrategy::HemSr,
            MatchingArg::HemSrDeg => MatchingStrategy::HemSrDeg,
            MatchingArg::HemPa => MatchingStrategy::HemPa,
            MatchingArg::HemDavisPa => MatchingStrategy::HemDavisPa,
        },
        guess_cut_type: match cli.guess {
            GuessArg::Qp => GuessCutType::Qp,
            GuessArg::Random => GuessCutType::Random,
            GuessArg::NaturalOrder => GuessCutType::NaturalOrder,
            GuessArg::Pseudoperipheral => GuessCutType::PseudoperipheralFast,
        },
        target_split: cli.target_split,
        tolerance: cli.tolerance,
        num_dances: cli.dances,
        do_expensive_checks: cli.check,
        ..Config::default()
    };

    let read_start = Instant::now();
    let graph = match read_graph(&cli.input) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("edgesep: {err}");
            return exit_code(&err);
        }
    };
    info!(
        n = graph.n,
        nz = graph.nz(),
        elapsed_ms = read_start.elapsed().as_millis() as u64,
        "graph loaded"
    );

    let solve_start = Instant::now();
    let partition = match compute_edge_separator(&graph, &config) {
        Ok(partition) => partition,
        Err(err) => {
            eprintln!("edgesep: {err}");
            return exit_code(&err);
        }
    };
    let elapsed = solve_start.elapsed();

    println!("vertices:   {}", graph.n);
    println!("edges:      {}", graph.nz() / 2);
    println!("cut cost:   {:.4}", partition.cut_cost);
    println!("imbalance:  {:.2}%", 100.0 * partition.imbalance);
    println!("time:       {:.1}ms", elapsed.as_secs_f64() * 1000.0);
    0
}

fn exit_code(err: &Error) -> i32 {
    match err {
        Error::Io(_) | Error::Parse { .. } | Error::InvalidInput { .. } => 1,
        Error::OutOfMemory { .. } => 2,
        Error::InvariantViolation { .. } => 3,
    }
}
