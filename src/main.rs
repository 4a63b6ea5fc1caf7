use std::{process::ExitCode, time::Instant};

use bonza_layout::{Generator, GeneratorError, Optimization, Parameters};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

/// Lay out a list of words as a Bonza-style crossword
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Words to place, quote multi-word entries ("non sequitur")
    #[arg(required = true)]
    words: Vec<String>,

    /// Seed for reproducible layouts
    #[arg(short, long)]
    seed: Option<u64>,

    /// aggressive, high, standard or none
    #[arg(short, long, default_value = "high")]
    optimization: Optimization,

    /// Look for candidate placements in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Number of shuffles to try before giving up
    #[arg(short, long, default_value_t = 5)]
    attempts: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut parameters = Parameters::new()
        .with_optimization(cli.optimization)
        .with_parallel_candidates(cli.parallel);
    parameters.seed = cli.seed;
    let mut generator = Generator::new(parameters);

    let now = Instant::now();
    for attempt in 1..=cli.attempts.max(1) {
        match generator.place_word_list(&cli.words, true) {
            Ok(placed) => {
                info!(
                    "Placed {} words in {:?} (attempt {})",
                    placed.len(),
                    now.elapsed(),
                    attempt
                );
                print!("{}", generator.layout());
                return ExitCode::SUCCESS;
            }
            Err(e @ GeneratorError::RejectedWords { .. }) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
            Err(e) => info!("Attempt {} failed: {}", attempt, e),
        }
    }

    error!("No layout found after {} attempts", cli.attempts.max(1));
    ExitCode::FAILURE
}
