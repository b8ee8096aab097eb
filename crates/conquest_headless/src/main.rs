//! Headless match runner binary.
//!
//! # Usage
//!
//! ```bash
//! # Run one match to completion and print a JSON summary
//! cargo run -p conquest_headless -- run --seed 42 --difficulty 3
//!
//! # Verify a seed is deterministic across repeated runs
//! cargo run -p conquest_headless -- verify --seed 42 --runs 5
//! ```
//!
//! Summaries go to stdout as JSON; logs go to stderr.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use conquest_core::game::{Difficulty, GameConfig};
use conquest_headless::runner::{run_to_summary, RunBudget};

#[derive(Parser)]
#[command(name = "conquest_headless")]
#[command(about = "Headless match runner for CI and balance testing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match and print a JSON summary
    Run {
        /// Match seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// AI handicap level, 0 (easiest) to 4 (brutal)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=4))]
        difficulty: u8,

        /// Simulated-time budget in seconds
        #[arg(long, default_value = "3600")]
        max_seconds: f64,

        /// Seconds per tick
        #[arg(long, default_value = "0.05")]
        delta: f64,

        /// Pretty-print the JSON summary
        #[arg(long)]
        pretty: bool,
    },

    /// Run the same seed several times and verify the state hashes match
    Verify {
        /// Match seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// AI handicap level, 0 (easiest) to 4 (brutal)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=4))]
        difficulty: u8,

        /// Number of verification runs
        #[arg(long, default_value = "3")]
        runs: u32,

        /// Simulated-time budget per run in seconds
        #[arg(long, default_value = "300")]
        max_seconds: f64,

        /// Seconds per tick
        #[arg(long, default_value = "0.05")]
        delta: f64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries the JSON summary.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            seed,
            difficulty,
            max_seconds,
            delta,
            pretty,
        } => cmd_run(seed, difficulty, max_seconds, delta, pretty),
        Commands::Verify {
            seed,
            difficulty,
            runs,
            max_seconds,
            delta,
        } => cmd_verify(seed, difficulty, runs, max_seconds, delta),
    }
}

fn config_for(seed: u64, difficulty: u8) -> GameConfig {
    GameConfig::default()
        .with_seed(seed)
        .with_difficulty(Difficulty::from_level(difficulty))
}

fn cmd_run(seed: u64, difficulty: u8, max_seconds: f64, delta: f64, pretty: bool) -> ExitCode {
    let budget = RunBudget { max_seconds, delta };
    match run_to_summary(config_for(seed, difficulty), budget) {
        Ok(summary) => {
            let json = if pretty {
                serde_json::to_string_pretty(&summary)
            } else {
                serde_json::to_string(&summary)
            };
            match json {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    tracing::error!(%err, "failed to serialize summary");
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            tracing::error!(%err, "match creation failed");
            ExitCode::FAILURE
        }
    }
}

fn cmd_verify(seed: u64, difficulty: u8, runs: u32, max_seconds: f64, delta: f64) -> ExitCode {
    let budget = RunBudget { max_seconds, delta };
    let mut hashes = Vec::with_capacity(runs as usize);

    for run in 0..runs {
        match run_to_summary(config_for(seed, difficulty), budget) {
            Ok(summary) => {
                tracing::info!(run, state_hash = summary.state_hash, "run complete");
                hashes.push(summary.state_hash);
            }
            Err(err) => {
                tracing::error!(%err, "match creation failed");
                return ExitCode::FAILURE;
            }
        }
    }

    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    println!(
        "{}",
        serde_json::json!({
            "seed": seed,
            "runs": runs,
            "deterministic": deterministic,
            "hashes": hashes,
        })
    );

    if deterministic {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
