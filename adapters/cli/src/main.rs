#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted heist and reports the outcome.

mod render;
mod runner;
mod scenario;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    runner::{Outcome, Summary},
    scenario::Scenario,
};

/// Plays a scripted heist against the guard simulation.
#[derive(Debug, Parser)]
#[command(name = "heist", version)]
#[command(about = "Run a scripted heist through the guard simulation")]
struct Args {
    /// Scenario file to play instead of the bundled vault.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Maximum number of ticks before the run is abandoned.
    #[arg(long, default_value_t = 3_000)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 20)]
    tick_ms: u64,
    /// Print the final frame of the level.
    #[arg(long)]
    show_frame: bool,
}

/// Entry point for the Heist command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be positive");

    let scenario = match &args.scenario {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Scenario::from_toml_str(&source)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Scenario::from_toml_str(scenario::BUNDLED)?,
    };

    info!(ticks = args.ticks, tick_ms = args.tick_ms, "starting heist");
    let tick = Duration::from_millis(args.tick_ms);
    let (world, summary) = runner::run(&scenario, args.ticks, tick)?;

    if args.show_frame {
        for row in render::frame(&world, summary.player) {
            println!("{row}");
        }
        println!();
    }
    report(&summary);
    Ok(())
}

fn report(summary: &Summary) {
    match summary.outcome {
        Outcome::Escaped => println!("escaped after {} ticks", summary.ticks),
        Outcome::Arrested { guard, reason } => println!(
            "arrested by guard {} after {} ticks ({reason:?})",
            guard.get(),
            summary.ticks
        ),
        Outcome::OutOfTime => println!("still inside after {} ticks", summary.ticks),
    }
    println!("loot: {}", summary.loot);
    println!(
        "captures: {}, bribes: {} costing {}",
        summary.captures, summary.bribes, summary.bribe_spent
    );
    for guard in &summary.guards {
        println!(
            "guard {}: {:?} at ({}, {}) facing {:?}",
            guard.id.get(),
            guard.mode,
            guard.position.x(),
            guard.position.y(),
            guard.facing
        );
    }
}
