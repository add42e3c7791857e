#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Arena Horde session.

mod config;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use arena_horde_system_spawning::{SpawnDiagnostics, SpawnUpgrade};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::{
    config::SessionConfig,
    simulation::{SessionSummary, Simulation},
};

/// Runs a stationary-player session and reports how the horde evolved.
#[derive(Debug, Parser)]
#[command(name = "arena-horde", version)]
struct Args {
    /// TOML file overriding any subset of the default configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed of every random source; overrides `[spawn] rng_seed`.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated session length in milliseconds.
    #[arg(long, default_value_t = 120_000)]
    duration_ms: u64,
    /// Length of one frame in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Spawn upgrade applied before the session starts; may repeat.
    #[arg(long = "upgrade", value_name = "NAME", value_parser = parse_upgrade)]
    upgrades: Vec<SpawnUpgrade>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a SessionSummary,
    diagnostics: &'a SpawnDiagnostics,
}

fn parse_upgrade(name: &str) -> Result<SpawnUpgrade, String> {
    SpawnUpgrade::from_name(name).ok_or_else(|| {
        let known: Vec<_> = SpawnUpgrade::ALL.iter().map(|upgrade| upgrade.name()).collect();
        format!("unknown upgrade '{name}', expected one of: {}", known.join(", "))
    })
}

fn install_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Entry point for the Arena Horde command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    install_logging(&args.log_level)?;

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.spawn.rng_seed = seed;
    }

    let mut simulation =
        Simulation::new(config, &args.upgrades).context("failed to build the session")?;
    let summary = simulation.run(
        Duration::from_millis(args.duration_ms),
        Duration::from_millis(args.tick_ms),
    );
    let diagnostics = simulation.diagnostics();
    simulation.shutdown();

    if args.json {
        let report = Report {
            summary: &summary,
            diagnostics: &diagnostics,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode the report")?
        );
    } else {
        println!(
            "wave {} after {} ms ({} ticks)",
            summary.wave, summary.elapsed_ms, summary.ticks
        );
        println!(
            "spawned {}, killed {} ({} on contact) for {} xp, {} explosions, {} still alive",
            summary.spawned,
            summary.kills,
            summary.contacts,
            summary.xp,
            summary.explosions,
            summary.live_enemies
        );
        println!(
            "player health {:.1} (took {:.1}, stole {:.1}){}",
            summary.player_health,
            summary.damage_taken,
            summary.life_stolen,
            if summary.defeated { ", defeated" } else { "" }
        );
        println!(
            "spawn interval {} ms, count {}, health x{:.2}, damage x{:.2}, time scaling x{:.2}",
            diagnostics.effective_spawn_interval.as_millis(),
            diagnostics.effective_spawn_count,
            diagnostics.health_multiplier,
            diagnostics.damage_multiplier,
            diagnostics.time_scaling
        );
    }
    Ok(())
}
