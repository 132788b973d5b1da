#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Pirate Maze server.

mod config;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use pirate_maze_scheduler::{Config as SchedulerConfig, Scheduler};
use pirate_maze_transport::{Config as TransportConfig, Server};

use config::{Args, ServerConfig};

/// Entry point for the Pirate Maze server.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::resolve(Args::parse())?;

    let document = fs::read_to_string(&config.map)
        .with_context(|| format!("failed to read map {}", config.map.display()))?;
    let layout = pirate_maze_map::parse(&document)
        .with_context(|| format!("invalid map {}", config.map.display()))?;
    log::debug!("maze layout:\n{}", pirate_maze_map::render(&layout));

    let server = Server::bind(
        ("0.0.0.0", config.port),
        TransportConfig::from_millis(config.timeout_ms),
    )
    .context("failed to start the server")?;
    log::info!(
        "listening on {}",
        server.local_addr().context("failed to read the listening address")?
    );

    let (mut inbox, mut outbox) = server.accept().context("failed to accept the player")?;
    let report = Scheduler::new(SchedulerConfig::new(config.seed), layout)
        .run(&mut inbox, &mut outbox)
        .with_context(|| format!("session with {} failed", inbox.peer()))?;

    log::info!(
        "{:?}: score {:?}, {} cycles, {} events delivered",
        report.reason,
        report.score,
        report.cycles,
        report.events_delivered
    );
    Ok(())
}
