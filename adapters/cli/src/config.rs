//! Server settings gathered from an optional TOML file and the command line.

use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;

/// Command-line arguments of the server.
#[derive(Debug, Parser)]
#[command(name = "pirate-maze", version)]
#[command(about = "Turn-based pirate maze game server for a single remote player")]
pub(crate) struct Args {
    /// Port the server listens on
    #[arg(long)]
    port: Option<u16>,

    /// Seed of the game's random stream
    #[arg(long)]
    seed: Option<u64>,

    /// Command arrival deadline in milliseconds; 0 waits forever
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to the JSON map
    #[arg(long)]
    map: Option<PathBuf>,

    /// Optional TOML file providing defaults for the flags above
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Settings as they may appear in the TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    seed: Option<u64>,
    timeout_ms: Option<u64>,
    map: Option<PathBuf>,
}

/// Fully resolved server settings.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ServerConfig {
    pub(crate) port: u16,
    pub(crate) seed: u64,
    pub(crate) timeout_ms: u64,
    pub(crate) map: PathBuf,
}

impl ServerConfig {
    /// Reads the optional config file and lets the flags override it.
    pub(crate) fn resolve(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => FileConfig::default(),
        };
        Self::merge(file, args)
    }

    fn merge(file: FileConfig, args: Args) -> Result<Self> {
        Ok(Self {
            port: required(args.port.or(file.port), "port", "port")?,
            seed: required(args.seed.or(file.seed), "seed", "seed")?,
            timeout_ms: required(args.timeout.or(file.timeout_ms), "timeout", "timeout_ms")?,
            map: required(args.map.or(file.map), "map", "map")?,
        })
    }
}

fn required<T>(value: Option<T>, flag: &str, key: &str) -> Result<T> {
    value.ok_or_else(|| anyhow!("missing --{flag} (or `{key}` in the config file)"))
}
