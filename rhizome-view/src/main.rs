//! Application entry point for the root-growth game window.
//!
//! This binary parses the command line, installs logging and hands the
//! window over to [`Viewer`] from the `viewer` module.

mod scene;
mod viewer;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rhizome_core::GameConfig;
use tracing::info;

use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "rhizome-view", version, about = "Grow a root system through the soil")]
struct Args {
    /// JSON file with game tunables; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible session.
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }
    Ok(config)
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the window runs to completion.
/// - `Err` if the configuration is invalid or eframe fails to start.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;
    info!(seed = ?config.rng_seed, "starting rhizome viewer");

    let viewer = Viewer::new(config).context("invalid game configuration")?;
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Rhizome",
        options,
        Box::new(move |_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| anyhow!("window failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_flag_overrides_config() {
        let args = Args::parse_from(["rhizome-view", "--seed", "42"]);
        let config = load_config(&args).expect("default config");
        assert_eq!(config.rng_seed, Some(42));
        assert!(config.start_paused);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = Args::parse_from(["rhizome-view", "--config", "/nonexistent/rhizome.json"]);
        assert!(load_config(&args).is_err());
    }
}
