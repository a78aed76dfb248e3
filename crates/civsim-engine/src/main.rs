//! Engine binary for the civsim faction simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `CIVSIM_CONFIG` or `civsim-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Assemble the faction director from the config
//! 4. Run the configured number of turns
//! 5. Log the final standings and write a snapshot if configured

mod error;
mod report;

use std::path::{Path, PathBuf};

use civsim_core::{FactionDirector, FactionDirectorBuilder, SimulationConfig};
use civsim_core::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const DEFAULT_CONFIG_PATH: &str = "civsim-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, director assembly or snapshot
/// output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. `RUST_LOG` overrides the config.
    init_logging(&config.logging);
    info!("civsim-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        turns = config.world.turns,
        factions = config.factions.len(),
        evaluator = ?config.evaluator,
        "Simulation configured"
    );

    // 3. Assemble the director.
    let mut director = FactionDirectorBuilder::from_config(&config)
        .build()
        .map_err(EngineError::from)?;

    // 4. Run the turn loop.
    for _ in 0..config.world.turns {
        let summary = director.update();
        report::log_turn(&summary);
    }

    // 5. Report and persist.
    report::log_run_end(&director);
    if let Some(path) = &config.persistence.snapshot_path {
        write_snapshot(&director, path)?;
        info!(path = %path.display(), "Snapshot written");
    }

    info!(turns = director.turn(), "civsim-engine shutdown complete");
    Ok(())
}

/// Load the simulation configuration.
///
/// An explicit `CIVSIM_CONFIG` path must exist. Without it the engine
/// reads `civsim-config.yaml` from the working directory, falling back to
/// defaults when that file is absent. Returns the path actually read.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(explicit) = std::env::var_os("CIVSIM_CONFIG") {
        let path = PathBuf::from(explicit);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn write_snapshot(director: &FactionDirector, path: &Path) -> Result<(), EngineError> {
    let blob = director.serialize()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| EngineError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, blob).map_err(|source| EngineError::Write {
        path: path.to_path_buf(),
        source,
    })
}
