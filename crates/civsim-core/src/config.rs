//! Configuration loading and typed config structures for the civsim
//! faction simulation.
//!
//! The canonical configuration lives in `civsim-config.yaml` at the project
//! root. Every section and field has a default, so an empty file (or no
//! file at all) describes the stock three-faction game.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use civsim_agents::{
    DecisionConfig, FactionConfig, HeuristicEvaluator, PassiveEvaluator, StateEvaluator,
};

use crate::drift::DriftConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `civsim-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, run length, map size).
    #[serde(default)]
    pub world: WorldConfig,

    /// Factions to spawn.
    #[serde(default = "FactionConfig::stock_opponents")]
    pub factions: Vec<FactionConfig>,

    /// Decision-cycle tunables.
    #[serde(default)]
    pub decisions: DecisionConfig,

    /// Relation drift tunables.
    #[serde(default)]
    pub drift: DriftConfig,

    /// Which situation assessment factions use.
    #[serde(default)]
    pub evaluator: EvaluatorKind,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Snapshot output.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            factions: FactionConfig::stock_opponents(),
            decisions: DecisionConfig::default(),
            drift: DriftConfig::default(),
            evaluator: EvaluatorKind::default(),
            logging: LoggingConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for relation drift.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Turns the engine runs before stopping.
    #[serde(default = "default_turns")]
    pub turns: u64,

    /// Map width in hexes.
    #[serde(default = "default_map_size")]
    pub width: i32,

    /// Map height in hexes.
    #[serde(default = "default_map_size")]
    pub height: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            turns: default_turns(),
            width: default_map_size(),
            height: default_map_size(),
        }
    }
}

/// Built-in situation assessments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    /// Never reports anything; factions keep exploring.
    #[default]
    Passive,
    /// Reacts to wars, food surplus and shrinking stocks.
    Heuristic,
}

impl EvaluatorKind {
    /// Instantiate the evaluator.
    pub fn build(self) -> Box<dyn StateEvaluator> {
        match self {
            Self::Passive => Box::new(PassiveEvaluator),
            Self::Heuristic => Box::new(HeuristicEvaluator),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Snapshot output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Where the engine writes the final snapshot, if anywhere.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Civsim".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_turns() -> u64 {
    100
}

const fn default_map_size() -> i32 {
    20
}

fn default_log_level() -> String {
    "info".to_owned()
}
