//! Director, relation drift, configuration and persistence for the civsim
//! faction simulation.
//!
//! This crate owns the turn loop across factions. Per-faction logic lives
//! in `civsim-agents`; this crate decides when it runs, evolves relations
//! between factions, and triggers diplomatic events.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `civsim-config.yaml` into
//!   strongly-typed structs.
//! - [`director`] -- [`FactionDirector`], its builder, and the per-turn
//!   update.
//! - [`drift`] -- Relation transition probabilities ([`DriftConfig`]).
//! - [`persist`] -- JSON snapshots with full validation on restore.
//! - [`random`] -- [`RandomSource`] with seeded and scripted draws.

pub mod config;
pub mod director;
pub mod drift;
pub mod persist;
pub mod random;

pub use config::{ConfigError, EvaluatorKind, SimulationConfig};
pub use director::{
    ChangeCause, DecisionRecord, DirectorError, FactionDirector, FactionDirectorBuilder,
    RelationChange, TurnSummary,
};
pub use drift::DriftConfig;
pub use persist::{DirectorSnapshot, PersistError};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
