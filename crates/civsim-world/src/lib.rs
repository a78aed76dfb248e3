//! Map, building and tech collaborators for the civsim faction simulation.
//!
//! The faction engine only sees the world through three traits in
//! [`authority`]. This crate defines them, holds the static building and
//! tech tables, and ships small reference implementations so the engine can
//! run headless.
//!
//! # Modules
//!
//! - [`authority`] -- [`DistanceProvider`], [`TechAuthority`], and
//!   [`BuildingAuthority`] seams.
//! - [`error`] -- Error types for the reference authorities.
//! - [`hex`] -- [`HexGrid`]: bounded odd-q hex map with distance and
//!   neighbour queries.
//! - [`knowledge`] -- Tech definitions and the per-faction [`TechTree`].
//! - [`structure`] -- Building blueprints and the [`BuildingRegistry`].

pub mod authority;
pub mod error;
pub mod hex;
pub mod knowledge;
pub mod structure;

// Re-export primary types at crate root.
pub use authority::{BuildingAuthority, DistanceProvider, TechAuthority};
pub use error::WorldError;
pub use hex::{HexGrid, hex_distance};
pub use knowledge::{
    TechDefinition, TechEffect, TechEffectKind, TechEffectTarget, TechTree, definition,
    techs_in_epoch,
};
pub use structure::{BuildingBlueprint, BuildingRegistry, PlacedBuilding, blueprint};
