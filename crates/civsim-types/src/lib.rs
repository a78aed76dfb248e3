//! Shared type definitions for the civsim faction simulation.
//!
//! This crate is the single source of truth for the identifiers, enums and
//! small value types used across the workspace. Types flow downstream to
//! `TypeScript` via `ts-rs` for the faction and diplomacy panels.
//!
//! # Modules
//!
//! - [`ids`] -- Faction keys and UUID event identifiers
//! - [`enums`] -- Resources, personalities, states, epochs, statuses, events
//! - [`structs`] -- Hex coordinates, faction traits, and timed effects

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{
    BehaviorState, BuildingType, DecisionKind, DiplomaticEventType, DiplomaticStatus, EffectType,
    Epoch, Personality, ResourceKind, TechType,
};
pub use ids::{EventId, FactionId};
pub use structs::{Effect, FactionTraits, HexCoord};
