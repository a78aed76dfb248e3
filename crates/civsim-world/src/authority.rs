//! Narrow interfaces the faction engine uses to talk to the rest of the game.
//!
//! The engine never owns the map, the tech tree or the building layer. It
//! reaches them through these traits, which the host supplies when building
//! the director. Reference implementations live in [`crate::hex`],
//! [`crate::knowledge`] and [`crate::structure`].

use civsim_types::{BuildingType, FactionId, HexCoord, TechType};

use crate::error::WorldError;

/// Hex distance between two tiles.
pub trait DistanceProvider {
    /// Number of hex steps from `a` to `b`.
    fn distance(&self, a: HexCoord, b: HexCoord) -> u32;
}

/// Per-faction research state.
pub trait TechAuthority {
    /// Whether `faction` may start researching `tech` now.
    fn can_research(&self, faction: &FactionId, tech: TechType) -> bool;

    /// Complete `tech` for `faction`.
    fn start_research(&mut self, faction: &FactionId, tech: TechType) -> Result<(), WorldError>;

    /// Whether `faction` has already researched `tech`.
    fn is_tech_researched(&self, faction: &FactionId, tech: TechType) -> bool;
}

/// Building placement on the shared map.
pub trait BuildingAuthority {
    /// Whether `building` may be placed at `location`.
    fn can_place_building(&self, building: BuildingType, location: HexCoord) -> bool;

    /// Place `building` at `location` on behalf of `owner`.
    fn place_building(
        &mut self,
        owner: &FactionId,
        building: BuildingType,
        location: HexCoord,
    ) -> Result<(), WorldError>;
}
