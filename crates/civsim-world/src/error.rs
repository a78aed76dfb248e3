//! Error types for the `civsim-world` crate.

use civsim_types::{BuildingType, FactionId, HexCoord, TechType};

/// Errors returned by the reference world authorities.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The hex lies outside the map.
    #[error("hex {0} is outside the map")]
    OutOfBounds(HexCoord),

    /// The hex already holds a building.
    #[error("hex {location} is occupied by {occupant:?}")]
    SiteOccupied {
        /// The requested hex.
        location: HexCoord,
        /// The building already there.
        occupant: BuildingType,
    },

    /// The tech's prerequisites are not all researched.
    #[error("{faction} cannot research {tech:?}: prerequisites missing")]
    ResearchLocked {
        /// The researching faction.
        faction: FactionId,
        /// The locked tech.
        tech: TechType,
    },

    /// The tech is already researched.
    #[error("{faction} has already researched {tech:?}")]
    AlreadyResearched {
        /// The researching faction.
        faction: FactionId,
        /// The tech.
        tech: TechType,
    },
}
