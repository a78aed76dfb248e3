//! Tech definitions and the reference per-faction tech tree.
//!
//! The tech table is a small DAG: each [`TechDefinition`] names the techs
//! that must be researched first. [`TechTree`] tracks which techs each
//! faction has completed and gates research on prerequisites.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use civsim_types::{Epoch, FactionId, TechType};

use crate::authority::TechAuthority;
use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// What a tech's effect acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechEffectKind {
    /// Raises resource production.
    Production,
    /// Raises population.
    Population,
    /// Unlocks a unit or building.
    Unlock,
}

/// The specific target of a tech effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechEffectTarget {
    /// Wood production.
    Wood,
    /// Stone production.
    Stone,
    /// Food production.
    Food,
    /// Metal production.
    Metal,
    /// Fuel production.
    Fuel,
    /// Every resource.
    All,
    /// Population growth.
    Growth,
    /// Population in space.
    Space,
    /// Rocket units.
    Rocket,
    /// The spaceport building.
    Spaceport,
}

/// One effect granted by a tech.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechEffect {
    /// Effect category.
    pub kind: TechEffectKind,
    /// Effect target.
    pub target: TechEffectTarget,
    /// Multiplier (ignored for unlocks).
    pub value: f64,
}

/// Static description of a tech.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechDefinition {
    /// The tech.
    pub tech: TechType,
    /// Epoch the tech belongs to.
    pub epoch: Epoch,
    /// Research cost in tech points.
    pub cost: u32,
    /// Techs that must be researched first.
    pub prerequisites: &'static [TechType],
    /// Effects granted once researched.
    pub effects: &'static [TechEffect],
}

/// Builds a [`TechEffect`] literal usable inside promoted slices.
macro_rules! effect {
    ($kind:ident, $target:ident, $value:expr) => {
        TechEffect {
            kind: TechEffectKind::$kind,
            target: TechEffectTarget::$target,
            value: $value,
        }
    };
}

const fn def(
    tech: TechType,
    epoch: Epoch,
    cost: u32,
    prerequisites: &'static [TechType],
    effects: &'static [TechEffect],
) -> TechDefinition {
    TechDefinition {
        tech,
        epoch,
        cost,
        prerequisites,
        effects,
    }
}

/// Look up the definition of `tech`.
pub const fn definition(tech: TechType) -> TechDefinition {
    use TechType as Tk;

    match tech {
        // ---- Tribal ----
        Tk::BasicTools => def(tech, Epoch::Tribal, 50, &[], &[effect!(Production, Wood, 1.2)]),
        Tk::StoneWorking => def(
            tech,
            Epoch::Tribal,
            100,
            &[Tk::BasicTools],
            &[effect!(Production, Stone, 1.2)],
        ),
        Tk::BasicShelter => def(
            tech,
            Epoch::Tribal,
            150,
            &[Tk::BasicTools],
            &[effect!(Population, Growth, 1.2)],
        ),

        // ---- Agricultural ----
        Tk::Agriculture => def(
            tech,
            Epoch::Agricultural,
            200,
            &[Tk::BasicTools],
            &[effect!(Production, Food, 1.5)],
        ),
        Tk::Irrigation => def(
            tech,
            Epoch::Agricultural,
            250,
            &[Tk::Agriculture],
            &[effect!(Production, Food, 1.3)],
        ),
        Tk::AnimalHusbandry => def(
            tech,
            Epoch::Agricultural,
            300,
            &[Tk::Agriculture],
            &[effect!(Production, Food, 1.4)],
        ),

        // ---- Industrial ----
        Tk::Metallurgy => def(
            tech,
            Epoch::Industrial,
            400,
            &[Tk::StoneWorking],
            &[effect!(Production, Metal, 1.5)],
        ),
        Tk::SteamPower => def(
            tech,
            Epoch::Industrial,
            450,
            &[Tk::Metallurgy],
            &[effect!(Production, All, 1.3)],
        ),
        Tk::Combustion => def(
            tech,
            Epoch::Industrial,
            500,
            &[Tk::SteamPower],
            &[effect!(Production, Fuel, 1.5)],
        ),

        // ---- Space age ----
        Tk::Rocketry => def(
            tech,
            Epoch::SpaceAge,
            600,
            &[Tk::Combustion],
            &[effect!(Unlock, Rocket, 1.0)],
        ),
        Tk::SpaceTech => def(
            tech,
            Epoch::SpaceAge,
            800,
            &[Tk::Rocketry],
            &[effect!(Unlock, Spaceport, 1.0)],
        ),
        Tk::LifeSupport => def(
            tech,
            Epoch::SpaceAge,
            700,
            &[Tk::Rocketry],
            &[effect!(Population, Space, 1.2)],
        ),
    }
}

/// Every tech belonging to `epoch`.
pub fn techs_in_epoch(epoch: Epoch) -> impl Iterator<Item = TechType> {
    TechType::ALL
        .into_iter()
        .filter(move |tech| definition(*tech).epoch == epoch)
}

// ---------------------------------------------------------------------------
// Tech tree
// ---------------------------------------------------------------------------

/// Reference [`TechAuthority`]: research completes immediately once its
/// prerequisites are met.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechTree {
    researched: BTreeMap<FactionId, BTreeSet<TechType>>,
}

impl TechTree {
    /// A tree in which no faction has researched anything.
    pub const fn new() -> Self {
        Self {
            researched: BTreeMap::new(),
        }
    }

    /// Techs completed by `faction`.
    pub fn researched_by(&self, faction: &FactionId) -> impl Iterator<Item = TechType> + '_ {
        self.researched
            .get(faction)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    fn prerequisites_met(&self, faction: &FactionId, tech: TechType) -> bool {
        definition(tech)
            .prerequisites
            .iter()
            .all(|pre| self.is_tech_researched(faction, *pre))
    }
}

impl TechAuthority for TechTree {
    fn can_research(&self, faction: &FactionId, tech: TechType) -> bool {
        !self.is_tech_researched(faction, tech) && self.prerequisites_met(faction, tech)
    }

    fn start_research(&mut self, faction: &FactionId, tech: TechType) -> Result<(), WorldError> {
        if self.is_tech_researched(faction, tech) {
            return Err(WorldError::AlreadyResearched {
                faction: faction.clone(),
                tech,
            });
        }
        if !self.prerequisites_met(faction, tech) {
            return Err(WorldError::ResearchLocked {
                faction: faction.clone(),
                tech,
            });
        }
        self.researched
            .entry(faction.clone())
            .or_default()
            .insert(tech);
        tracing::info!(faction = %faction, ?tech, "tech researched");
        Ok(())
    }

    fn is_tech_researched(&self, faction: &FactionId, tech: TechType) -> bool {
        self.researched
            .get(faction)
            .is_some_and(|set| set.contains(&tech))
    }
}
