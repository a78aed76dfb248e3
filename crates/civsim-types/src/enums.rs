//! Enumeration types for the faction simulation.
//!
//! Ordered enums ([`Epoch`], [`DiplomaticStatus`]) derive `Ord` so that
//! "at or before this epoch" and "one rung better" are plain comparisons.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A resource tracked in every faction's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Feeds the population; also the currency of diplomatic overtures.
    Food,
    /// Basic construction material.
    Wood,
    /// Basic construction material.
    Stone,
    /// Industrial material, required by advanced buildings.
    Metal,
    /// Industrial energy source.
    Fuel,
    /// Accumulated research output; drives tech progress.
    TechPoints,
    /// Currency used for buildings and diplomatic events.
    Gold,
}

impl ResourceKind {
    /// Every resource kind, in ledger order.
    pub const ALL: [Self; 7] = [
        Self::Food,
        Self::Wood,
        Self::Stone,
        Self::Metal,
        Self::Fuel,
        Self::TechPoints,
        Self::Gold,
    ];
}

// ---------------------------------------------------------------------------
// Faction character
// ---------------------------------------------------------------------------

/// Fixed behavioural archetype of a faction.
///
/// Chosen at creation and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Personality {
    /// Favours defences and metal; distrusts everyone.
    Aggressive,
    /// Favours research buildings, growth, and diplomacy.
    Diplomatic,
    /// Favours farms and mines; avoids diplomacy.
    Isolationist,
    /// Favours production and trade.
    Trader,
}

impl Personality {
    /// Every personality, in compatibility-matrix order.
    pub const ALL: [Self; 4] = [
        Self::Aggressive,
        Self::Diplomatic,
        Self::Isolationist,
        Self::Trader,
    ];
}

/// Current behavioural mode of a faction, re-evaluated when its action
/// cooldown elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BehaviorState {
    /// No threats, opportunities or needs; builds basic shelter and explores.
    Exploring,
    /// An opportunity was found; claims land and builds production.
    Expanding,
    /// A resource need was found; invests in research infrastructure.
    Developing,
    /// Reserved for trade-focused behaviour; yields no candidates yet.
    Trading,
    /// Reserved for active conflict; yields no candidates yet.
    Conflict,
    /// A threat was found; prioritises defences.
    Defending,
}

/// Technological epoch. Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Epoch {
    /// Starting epoch.
    Tribal,
    /// Settled farming communities.
    Agricultural,
    /// Mechanised production.
    Industrial,
    /// Orbital technology.
    SpaceAge,
}

impl Epoch {
    /// Every epoch, earliest first.
    pub const ALL: [Self; 4] = [
        Self::Tribal,
        Self::Agricultural,
        Self::Industrial,
        Self::SpaceAge,
    ];

    /// The epoch after this one, or `None` at the last epoch.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Tribal => Some(Self::Agricultural),
            Self::Agricultural => Some(Self::Industrial),
            Self::Industrial => Some(Self::SpaceAge),
            Self::SpaceAge => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Diplomacy
// ---------------------------------------------------------------------------

/// Diplomatic status between two factions.
///
/// Variants are declared from worst to best, so `Ord` follows the
/// status ladder `War < Hostile < Neutral < Friendly < Allied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DiplomaticStatus {
    /// Open conflict.
    War,
    /// Mutual distrust.
    Hostile,
    /// No standing arrangement.
    Neutral,
    /// Cordial relations.
    Friendly,
    /// Formal alliance.
    Allied,
}

impl DiplomaticStatus {
    /// One rung up the ladder. `Allied` stays `Allied`.
    pub const fn improved(self) -> Self {
        match self {
            Self::War => Self::Hostile,
            Self::Hostile => Self::Neutral,
            Self::Neutral => Self::Friendly,
            Self::Friendly | Self::Allied => Self::Allied,
        }
    }

    /// One rung down the ladder. `War` stays `War`.
    pub const fn worsened(self) -> Self {
        match self {
            Self::War | Self::Hostile => Self::War,
            Self::Neutral => Self::Hostile,
            Self::Friendly => Self::Neutral,
            Self::Allied => Self::Friendly,
        }
    }
}

/// Category of a diplomatic event template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DiplomaticEventType {
    /// Establish trade routes.
    TradeAgreement,
    /// Share research findings.
    ResearchPact,
    /// Mutual defence pact.
    MilitaryAlliance,
    /// Share resources and production capabilities.
    ResourceSharing,
    /// End hostilities.
    PeaceTreaty,
    /// Agree to keep the peace.
    NonAggressionPact,
    /// Exchange cultural knowledge.
    CulturalExchange,
    /// Collaborate on exploration.
    JointExploration,
}

impl DiplomaticEventType {
    /// Every event type.
    pub const ALL: [Self; 8] = [
        Self::TradeAgreement,
        Self::ResearchPact,
        Self::MilitaryAlliance,
        Self::ResourceSharing,
        Self::PeaceTreaty,
        Self::NonAggressionPact,
        Self::CulturalExchange,
        Self::JointExploration,
    ];

    /// Whether an event of this type may be created between factions
    /// currently at `status`.
    pub const fn is_valid_for(self, status: DiplomaticStatus) -> bool {
        use DiplomaticStatus::{Allied, Friendly, Hostile, Neutral, War};
        match self {
            Self::TradeAgreement | Self::JointExploration => matches!(status, Neutral | Friendly),
            Self::ResearchPact | Self::CulturalExchange => matches!(status, Friendly),
            Self::MilitaryAlliance | Self::ResourceSharing => matches!(status, Allied),
            Self::PeaceTreaty => matches!(status, War | Hostile),
            Self::NonAggressionPact => matches!(status, Neutral),
        }
    }
}

/// The scalar a diplomatic effect modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EffectType {
    /// Multiplies every resource stock's production multiplier.
    ResourceProduction,
    /// Multiplies research speed.
    ResearchSpeed,
    /// Multiplies military strength.
    MilitaryStrength,
    /// Multiplies economic strength.
    EconomicStrength,
    /// Multiplies population growth.
    PopulationGrowth,
    /// Multiplies exploration speed.
    ExplorationSpeed,
}

// ---------------------------------------------------------------------------
// Decisions, buildings and techs
// ---------------------------------------------------------------------------

/// Category of a candidate action generated by a faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DecisionKind {
    /// Place a building.
    Build,
    /// Select a research target.
    Research,
    /// Improve relations with another faction.
    Diplomacy,
    /// Military action (no candidates are generated yet).
    Military,
    /// Economic action (no candidates are generated yet).
    Economy,
}

/// A building a faction can place on one of its hexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BuildingType {
    /// Tribal shelter.
    Hut,
    /// Tribal food source.
    Campfire,
    /// Tribal fortification.
    BasicDefense,
    /// Agricultural food production.
    Farm,
    /// Agricultural storage.
    Barn,
    /// Agricultural stone and gold extraction.
    Mine,
    /// Agricultural research output.
    Workshop,
    /// Industrial metal production.
    Factory,
    /// Industrial extraction.
    AdvancedMine,
    /// Industrial research output.
    PowerPlant,
    /// Space-age research output.
    ResearchLab,
    /// Space-age launch site.
    Spaceport,
    /// Space-age research output.
    EnergyGrid,
}

impl BuildingType {
    /// Every building type, in blueprint-table order.
    pub const ALL: [Self; 13] = [
        Self::Hut,
        Self::Campfire,
        Self::BasicDefense,
        Self::Farm,
        Self::Barn,
        Self::Mine,
        Self::Workshop,
        Self::Factory,
        Self::AdvancedMine,
        Self::PowerPlant,
        Self::ResearchLab,
        Self::Spaceport,
        Self::EnergyGrid,
    ];
}

/// A researchable technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TechType {
    /// Tribal: better wood gathering.
    BasicTools,
    /// Tribal: better stone gathering.
    StoneWorking,
    /// Tribal: faster population growth.
    BasicShelter,
    /// Agricultural: better food production.
    Agriculture,
    /// Agricultural: better food production.
    Irrigation,
    /// Agricultural: better food production.
    AnimalHusbandry,
    /// Industrial: metal production.
    Metallurgy,
    /// Industrial: all production.
    SteamPower,
    /// Industrial: fuel production.
    Combustion,
    /// Space age: unlocks rockets.
    Rocketry,
    /// Space age: unlocks the spaceport.
    SpaceTech,
    /// Space age: population in space.
    LifeSupport,
}

impl TechType {
    /// Every tech, in definition-table order.
    pub const ALL: [Self; 12] = [
        Self::BasicTools,
        Self::StoneWorking,
        Self::BasicShelter,
        Self::Agriculture,
        Self::Irrigation,
        Self::AnimalHusbandry,
        Self::Metallurgy,
        Self::SteamPower,
        Self::Combustion,
        Self::Rocketry,
        Self::SpaceTech,
        Self::LifeSupport,
    ];
}
