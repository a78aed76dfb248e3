//! Tunables for faction decision-making and faction creation.
//!
//! [`DecisionConfig`] bundles every threshold and rate used by the agent's
//! turn so callers (director, tests) can override defaults. [`FactionConfig`]
//! describes one faction to spawn. Both deserialize from the `decisions`
//! and `factions` keys of `civsim-config.yaml`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use civsim_types::{FactionId, FactionTraits, HexCoord, Personality, ResourceKind};

/// Configuration for the per-turn decision cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Turns between decision cycles (default: 3).
    pub action_cooldown: u64,

    /// Minimum expected benefit for a building candidate (default: 5).
    pub build_benefit_threshold: f64,

    /// Minimum expected benefit for a research candidate (default: 5).
    pub research_benefit_threshold: f64,

    /// Minimum expected benefit for a diplomacy candidate (default: 3).
    pub diplomacy_benefit_threshold: f64,

    /// Fraction of food surplus converted into new population (default: 0.1).
    pub growth_rate: f64,

    /// Fraction of tech points converted into research progress (default: 0.1).
    pub research_rate: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            action_cooldown: 3,
            build_benefit_threshold: 5.0,
            research_benefit_threshold: 5.0,
            diplomacy_benefit_threshold: 3.0,
            growth_rate: 0.1,
            research_rate: 0.1,
        }
    }
}

/// Description of a faction to spawn at simulation start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionConfig {
    /// Stable faction key.
    pub id: FactionId,

    /// Display name.
    pub name: String,

    /// Behavioural archetype.
    pub personality: Personality,

    /// The single hex the faction starts with.
    pub starting_position: HexCoord,

    /// Opening population (default: 10).
    #[serde(default = "default_starting_population")]
    pub starting_population: u64,

    /// Behavioural weights.
    #[serde(default)]
    pub traits: FactionTraits,

    /// Overrides for opening stock amounts; unlisted resources keep the
    /// standard opening ledger.
    #[serde(default)]
    pub starting_resources: BTreeMap<ResourceKind, Decimal>,

    /// Opening military strength (default: 0).
    #[serde(default)]
    pub military_strength: f64,

    /// Opening economic strength (default: 0).
    #[serde(default)]
    pub economic_strength: f64,
}

const fn default_starting_population() -> u64 {
    10
}

impl FactionConfig {
    /// The three stock opponents: an aggressive empire, a diplomatic
    /// federation and an isolationist kingdom.
    pub fn stock_opponents() -> Vec<Self> {
        vec![
            Self::stock(
                "ai1",
                "The Aggressive Empire",
                Personality::Aggressive,
                HexCoord::new(5, 5),
                FactionTraits {
                    military_aggression: 0.8,
                    economic_focus: 0.4,
                    research_focus: 0.3,
                    diplomatic_tendency: 0.2,
                },
            ),
            Self::stock(
                "ai2",
                "The Diplomatic Federation",
                Personality::Diplomatic,
                HexCoord::new(10, 10),
                FactionTraits {
                    military_aggression: 0.3,
                    economic_focus: 0.5,
                    research_focus: 0.4,
                    diplomatic_tendency: 0.8,
                },
            ),
            Self::stock(
                "ai3",
                "The Isolationist Kingdom",
                Personality::Isolationist,
                HexCoord::new(15, 15),
                FactionTraits {
                    military_aggression: 0.4,
                    economic_focus: 0.6,
                    research_focus: 0.5,
                    diplomatic_tendency: 0.1,
                },
            ),
        ]
    }

    fn stock(
        id: &str,
        name: &str,
        personality: Personality,
        starting_position: HexCoord,
        traits: FactionTraits,
    ) -> Self {
        Self {
            id: FactionId::new(id),
            name: name.to_owned(),
            personality,
            starting_position,
            starting_population: default_starting_population(),
            traits,
            starting_resources: BTreeMap::new(),
            military_strength: 0.0,
            economic_strength: 0.0,
        }
    }
}
