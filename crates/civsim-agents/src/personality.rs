//! Personality tables: scoring multipliers and pairwise compatibility.
//!
//! | Personality  | Building boost            | Tech boost             | Diplomacy |
//! |--------------|---------------------------|------------------------|-----------|
//! | Aggressive   | `BasicDefense` x1.5       | production/metal x1.5  | x0.8      |
//! | Diplomatic   | `Workshop`, `ResearchLab` x1.3 | population/growth x1.3 | x1.5 |
//! | Isolationist | `Farm`, `Mine` x1.4       | production/all x1.4    | x0.6      |
//! | Trader       | `Factory`, `Workshop` x1.3 | production/all x1.3   | x1.2      |

use civsim_types::{BehaviorState, BuildingType, FactionTraits, Personality};
use civsim_world::{TechEffect, TechEffectKind, TechEffectTarget};

/// Symmetric affinity between personalities, in [`Personality::ALL`] order.
const COMPATIBILITY: [[f64; 4]; 4] = [
    [-0.5, -0.3, -0.2, -0.1],
    [-0.3, 0.5, 0.2, 0.4],
    [-0.2, 0.2, 0.3, 0.1],
    [-0.1, 0.4, 0.1, 0.3],
];

const fn matrix_index(personality: Personality) -> usize {
    match personality {
        Personality::Aggressive => 0,
        Personality::Diplomatic => 1,
        Personality::Isolationist => 2,
        Personality::Trader => 3,
    }
}

/// Affinity between two personalities, in `[-0.5, 0.5]`.
pub fn compatibility(a: Personality, b: Personality) -> f64 {
    COMPATIBILITY
        .get(matrix_index(a))
        .and_then(|row| row.get(matrix_index(b)))
        .copied()
        .unwrap_or(0.0)
}

/// Benefit multiplier a personality applies to a building candidate.
pub const fn building_multiplier(personality: Personality, building: BuildingType) -> f64 {
    match (personality, building) {
        (Personality::Aggressive, BuildingType::BasicDefense) => 1.5,
        (Personality::Diplomatic, BuildingType::Workshop | BuildingType::ResearchLab)
        | (Personality::Trader, BuildingType::Factory | BuildingType::Workshop) => 1.3,
        (Personality::Isolationist, BuildingType::Farm | BuildingType::Mine) => 1.4,
        _ => 1.0,
    }
}

/// Benefit multiplier a personality applies for one effect of a tech.
pub const fn tech_multiplier(personality: Personality, effect: &TechEffect) -> f64 {
    use TechEffectKind::{Population, Production};
    use TechEffectTarget::{All, Growth, Metal};

    match (personality, effect.kind, effect.target) {
        (Personality::Aggressive, Production, Metal) => 1.5,
        (Personality::Diplomatic, Population, Growth) | (Personality::Trader, Production, All) => {
            1.3
        }
        (Personality::Isolationist, Production, All) => 1.4,
        _ => 1.0,
    }
}

/// Benefit multiplier a personality applies to every diplomacy candidate.
pub const fn diplomacy_multiplier(personality: Personality) -> f64 {
    match personality {
        Personality::Aggressive => 0.8,
        Personality::Diplomatic => 1.5,
        Personality::Isolationist => 0.6,
        Personality::Trader => 1.2,
    }
}

/// Raw priority of a diplomatic overture before rounding and clamping.
///
/// Starts at 5, shifted by the personality's trait weight and the
/// faction's current behaviour state.
pub fn diplomacy_priority(
    personality: Personality,
    traits: &FactionTraits,
    state: BehaviorState,
) -> f64 {
    let personality_shift = match personality {
        Personality::Aggressive => traits.military_aggression * 2.0,
        Personality::Diplomatic => traits.diplomatic_tendency * 3.0,
        Personality::Isolationist => -traits.diplomatic_tendency * 2.0,
        Personality::Trader => traits.economic_focus,
    };
    let state_shift = match state {
        BehaviorState::Exploring | BehaviorState::Developing => 1.0,
        BehaviorState::Expanding => 2.0,
        BehaviorState::Defending => -1.0,
        BehaviorState::Trading | BehaviorState::Conflict => 0.0,
    };
    5.0 + personality_shift + state_shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_is_symmetric() {
        for a in Personality::ALL {
            for b in Personality::ALL {
                assert!(
                    (compatibility(a, b) - compatibility(b, a)).abs() < f64::EPSILON,
                    "{a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn aggressive_factions_dislike_each_other_most() {
        let worst = Personality::ALL
            .iter()
            .flat_map(|a| Personality::ALL.iter().map(move |b| compatibility(*a, *b)))
            .fold(f64::INFINITY, f64::min);
        assert!(
            (compatibility(Personality::Aggressive, Personality::Aggressive) - worst).abs()
                < f64::EPSILON
        );
        assert!(compatibility(Personality::Diplomatic, Personality::Diplomatic) > 0.0);
    }

    #[test]
    fn building_multipliers_match_table() {
        assert!(
            (building_multiplier(Personality::Aggressive, BuildingType::BasicDefense) - 1.5).abs()
                < f64::EPSILON
        );
        assert!(
            (building_multiplier(Personality::Trader, BuildingType::Workshop) - 1.3).abs()
                < f64::EPSILON
        );
        assert!(
            (building_multiplier(Personality::Isolationist, BuildingType::Hut) - 1.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn diplomatic_faction_prioritizes_diplomacy() {
        let traits = FactionTraits {
            diplomatic_tendency: 0.8,
            ..FactionTraits::default()
        };
        let diplomatic =
            diplomacy_priority(Personality::Diplomatic, &traits, BehaviorState::Exploring);
        let isolationist =
            diplomacy_priority(Personality::Isolationist, &traits, BehaviorState::Exploring);
        // 5 + 0.8 * 3 + 1
        assert!((diplomatic - 8.4).abs() < 1e-9);
        // 5 - 0.8 * 2 + 1
        assert!((isolationist - 4.4).abs() < 1e-9);
    }
}
