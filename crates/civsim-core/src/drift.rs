//! Relation drift: the per-turn chance that a relation moves one rung.
//!
//! For an ordered pair `(a, b)` the transition probability `p` is the sum
//! of four terms:
//!
//! | Term          | Contribution                                              |
//! |---------------|-----------------------------------------------------------|
//! | Proximity     | `+0.2` when closer than 3 hexes, `-0.1` beyond 8          |
//! | Compatibility | personality matrix value `* 0.3`                          |
//! | Military      | `balance * 0.2` when `abs(balance) > 0.5`                 |
//! | Economic      | `balance * 0.1` when `abs(balance) > 0.5`                 |
//!
//! A transition fires when a draw in `[0, 1)` falls below `abs(p)`. The
//! sign of `p` picks the direction. All constants live in [`DriftConfig`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use civsim_agents::{FactionAgent, compatibility};
use civsim_types::{DiplomaticStatus, HexCoord};
use civsim_world::DistanceProvider;

/// Tunables for relation drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Territories closer than this many hexes are "near" (default: 3).
    pub near_distance: u32,
    /// Added to `p` for near territories (default: 0.2).
    pub near_bonus: f64,
    /// Territories farther than this many hexes are "far" (default: 8).
    pub far_distance: u32,
    /// Added to `p` for far territories (default: -0.1).
    pub far_bonus: f64,
    /// Weight of personality compatibility (default: 0.3).
    pub compatibility_weight: f64,
    /// Minimum `abs(balance)` for a balance term to count (default: 0.5).
    pub balance_threshold: f64,
    /// Weight of military balance (default: 0.2).
    pub military_weight: f64,
    /// Weight of economic balance (default: 0.1).
    pub economic_weight: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            near_distance: 3,
            near_bonus: 0.2,
            far_distance: 8,
            far_bonus: -0.1,
            compatibility_weight: 0.3,
            balance_threshold: 0.5,
            military_weight: 0.2,
            economic_weight: 0.1,
        }
    }
}

/// Relative strength `(a - b) / (a + b)` in `[-1, 1]`; 0 when the sum is 0.
pub fn balance(a: f64, b: f64) -> f64 {
    let total = a + b;
    if total.abs() < f64::EPSILON || !total.is_finite() {
        return 0.0;
    }
    (a - b) / total
}

/// Smallest hex distance between any two owned tiles, or `None` when
/// either territory is empty.
pub fn territory_distance(
    a: &BTreeSet<HexCoord>,
    b: &BTreeSet<HexCoord>,
    provider: &dyn DistanceProvider,
) -> Option<u32> {
    a.iter()
        .flat_map(|ha| b.iter().map(move |hb| provider.distance(*ha, *hb)))
        .min()
}

/// Proximity term for a territory distance. No distance counts as far.
pub fn proximity_term(distance: Option<u32>, config: &DriftConfig) -> f64 {
    match distance {
        Some(d) if d < config.near_distance => config.near_bonus,
        Some(d) if d <= config.far_distance => 0.0,
        _ => config.far_bonus,
    }
}

fn balance_term(balance: f64, weight: f64, config: &DriftConfig) -> f64 {
    if balance.abs() > config.balance_threshold {
        balance * weight
    } else {
        0.0
    }
}

/// Signed transition probability for the ordered pair `(a, b)`.
pub fn transition_probability(
    a: &FactionAgent,
    b: &FactionAgent,
    provider: &dyn DistanceProvider,
    config: &DriftConfig,
) -> f64 {
    let distance = territory_distance(a.territory(), b.territory(), provider);
    let military = balance(a.military_strength(), b.military_strength());
    let economic = balance(a.economic_strength(), b.economic_strength());

    proximity_term(distance, config)
        + compatibility(a.personality(), b.personality()) * config.compatibility_weight
        + balance_term(military, config.military_weight, config)
        + balance_term(economic, config.economic_weight, config)
}

/// The status one rung from `current` in the direction of `probability`.
pub const fn next_status(current: DiplomaticStatus, probability: f64) -> DiplomaticStatus {
    if probability > 0.0 {
        current.improved()
    } else if probability < 0.0 {
        current.worsened()
    } else {
        current
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use civsim_agents::{DecisionConfig, FactionConfig};
    use civsim_world::HexGrid;

    fn agents() -> Vec<FactionAgent> {
        let decisions = DecisionConfig::default();
        FactionConfig::stock_opponents()
            .iter()
            .map(|config| FactionAgent::from_config(config, &decisions).unwrap())
            .collect()
    }

    #[test]
    fn balance_is_antisymmetric_and_safe_at_zero() {
        assert!(balance(0.0, 0.0).abs() < f64::EPSILON);
        assert!((balance(30.0, 10.0) - 0.5).abs() < 1e-12);
        assert!((balance(10.0, 30.0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn proximity_bands() {
        let config = DriftConfig::default();
        assert!((proximity_term(Some(2), &config) - 0.2).abs() < f64::EPSILON);
        assert!(proximity_term(Some(3), &config).abs() < f64::EPSILON);
        assert!(proximity_term(Some(8), &config).abs() < f64::EPSILON);
        assert!((proximity_term(Some(9), &config) + 0.1).abs() < f64::EPSILON);
        assert!((proximity_term(None, &config) + 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_territory_has_no_distance() {
        let grid = HexGrid::new(20, 20);
        let a = BTreeSet::from([HexCoord::new(1, 1)]);
        assert_eq!(territory_distance(&a, &BTreeSet::new(), &grid), None);
        let b = BTreeSet::from([HexCoord::new(9, 9), HexCoord::new(1, 3)]);
        assert_eq!(territory_distance(&a, &b, &grid), Some(2));
    }

    #[test]
    fn stock_opponents_drift_as_expected() {
        let grid = HexGrid::new(20, 20);
        let config = DriftConfig::default();
        let factions = agents();
        let (aggressive, diplomatic) = (&factions[0], &factions[1]);

        // Capitals (5,5) and (10,10) are between the bands, strengths are 0:
        // only compatibility counts, -0.3 * 0.3.
        let p = transition_probability(aggressive, diplomatic, &grid, &config);
        assert!((p + 0.09).abs() < 1e-12, "p = {p}");
        assert_eq!(next_status(DiplomaticStatus::Hostile, p), DiplomaticStatus::War);
    }

    #[test]
    fn next_status_moves_one_rung() {
        assert_eq!(
            next_status(DiplomaticStatus::Neutral, 0.3),
            DiplomaticStatus::Friendly
        );
        assert_eq!(
            next_status(DiplomaticStatus::Allied, 0.3),
            DiplomaticStatus::Allied
        );
        assert_eq!(next_status(DiplomaticStatus::War, -0.3), DiplomaticStatus::War);
        assert_eq!(
            next_status(DiplomaticStatus::Friendly, 0.0),
            DiplomaticStatus::Friendly
        );
    }
}
