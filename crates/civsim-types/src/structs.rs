//! Small value structs shared across the workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EffectType;

// ---------------------------------------------------------------------------
// Map coordinates
// ---------------------------------------------------------------------------

/// A hex tile in odd-q offset coordinates (`q` is the column, `r` the row).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct HexCoord {
    /// Column.
    pub q: i32,
    /// Row.
    pub r: i32,
}

impl HexCoord {
    /// Construct a coordinate.
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
}

impl core::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

// ---------------------------------------------------------------------------
// Faction traits
// ---------------------------------------------------------------------------

/// Behavioural weights of a faction, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FactionTraits {
    /// Inclination toward military action.
    pub military_aggression: f64,
    /// Inclination toward economic investment.
    pub economic_focus: f64,
    /// Inclination toward research; scales tech progress.
    pub research_focus: f64,
    /// Inclination toward diplomacy.
    pub diplomatic_tendency: f64,
}

impl FactionTraits {
    /// Whether every trait lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [
            self.military_aggression,
            self.economic_focus,
            self.research_focus,
            self.diplomatic_tendency,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
    }
}

impl Default for FactionTraits {
    fn default() -> Self {
        Self {
            military_aggression: 0.5,
            economic_focus: 0.5,
            research_focus: 0.5,
            diplomatic_tendency: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// A time-limited modifier applied to a faction by a diplomatic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Effect {
    /// The scalar this effect modifies.
    pub effect_type: EffectType,
    /// Fractional change; the target is multiplied by `1 + value`.
    pub value: f64,
    /// Turns left before the effect is dropped from tracking.
    pub remaining: u32,
    /// Human-readable description.
    pub description: String,
}

impl Effect {
    /// The multiplicative factor this effect applies.
    pub fn factor(&self) -> f64 {
        1.0 + self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_outside_unit_interval_are_rejected() {
        let mut traits = FactionTraits::default();
        assert!(traits.is_normalized());
        traits.diplomatic_tendency = 1.2;
        assert!(!traits.is_normalized());
        traits.diplomatic_tendency = f64::NAN;
        assert!(!traits.is_normalized());
    }

    #[test]
    fn hex_coord_displays_as_key() {
        assert_eq!(HexCoord::new(5, 7).to_string(), "5,7");
    }
}
