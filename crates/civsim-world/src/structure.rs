//! Building blueprints and the reference building layer.
//!
//! [`blueprint`] is the static table of what each building costs, which
//! epoch unlocks it, and what it produces once placed. [`BuildingRegistry`]
//! tracks placed buildings, one per hex.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use civsim_ledger::ResourceCost;
use civsim_types::{BuildingType, Epoch, FactionId, HexCoord, ResourceKind};

use crate::authority::BuildingAuthority;
use crate::error::WorldError;
use crate::hex::HexGrid;

// ---------------------------------------------------------------------------
// Blueprints
// ---------------------------------------------------------------------------

/// Static description of a building type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingBlueprint {
    /// The building type.
    pub building: BuildingType,
    /// Earliest epoch in which it can be built.
    pub epoch: Epoch,
    /// Construction cost lines.
    pub cost: &'static [(ResourceKind, i64)],
    /// Per-turn production added to the owner once placed.
    pub production: &'static [(ResourceKind, i64)],
}

impl BuildingBlueprint {
    /// Construction cost as a [`ResourceCost`].
    pub fn cost(&self) -> ResourceCost {
        self.cost
            .iter()
            .map(|(resource, qty)| (*resource, Decimal::from(*qty)))
            .collect()
    }

    /// Per-turn production lines as decimals.
    pub fn production(&self) -> impl Iterator<Item = (ResourceKind, Decimal)> + '_ {
        self.production
            .iter()
            .map(|(resource, rate)| (*resource, Decimal::from(*rate)))
    }
}

/// Look up the blueprint for `building`.
pub const fn blueprint(building: BuildingType) -> BuildingBlueprint {
    use ResourceKind::{Food, Gold, Metal, Stone, TechPoints, Wood};

    match building {
        // ---- Tribal ----
        BuildingType::Hut => entry(building, Epoch::Tribal, &[(Wood, 20), (Stone, 10)], &[]),
        BuildingType::Campfire => entry(
            building,
            Epoch::Tribal,
            &[(Wood, 10), (Stone, 5)],
            &[(Food, 2)],
        ),
        BuildingType::BasicDefense => {
            entry(building, Epoch::Tribal, &[(Wood, 15), (Stone, 20)], &[])
        }

        // ---- Agricultural ----
        BuildingType::Farm => entry(
            building,
            Epoch::Agricultural,
            &[(Wood, 30), (Stone, 20), (Gold, 50)],
            &[(Food, 5)],
        ),
        BuildingType::Barn => entry(
            building,
            Epoch::Agricultural,
            &[(Wood, 40), (Stone, 30), (Gold, 100)],
            &[],
        ),
        BuildingType::Mine => entry(
            building,
            Epoch::Agricultural,
            &[(Wood, 50), (Stone, 40), (Gold, 150)],
            &[(Stone, 3), (Gold, 1)],
        ),
        BuildingType::Workshop => entry(
            building,
            Epoch::Agricultural,
            &[(Wood, 60), (Stone, 50), (Gold, 200)],
            &[(TechPoints, 1)],
        ),

        // ---- Industrial ----
        BuildingType::Factory => entry(
            building,
            Epoch::Industrial,
            &[(Wood, 100), (Stone, 80), (Gold, 500), (Metal, 200)],
            &[(Metal, 5), (TechPoints, 2)],
        ),
        BuildingType::AdvancedMine => entry(
            building,
            Epoch::Industrial,
            &[(Wood, 120), (Stone, 100), (Gold, 600), (Metal, 150)],
            &[(Stone, 8), (Gold, 3), (Metal, 4)],
        ),
        BuildingType::PowerPlant => entry(
            building,
            Epoch::Industrial,
            &[(Wood, 150), (Stone, 120), (Gold, 800), (Metal, 300)],
            &[(TechPoints, 3)],
        ),

        // ---- Space age ----
        BuildingType::ResearchLab => entry(
            building,
            Epoch::SpaceAge,
            &[(Wood, 200), (Stone, 150), (Gold, 1000), (Metal, 400)],
            &[(TechPoints, 5)],
        ),
        BuildingType::Spaceport => entry(
            building,
            Epoch::SpaceAge,
            &[(Wood, 500), (Stone, 400), (Gold, 5000), (Metal, 2000)],
            &[],
        ),
        BuildingType::EnergyGrid => entry(
            building,
            Epoch::SpaceAge,
            &[(Wood, 300), (Stone, 200), (Gold, 2000), (Metal, 800)],
            &[(TechPoints, 8)],
        ),
    }
}

const fn entry(
    building: BuildingType,
    epoch: Epoch,
    cost: &'static [(ResourceKind, i64)],
    production: &'static [(ResourceKind, i64)],
) -> BuildingBlueprint {
    BuildingBlueprint {
        building,
        epoch,
        cost,
        production,
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A building placed on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBuilding {
    /// What was built.
    pub building: BuildingType,
    /// Who built it.
    pub owner: FactionId,
}

/// Reference [`BuildingAuthority`]: one building per hex, optionally
/// confined to a [`HexGrid`].
#[derive(Debug, Clone, Default)]
pub struct BuildingRegistry {
    bounds: Option<HexGrid>,
    placed: BTreeMap<HexCoord, PlacedBuilding>,
}

impl BuildingRegistry {
    /// An unbounded registry.
    pub const fn new() -> Self {
        Self {
            bounds: None,
            placed: BTreeMap::new(),
        }
    }

    /// A registry that rejects hexes outside `grid`.
    pub const fn bounded(grid: HexGrid) -> Self {
        Self {
            bounds: Some(grid),
            placed: BTreeMap::new(),
        }
    }

    /// The building at `location`, if any.
    pub fn building_at(&self, location: HexCoord) -> Option<&PlacedBuilding> {
        self.placed.get(&location)
    }

    /// Every hex `owner` has built on.
    pub fn owned_by<'a>(&'a self, owner: &'a FactionId) -> impl Iterator<Item = HexCoord> + 'a {
        self.placed
            .iter()
            .filter(move |(_, placed)| &placed.owner == owner)
            .map(|(coord, _)| *coord)
    }

    /// Number of placed buildings.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Whether nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    fn check_site(&self, location: HexCoord) -> Result<(), WorldError> {
        if self.bounds.is_some_and(|grid| !grid.contains(location)) {
            return Err(WorldError::OutOfBounds(location));
        }
        if let Some(existing) = self.placed.get(&location) {
            return Err(WorldError::SiteOccupied {
                location,
                occupant: existing.building,
            });
        }
        Ok(())
    }
}

impl BuildingAuthority for BuildingRegistry {
    fn can_place_building(&self, _building: BuildingType, location: HexCoord) -> bool {
        self.check_site(location).is_ok()
    }

    fn place_building(
        &mut self,
        owner: &FactionId,
        building: BuildingType,
        location: HexCoord,
    ) -> Result<(), WorldError> {
        self.check_site(location)?;
        self.placed.insert(
            location,
            PlacedBuilding {
                building,
                owner: owner.clone(),
            },
        );
        tracing::debug!(owner = %owner, ?building, %location, "building placed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tribal_blueprints_cost_only_wood_and_stone() {
        for building in [
            BuildingType::Hut,
            BuildingType::Campfire,
            BuildingType::BasicDefense,
        ] {
            let bp = blueprint(building);
            assert_eq!(bp.epoch, Epoch::Tribal);
            assert_eq!(bp.cost().get(ResourceKind::Gold), Decimal::ZERO);
        }
        assert_eq!(blueprint(BuildingType::Hut).cost().total(), dec!(30));
    }

    #[test]
    fn factory_produces_metal_and_research() {
        let bp = blueprint(BuildingType::Factory);
        let production: BTreeMap<_, _> = bp.production().collect();
        assert_eq!(production.get(&ResourceKind::Metal), Some(&dec!(5)));
        assert_eq!(production.get(&ResourceKind::TechPoints), Some(&dec!(2)));
    }

    #[test]
    fn every_building_has_a_blueprint() {
        for building in BuildingType::ALL {
            assert_eq!(blueprint(building).building, building);
            assert!(!blueprint(building).cost().is_empty());
        }
    }

    #[test]
    fn one_building_per_hex() {
        let mut registry = BuildingRegistry::new();
        let owner = FactionId::new("ai1");
        let site = HexCoord::new(5, 5);
        assert!(registry.can_place_building(BuildingType::Hut, site));
        assert!(registry.place_building(&owner, BuildingType::Hut, site).is_ok());
        assert!(!registry.can_place_building(BuildingType::Campfire, site));
        assert!(matches!(
            registry.place_building(&owner, BuildingType::Campfire, site),
            Err(WorldError::SiteOccupied { .. })
        ));
        assert_eq!(registry.owned_by(&owner).count(), 1);
    }

    #[test]
    fn bounded_registry_rejects_off_map_sites() {
        let registry = BuildingRegistry::bounded(HexGrid::new(4, 4));
        assert!(!registry.can_place_building(BuildingType::Hut, HexCoord::new(4, 0)));
        assert!(registry.can_place_building(BuildingType::Hut, HexCoord::new(3, 3)));
    }
}
