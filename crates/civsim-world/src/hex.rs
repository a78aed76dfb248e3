//! Bounded hex map in odd-q offset coordinates.
//!
//! Distances convert offset coordinates to cube coordinates and take the
//! largest axis difference. Neighbour offsets depend on column parity.

use serde::{Deserialize, Serialize};

use civsim_types::HexCoord;

use crate::authority::DistanceProvider;

/// Neighbour offsets `(dq, dr)` for even columns.
const EVEN_COLUMN_NEIGHBORS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (0, 1)];

/// Neighbour offsets `(dq, dr)` for odd columns.
const ODD_COLUMN_NEIGHBORS: [(i32, i32); 6] = [(1, 1), (1, 0), (0, -1), (-1, 1), (-1, 0), (0, 1)];

/// A rectangular hex map of `width` columns by `height` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexGrid {
    width: i32,
    height: i32,
}

impl HexGrid {
    /// A map with columns `0..width` and rows `0..height`.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether `coord` lies on the map.
    pub const fn contains(&self, coord: HexCoord) -> bool {
        coord.q >= 0 && coord.q < self.width && coord.r >= 0 && coord.r < self.height
    }

    /// On-map neighbours of `coord`.
    pub fn neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        neighbors(coord)
            .into_iter()
            .filter(|n| self.contains(*n))
            .collect()
    }
}

impl DistanceProvider for HexGrid {
    fn distance(&self, a: HexCoord, b: HexCoord) -> u32 {
        hex_distance(a, b)
    }
}

/// The six neighbours of `coord`, ignoring map bounds.
pub fn neighbors(coord: HexCoord) -> [HexCoord; 6] {
    let offsets = if coord.q & 1 == 0 {
        EVEN_COLUMN_NEIGHBORS
    } else {
        ODD_COLUMN_NEIGHBORS
    };
    offsets.map(|(dq, dr)| HexCoord::new(coord.q.saturating_add(dq), coord.r.saturating_add(dr)))
}

/// Cube coordinates `(x, y, z)` of an odd-q offset coordinate.
fn to_cube(coord: HexCoord) -> (i64, i64, i64) {
    let q = i64::from(coord.q);
    let r = i64::from(coord.r);
    let x = q;
    let z = r - (q - (q & 1)) / 2;
    let y = -x - z;
    (x, y, z)
}

/// Hex steps between `a` and `b`.
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
pub fn hex_distance(a: HexCoord, b: HexCoord) -> u32 {
    let (ax, ay, az) = to_cube(a);
    let (bx, by, bz) = to_cube(b);
    let steps = (ax - bx).abs().max((ay - by).abs()).max((az - bz).abs());
    u32::try_from(steps).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(hex_distance(HexCoord::new(4, 7), HexCoord::new(4, 7)), 0);
    }

    #[test]
    fn distance_along_a_column_counts_rows() {
        assert_eq!(hex_distance(HexCoord::new(0, 0), HexCoord::new(0, 3)), 3);
    }

    #[test]
    fn starting_factions_are_far_apart() {
        // Default faction capitals.
        let a = HexCoord::new(5, 5);
        let b = HexCoord::new(10, 10);
        let c = HexCoord::new(15, 15);
        assert!(hex_distance(a, b) > 3);
        assert_eq!(hex_distance(a, b), hex_distance(b, a));
        assert!(hex_distance(a, c) > hex_distance(a, b));
    }

    #[test]
    fn neighbors_are_one_step_away() {
        for coord in [HexCoord::new(4, 4), HexCoord::new(5, 4)] {
            for n in neighbors(coord) {
                assert_eq!(hex_distance(coord, n), 1, "{coord} -> {n}");
            }
        }
    }

    #[test]
    fn grid_neighbors_respect_bounds() {
        let grid = HexGrid::new(10, 10);
        assert_eq!(grid.neighbors(HexCoord::new(0, 0)).len(), 2);
        assert_eq!(grid.neighbors(HexCoord::new(4, 4)).len(), 6);
        assert!(!grid.contains(HexCoord::new(-1, 0)));
    }
}
