#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Lazy, idempotent tile generation.
//!
//! A tile's terrain is rolled the first time anything asks for its
//! coordinate and is permanent afterwards. Generation goes through the
//! store's insert-if-absent path, so concurrent first visits converge on a
//! single tile.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;
use wildlands_core::{StoreError, Tile, TileCoord, TileKind, WorldStore, WORLD_BOUNDS};

/// Range of the uniform roll that selects a tile's terrain.
pub const TERRAIN_ROLL: RangeInclusive<u32> = 1..=100;

/// Cumulative upper thresholds of the terrain roll, in ascending order.
///
/// The widths `{20, 10, 15, 15, 5, 35}` partition [`TERRAIN_ROLL`].
pub const TERRAIN_THRESHOLDS: [(u32, TileKind); 6] = [
    (20, TileKind::Grass),
    (30, TileKind::Water),
    (45, TileKind::Mountain),
    (60, TileKind::Forest),
    (65, TileKind::Town),
    (100, TileKind::Road),
];

/// Maps a terrain roll onto its tile kind.
///
/// Rolls above the last threshold fall back to [`TileKind::Road`].
#[must_use]
pub fn kind_for_roll(roll: u32) -> TileKind {
    TERRAIN_THRESHOLDS
        .iter()
        .find(|(threshold, _)| roll <= *threshold)
        .map_or(TileKind::Road, |(_, kind)| *kind)
}

/// System that produces the tile for a coordinate on first access.
#[derive(Clone, Copy, Debug, Default)]
pub struct TileGenerator;

impl TileGenerator {
    /// Creates a new tile generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the tile at `coord`, generating and persisting it if needed.
    ///
    /// An existing tile is returned unchanged and consumes no randomness.
    pub fn generate<S, R>(
        &self,
        store: &S,
        coord: TileCoord,
        rng: &mut R,
    ) -> Result<Tile, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(tile) = store.tile(coord)? {
            return Ok(tile);
        }

        let rolled = kind_for_roll(rng.gen_range(TERRAIN_ROLL));
        let stored = store.insert_tile_if_absent(Tile::new(coord, rolled))?;
        debug!(
            x = coord.x(),
            y = coord.y(),
            kind = ?stored.kind(),
            "tile generated"
        );
        Ok(stored)
    }

    /// Manhattan distance from `coord` to the closest generated town.
    ///
    /// Returns `None` while no town exists yet.
    pub fn nearest_town_distance<S>(
        &self,
        store: &S,
        coord: TileCoord,
    ) -> Result<Option<u32>, StoreError>
    where
        S: WorldStore + ?Sized,
    {
        Ok(store
            .town_coords()?
            .into_iter()
            .map(|town| town.manhattan_distance(coord))
            .min())
    }

    /// Generates every tile of the world in row-major order.
    ///
    /// Returns the number of tiles visited; tiles that already existed are
    /// left untouched.
    pub fn generate_all<S, R>(&self, store: &S, rng: &mut R) -> Result<usize, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let mut visited = 0;
        for coord in WORLD_BOUNDS.rect().iter_row_major() {
            let _ = self.generate(store, coord, rng)?;
            visited += 1;
        }
        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_partition_the_roll() {
        let mut lower = *TERRAIN_ROLL.start();
        let mut widths = Vec::new();
        for (threshold, _) in TERRAIN_THRESHOLDS {
            assert!(threshold >= lower, "thresholds must ascend");
            widths.push(threshold + 1 - lower);
            lower = threshold + 1;
        }
        assert_eq!(widths, vec![20, 10, 15, 15, 5, 35]);
        assert_eq!(widths.iter().sum::<u32>(), 100);
        assert_eq!(lower - 1, *TERRAIN_ROLL.end());
    }

    #[test]
    fn boundaries_map_to_expected_kinds() {
        assert_eq!(kind_for_roll(1), TileKind::Grass);
        assert_eq!(kind_for_roll(20), TileKind::Grass);
        assert_eq!(kind_for_roll(21), TileKind::Water);
        assert_eq!(kind_for_roll(30), TileKind::Water);
        assert_eq!(kind_for_roll(31), TileKind::Mountain);
        assert_eq!(kind_for_roll(45), TileKind::Mountain);
        assert_eq!(kind_for_roll(46), TileKind::Forest);
        assert_eq!(kind_for_roll(60), TileKind::Forest);
        assert_eq!(kind_for_roll(61), TileKind::Town);
        assert_eq!(kind_for_roll(65), TileKind::Town);
        assert_eq!(kind_for_roll(66), TileKind::Road);
        assert_eq!(kind_for_roll(100), TileKind::Road);
    }

    #[test]
    fn every_roll_has_exactly_one_kind() {
        let counts = TERRAIN_ROLL.fold([0_u32; 6], |mut counts, roll| {
            let kind = kind_for_roll(roll);
            let index = TERRAIN_THRESHOLDS
                .iter()
                .position(|(_, candidate)| *candidate == kind)
                .expect("kind listed in thresholds");
            counts[index] += 1;
            counts
        });
        assert_eq!(counts, [20, 10, 15, 15, 5, 35]);
    }
}
