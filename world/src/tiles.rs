//! Sparse storage for generated tiles.

use std::collections::{BTreeSet, HashMap};

use wildlands_core::{Tile, TileCoord, TileKind};

/// Coordinate-keyed map holding only the tiles that were generated.
#[derive(Debug, Default)]
pub(crate) struct TileLayer {
    kinds: HashMap<TileCoord, TileKind>,
    towns: BTreeSet<TileCoord>,
}

impl TileLayer {
    pub(crate) fn get(&self, coord: TileCoord) -> Option<Tile> {
        self.kinds.get(&coord).map(|kind| Tile::new(coord, *kind))
    }

    /// Stores the tile unless one exists, returning the tile that is stored.
    pub(crate) fn insert_if_absent(&mut self, tile: Tile) -> Tile {
        let coord = tile.coord();
        let kind = *self.kinds.entry(coord).or_insert_with(|| tile.kind());
        if kind == TileKind::Town {
            let _ = self.towns.insert(coord);
        }
        Tile::new(coord, kind)
    }

    pub(crate) fn towns(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.towns.iter().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.kinds.len()
    }
}
