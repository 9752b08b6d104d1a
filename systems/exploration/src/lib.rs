#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-side queries over the neighbourhood of a coordinate.
//!
//! Every tile touched by a query is generated on demand. Monster occupancy
//! for a whole neighbourhood is resolved with a single bounding-box lookup.

use std::collections::{hash_map::Entry, HashMap};

use rand::Rng;
use tracing::trace;
use wildlands_core::{
    CharacterId, ExplorationView, LookupError, MonsterInstance, MonsterSnapshot, MonsterTemplate,
    StoreError, TemplateId, TileCoord, TileView, WorldStore, WORLD_BOUNDS,
};
use wildlands_system_tile_generation::TileGenerator;

/// Chebyshev radius revealed around a character by [`Exploration::vision`].
pub const VISION_RADIUS: u32 = 1;

/// System answering tile and neighbourhood lookups.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exploration {
    tiles: TileGenerator,
}

impl Exploration {
    /// Creates a new exploration system.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tiles: TileGenerator::new(),
        }
    }

    /// Lists every in-bounds tile within `radius` of `center`.
    ///
    /// Tiles are ordered by row, then column. Coordinates outside of the world
    /// are skipped rather than rejected, so a corner yields a clipped square.
    pub fn explore<S, R>(
        &self,
        store: &S,
        center: TileCoord,
        radius: u32,
        include_center: bool,
        rng: &mut R,
    ) -> Result<Vec<TileView>, LookupError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(area) = WORLD_BOUNDS.clip(center, radius) else {
            return Ok(Vec::new());
        };

        let occupants: HashMap<TileCoord, MonsterInstance> = store
            .monsters_within(area)?
            .into_iter()
            .map(|monster| (monster.position, monster))
            .collect();
        let mut templates = HashMap::new();

        let mut explored = Vec::new();
        for coord in area.iter_row_major() {
            if !include_center && coord == center {
                continue;
            }
            let tile = self.tiles.generate(store, coord, rng)?;
            let monster = occupants
                .get(&coord)
                .map(|monster| snapshot(store, &mut templates, monster))
                .transpose()?;
            explored.push(TileView::new(tile, monster));
        }

        trace!(
            x = center.x(),
            y = center.y(),
            radius,
            tiles = explored.len(),
            occupied = occupants.len(),
            "neighbourhood explored"
        );
        Ok(explored)
    }

    /// Looks up a single tile together with its occupant.
    pub fn tile<S, R>(&self, store: &S, coord: TileCoord, rng: &mut R) -> Result<TileView, LookupError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        if !WORLD_BOUNDS.contains(coord) {
            return Err(LookupError::OutOfBounds { coord });
        }

        let tile = self.tiles.generate(store, coord, rng)?;
        let monster = match store.monster_at(coord)? {
            Some(record) => Some(snapshot(store, &mut HashMap::new(), &record.instance)?),
            None => None,
        };
        Ok(TileView::new(tile, monster))
    }

    /// Reveals the tiles around a character, its own cell included.
    pub fn vision<S, R>(
        &self,
        store: &S,
        character_id: CharacterId,
        rng: &mut R,
    ) -> Result<ExplorationView, LookupError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let character = store
            .character(character_id)?
            .ok_or(LookupError::CharacterNotFound {
                character: character_id,
            })?;
        let center = character.position;
        Ok(ExplorationView {
            center_x: center.x(),
            center_y: center.y(),
            explored: self.explore(store, center, VISION_RADIUS, true, rng)?,
        })
    }
}

fn snapshot<S>(
    store: &S,
    templates: &mut HashMap<TemplateId, MonsterTemplate>,
    monster: &MonsterInstance,
) -> Result<MonsterSnapshot, StoreError>
where
    S: WorldStore + ?Sized,
{
    let template = match templates.entry(monster.template) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(store.template(monster.template)?.ok_or(
            StoreError::UnknownTemplate {
                template: monster.template,
            },
        )?),
    };
    Ok(MonsterSnapshot::capture(monster, template))
}
