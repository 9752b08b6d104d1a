#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative, thread-safe in-memory world state for Wildlands.
//!
//! [`World`] implements [`WorldStore`] for adapters and tests that do not need
//! an external database. Tiles, templates and entities sit behind separate
//! locks; every mutation that spans a character and a monster happens under
//! the single entity lock so combat commits are all-or-nothing.

mod entities;
mod tiles;

use std::{
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use entities::EntityLayer;
use tiles::TileLayer;
use wildlands_core::{
    Character, CharacterId, MonsterId, MonsterInstance, MonsterRecord, MonsterSpawn,
    MonsterTemplate, StoreError, TemplateId, Tile, TileCoord, TileRect, WorldChange, WorldStore,
};

/// Represents the authoritative Wildlands world state.
#[derive(Debug)]
pub struct World {
    tiles: RwLock<TileLayer>,
    templates: RwLock<BTreeMap<TemplateId, MonsterTemplate>>,
    entities: RwLock<EntityLayer>,
}

impl World {
    /// Creates an empty world: no tiles generated, no templates, no entities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tiles: RwLock::new(TileLayer::default()),
            templates: RwLock::new(BTreeMap::new()),
            entities: RwLock::new(EntityLayer::new()),
        }
    }

    fn read_tiles(&self) -> Result<RwLockReadGuard<'_, TileLayer>, StoreError> {
        self.tiles.read().map_err(|_| StoreError::Poisoned("tiles"))
    }

    fn write_tiles(&self) -> Result<RwLockWriteGuard<'_, TileLayer>, StoreError> {
        self.tiles.write().map_err(|_| StoreError::Poisoned("tiles"))
    }

    fn read_templates(
        &self,
    ) -> Result<RwLockReadGuard<'_, BTreeMap<TemplateId, MonsterTemplate>>, StoreError> {
        self.templates
            .read()
            .map_err(|_| StoreError::Poisoned("templates"))
    }

    fn read_entities(&self) -> Result<RwLockReadGuard<'_, EntityLayer>, StoreError> {
        self.entities
            .read()
            .map_err(|_| StoreError::Poisoned("entities"))
    }

    fn write_entities(&self) -> Result<RwLockWriteGuard<'_, EntityLayer>, StoreError> {
        self.entities
            .write()
            .map_err(|_| StoreError::Poisoned("entities"))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldStore for World {
    fn tile(&self, coord: TileCoord) -> Result<Option<Tile>, StoreError> {
        Ok(self.read_tiles()?.get(coord))
    }

    fn insert_tile_if_absent(&self, tile: Tile) -> Result<Tile, StoreError> {
        Ok(self.write_tiles()?.insert_if_absent(tile))
    }

    fn town_coords(&self) -> Result<Vec<TileCoord>, StoreError> {
        Ok(self.read_tiles()?.towns().collect())
    }

    fn register_template(&self, template: MonsterTemplate) -> Result<(), StoreError> {
        let mut templates = self
            .templates
            .write()
            .map_err(|_| StoreError::Poisoned("templates"))?;
        let _ = templates.insert(template.id, template);
        Ok(())
    }

    fn template(&self, id: TemplateId) -> Result<Option<MonsterTemplate>, StoreError> {
        Ok(self.read_templates()?.get(&id).cloned())
    }

    fn templates(&self) -> Result<Vec<MonsterTemplate>, StoreError> {
        Ok(self.read_templates()?.values().cloned().collect())
    }

    fn monster_count(&self) -> Result<usize, StoreError> {
        Ok(self.read_entities()?.monster_count())
    }

    fn monster(&self, id: MonsterId) -> Result<Option<MonsterRecord>, StoreError> {
        Ok(self.read_entities()?.monster(id).cloned())
    }

    fn monster_at(&self, coord: TileCoord) -> Result<Option<MonsterRecord>, StoreError> {
        Ok(self.read_entities()?.monster_at(coord).cloned())
    }

    fn monsters_within(&self, rect: TileRect) -> Result<Vec<MonsterInstance>, StoreError> {
        Ok(self.read_entities()?.monsters_within(rect))
    }

    fn insert_monster(
        &self,
        spawn: MonsterSpawn,
        cap: usize,
    ) -> Result<MonsterInstance, StoreError> {
        self.write_entities()?.spawn(spawn, cap)
    }

    fn character(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        Ok(self.read_entities()?.character(id).cloned())
    }

    fn is_character_at(&self, coord: TileCoord) -> Result<bool, StoreError> {
        Ok(self.read_entities()?.is_character_at(coord))
    }

    fn insert_character(&self, character: Character) -> Result<(), StoreError> {
        self.write_entities()?.insert_character(character)
    }

    fn commit(&self, change: WorldChange) -> Result<(), StoreError> {
        self.write_entities()?.apply(change)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use wildlands_core::{Character, MonsterInstance, StoreError};

    use super::World;

    /// Number of tiles generated so far.
    pub fn tile_count(world: &World) -> Result<usize, StoreError> {
        Ok(world.read_tiles()?.len())
    }

    /// Captures every live monster ordered by identifier.
    pub fn monsters(world: &World) -> Result<Vec<MonsterInstance>, StoreError> {
        Ok(world.read_entities()?.monsters().cloned().collect())
    }

    /// Captures every registered character ordered by identifier.
    pub fn characters(world: &World) -> Result<Vec<Character>, StoreError> {
        Ok(world.read_entities()?.characters().cloned().collect())
    }
}
