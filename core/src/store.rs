//! Persistence seam between the systems and the authoritative world state.
//!
//! The store is shared by every concurrent request, so implementations must
//! make the two contended paths atomic: tile creation behaves as
//! insert-if-absent, and [`WorldStore::commit`] checks the version of the
//! monster it touches in the same critical section that applies the change.

use crate::{
    Character, CharacterId, MonsterId, MonsterInstance, MonsterSpawn, MonsterTemplate,
    StoreError, TemplateId, Tile, TileCoord, TileRect,
};

/// Monster together with the version used for optimistic concurrency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterRecord {
    /// Current monster state.
    pub instance: MonsterInstance,
    /// Version bumped by every committed change to the monster.
    pub version: u64,
}

/// Effect of a combat round on the monster involved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonsterEffect {
    /// The monster survived with the provided, strictly positive, hit points.
    Wounded {
        /// Hit points left after the round.
        current_hp: i32,
    },
    /// The monster was defeated and leaves the world.
    Slain,
}

/// Version-guarded change to a single monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterChange {
    /// Monster being changed.
    pub monster: MonsterId,
    /// Version observed when the monster was read.
    pub expected_version: u64,
    /// Change to apply.
    pub effect: MonsterEffect,
}

/// All-or-nothing batch of entity mutations produced by one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldChange {
    /// Full replacement state of the acting character.
    pub character: Character,
    /// Optional change to the monster the character fought.
    pub monster: Option<MonsterChange>,
}

impl WorldChange {
    /// Change that only rewrites the character.
    #[must_use]
    pub const fn character(character: Character) -> Self {
        Self {
            character,
            monster: None,
        }
    }

    /// Change that rewrites the character and the monster it fought.
    #[must_use]
    pub const fn with_monster(character: Character, monster: MonsterChange) -> Self {
        Self {
            character,
            monster: Some(monster),
        }
    }
}

/// Keyed store holding tiles, monsters, characters, and monster templates.
pub trait WorldStore: Send + Sync {
    /// Retrieves the tile at `coord`, if it was generated.
    fn tile(&self, coord: TileCoord) -> Result<Option<Tile>, StoreError>;

    /// Persists `tile` unless a tile already exists at its coordinate.
    ///
    /// Returns whichever tile is stored once the call completes, so a losing
    /// concurrent writer observes the winner's tile.
    fn insert_tile_if_absent(&self, tile: Tile) -> Result<Tile, StoreError>;

    /// Coordinates of every generated town tile.
    fn town_coords(&self) -> Result<Vec<TileCoord>, StoreError>;

    /// Registers or replaces a monster template.
    fn register_template(&self, template: MonsterTemplate) -> Result<(), StoreError>;

    /// Retrieves a registered template.
    fn template(&self, id: TemplateId) -> Result<Option<MonsterTemplate>, StoreError>;

    /// Every registered template ordered by identifier.
    fn templates(&self) -> Result<Vec<MonsterTemplate>, StoreError>;

    /// Number of live monsters.
    fn monster_count(&self) -> Result<usize, StoreError>;

    /// Retrieves a monster by identifier.
    fn monster(&self, id: MonsterId) -> Result<Option<MonsterRecord>, StoreError>;

    /// Retrieves the monster standing on `coord`, if any.
    fn monster_at(&self, coord: TileCoord) -> Result<Option<MonsterRecord>, StoreError>;

    /// Every monster inside `rect`, in one lookup.
    fn monsters_within(&self, rect: TileRect) -> Result<Vec<MonsterInstance>, StoreError>;

    /// Inserts a monster at full health.
    ///
    /// Fails with [`StoreError::CellOccupied`] when a monster or character
    /// already stands on the cell and with [`StoreError::PopulationFull`] when
    /// `cap` monsters are alive; both checks are atomic with the insert.
    fn insert_monster(&self, spawn: MonsterSpawn, cap: usize)
        -> Result<MonsterInstance, StoreError>;

    /// Retrieves a character by identifier.
    fn character(&self, id: CharacterId) -> Result<Option<Character>, StoreError>;

    /// Reports whether any character stands on `coord`.
    fn is_character_at(&self, coord: TileCoord) -> Result<bool, StoreError>;

    /// Registers a character created by the account collaborator.
    fn insert_character(&self, character: Character) -> Result<(), StoreError>;

    /// Applies `change` atomically.
    ///
    /// Fails with [`StoreError::MonsterConflict`] without applying anything
    /// when the monster's version no longer matches or the monster is gone,
    /// and with [`StoreError::CellOccupied`] when the character would step
    /// onto a monster that the same change does not slay.
    fn commit(&self, change: WorldChange) -> Result<(), StoreError>;
}
