#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement validation for single-step character moves.

use rand::Rng;
use tracing::debug;
use wildlands_core::{
    CharacterId, MoveError, MoveResult, StoreError, TileCoord, TileKind, WorldChange,
    WorldStore, WORLD_BOUNDS,
};
use wildlands_system_combat::{Combat, Engagement};
use wildlands_system_tile_generation::TileGenerator;

/// System that validates moves and hands occupied targets over to combat.
#[derive(Clone, Copy, Debug, Default)]
pub struct Movement {
    tiles: TileGenerator,
    combat: Combat,
}

impl Movement {
    /// Creates a movement system that resolves fights through `combat`.
    #[must_use]
    pub const fn new(combat: Combat) -> Self {
        Self {
            tiles: TileGenerator::new(),
            combat,
        }
    }

    /// Moves the character one step onto `target`.
    ///
    /// Any of the eight neighbouring cells, or the current cell, may be
    /// targeted. Rejected requests leave the world untouched. A monster on
    /// the target turns the move into a combat round; walking into a town
    /// makes it the character's new home.
    pub fn move_character<S, R>(
        &self,
        store: &S,
        character_id: CharacterId,
        target: TileCoord,
        rng: &mut R,
    ) -> Result<MoveResult, MoveError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        if !WORLD_BOUNDS.contains(target) {
            return Err(MoveError::OutOfBounds { target });
        }

        let character = store
            .character(character_id)?
            .ok_or(MoveError::CharacterNotFound {
                character: character_id,
            })?;
        if character.position.chebyshev_distance(target) > 1 {
            return Err(MoveError::NotAdjacent {
                from: character.position,
                to: target,
            });
        }

        let tile = self.tiles.generate(store, target, rng)?;
        if !tile.is_traversable() {
            return Err(MoveError::Impassable {
                target,
                kind: tile.kind(),
            });
        }

        loop {
            if let Some(record) = store.monster_at(target)? {
                match self.combat.resolve(store, &character, record, target, rng)? {
                    Engagement::Resolved(result) => return Ok(result),
                    Engagement::Vacated => {
                        debug!(
                            character = character_id.get(),
                            x = target.x(),
                            y = target.y(),
                            "target vacated during combat, re-checking"
                        );
                        continue;
                    }
                }
            }

            let mut moved = character.clone();
            moved.position = target;
            if tile.kind() == TileKind::Town {
                moved.home_town = target;
            }
            match store.commit(WorldChange::character(moved)) {
                Ok(()) => break,
                Err(StoreError::CellOccupied { .. }) => {
                    debug!(
                        character = character_id.get(),
                        x = target.x(),
                        y = target.y(),
                        "monster appeared on target, re-checking"
                    );
                }
                Err(error) => return Err(error.into()),
            }
        }

        debug!(
            character = character_id.get(),
            x = target.x(),
            y = target.y(),
            "character moved"
        );
        Ok(MoveResult::arrived(target))
    }
}
