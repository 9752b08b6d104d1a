//! Authoritative monster and character state with position-indexed occupancy.

use std::collections::{BTreeMap, HashMap};

use wildlands_core::{
    Character, CharacterId, MonsterEffect, MonsterId, MonsterInstance, MonsterRecord,
    MonsterSpawn, StoreError, TileCoord, TileRect, WorldChange,
};

/// Registry that stores monsters and characters and allocates monster identifiers.
#[derive(Debug)]
pub(crate) struct EntityLayer {
    monsters: BTreeMap<MonsterId, MonsterRecord>,
    monster_cells: HashMap<TileCoord, MonsterId>,
    characters: BTreeMap<CharacterId, Character>,
    character_cells: HashMap<TileCoord, usize>,
    next_monster_id: MonsterId,
}

impl EntityLayer {
    pub(crate) fn new() -> Self {
        Self {
            monsters: BTreeMap::new(),
            monster_cells: HashMap::new(),
            characters: BTreeMap::new(),
            character_cells: HashMap::new(),
            next_monster_id: MonsterId::new(1),
        }
    }

    pub(crate) fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    pub(crate) fn monster(&self, id: MonsterId) -> Option<&MonsterRecord> {
        self.monsters.get(&id)
    }

    pub(crate) fn monster_at(&self, coord: TileCoord) -> Option<&MonsterRecord> {
        self.monster_cells
            .get(&coord)
            .and_then(|id| self.monsters.get(id))
    }

    pub(crate) fn monsters(&self) -> impl Iterator<Item = &MonsterInstance> {
        self.monsters.values().map(|record| &record.instance)
    }

    pub(crate) fn monsters_within(&self, rect: TileRect) -> Vec<MonsterInstance> {
        self.monsters()
            .filter(|monster| rect.contains(monster.position))
            .cloned()
            .collect()
    }

    pub(crate) fn spawn(
        &mut self,
        spawn: MonsterSpawn,
        cap: usize,
    ) -> Result<MonsterInstance, StoreError> {
        if self.monsters.len() >= cap {
            return Err(StoreError::PopulationFull { cap });
        }
        if self.monster_cells.contains_key(&spawn.position) || self.is_character_at(spawn.position)
        {
            return Err(StoreError::CellOccupied {
                coord: spawn.position,
            });
        }

        let id = self.next_monster_id;
        self.next_monster_id = MonsterId::new(id.get().saturating_add(1));
        let instance = spawn.into_instance(id);
        let _ = self.monster_cells.insert(instance.position, id);
        let _ = self.monsters.insert(
            id,
            MonsterRecord {
                instance: instance.clone(),
                version: 0,
            },
        );
        Ok(instance)
    }

    pub(crate) fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub(crate) fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub(crate) fn is_character_at(&self, coord: TileCoord) -> bool {
        self.character_cells.contains_key(&coord)
    }

    pub(crate) fn insert_character(&mut self, character: Character) -> Result<(), StoreError> {
        if self.characters.contains_key(&character.id) {
            return Err(StoreError::DuplicateCharacter {
                character: character.id,
            });
        }
        self.occupy_character_cell(character.position);
        let _ = self.characters.insert(character.id, character);
        Ok(())
    }

    /// Validates the whole change before mutating anything.
    pub(crate) fn apply(&mut self, change: WorldChange) -> Result<(), StoreError> {
        let WorldChange { character, monster } = change;
        let previous_position = self
            .characters
            .get(&character.id)
            .map(|stored| stored.position)
            .ok_or(StoreError::UnknownCharacter {
                character: character.id,
            })?;

        if character.position != previous_position {
            if let Some(occupant) = self.monster_cells.get(&character.position) {
                let slain_here = monster.is_some_and(|change| {
                    change.monster == *occupant && change.effect == MonsterEffect::Slain
                });
                if !slain_here {
                    return Err(StoreError::CellOccupied {
                        coord: character.position,
                    });
                }
            }
        }

        if let Some(monster_change) = monster {
            let current = self
                .monsters
                .get(&monster_change.monster)
                .map(|record| record.version);
            if current != Some(monster_change.expected_version) {
                return Err(StoreError::MonsterConflict {
                    monster: monster_change.monster,
                });
            }

            match monster_change.effect {
                MonsterEffect::Wounded { current_hp } => {
                    debug_assert!(current_hp > 0, "wounded monsters keep positive hp");
                    if let Some(record) = self.monsters.get_mut(&monster_change.monster) {
                        record.instance.current_hp = current_hp;
                        record.version = record.version.saturating_add(1);
                    }
                }
                MonsterEffect::Slain => {
                    if let Some(record) = self.monsters.remove(&monster_change.monster) {
                        let _ = self.monster_cells.remove(&record.instance.position);
                    }
                }
            }
        }

        if previous_position != character.position {
            self.vacate_character_cell(previous_position);
            self.occupy_character_cell(character.position);
        }
        let _ = self.characters.insert(character.id, character);
        Ok(())
    }

    fn occupy_character_cell(&mut self, coord: TileCoord) {
        *self.character_cells.entry(coord).or_insert(0) += 1;
    }

    fn vacate_character_cell(&mut self, coord: TileCoord) {
        if let Some(count) = self.character_cells.get_mut(&coord) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                let _ = self.character_cells.remove(&coord);
            }
        }
    }
}
