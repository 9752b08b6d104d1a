use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Barrier,
    },
    thread,
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wildlands_core::{
    Character, CharacterId, CombatResult, MonsterId, MonsterInstance, MonsterRecord,
    MonsterSpawn, MonsterTemplate, MoveError, StoreError, TemplateId, Tile, TileCoord, TileKind,
    TileRect, WorldChange, WorldStore,
};
use wildlands_system_combat::Combat;
use wildlands_system_movement::Movement;
use wildlands_system_population::{Config, Population};
use wildlands_world::{query, World};

const HERO: CharacterId = CharacterId::new(1);
const START: TileCoord = TileCoord::new(5, 5);

fn movement() -> Movement {
    Movement::new(Combat::new(Population::new(Config::new(0, 0))))
}

fn world_with_hero() -> World {
    let world = World::new();
    world
        .insert_character(Character::recruit(HERO, "Hero", START))
        .expect("hero");
    world
}

fn paint(world: &World, coord: TileCoord, kind: TileKind) {
    let _ = world
        .insert_tile_if_absent(Tile::new(coord, kind))
        .expect("paint tile");
}

fn fragile_slime() -> MonsterTemplate {
    MonsterTemplate {
        id: TemplateId::new(1),
        name: "Slime".to_owned(),
        base_hp: 1,
        base_attack: 8,
        base_defense: 6,
        base_xp: 5,
        sprite: "slime.png".to_owned(),
    }
}

fn hero(world: &World) -> Character {
    world.character(HERO).expect("read").expect("hero stored")
}

#[test]
fn non_adjacent_target_is_rejected_without_side_effects() {
    let world = world_with_hero();
    let before = hero(&world);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let error = movement()
        .move_character(&world, HERO, TileCoord::new(7, 5), &mut rng)
        .expect_err("two cells away");

    assert_eq!(
        error,
        MoveError::NotAdjacent {
            from: START,
            to: TileCoord::new(7, 5)
        }
    );
    assert!(error.is_validation());
    assert_eq!(hero(&world), before);
    assert_eq!(query::tile_count(&world).expect("count"), 0);
}

#[test]
fn targets_outside_the_world_are_rejected() {
    let world = World::new();
    world
        .insert_character(Character::recruit(HERO, "Hero", TileCoord::new(0, 0)))
        .expect("hero");
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    for target in [TileCoord::new(-1, 0), TileCoord::new(0, 51), TileCoord::new(60, 60)] {
        let error = movement()
            .move_character(&world, HERO, target, &mut rng)
            .expect_err("outside of the world");
        assert_eq!(error, MoveError::OutOfBounds { target });
        assert!(error.is_validation());
    }
    assert_eq!(hero(&world).position, TileCoord::new(0, 0));
}

#[test]
fn unknown_character_is_reported() {
    let world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let error = movement()
        .move_character(&world, CharacterId::new(404), START, &mut rng)
        .expect_err("no such character");

    assert_eq!(
        error,
        MoveError::CharacterNotFound {
            character: CharacterId::new(404)
        }
    );
    assert!(!error.is_validation());
}

#[test]
fn impassable_terrain_blocks_the_move() {
    let world = world_with_hero();
    let target = TileCoord::new(6, 5);
    paint(&world, target, TileKind::Water);
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let error = movement()
        .move_character(&world, HERO, target, &mut rng)
        .expect_err("water");

    assert_eq!(
        error,
        MoveError::Impassable {
            target,
            kind: TileKind::Water
        }
    );
    assert_eq!(hero(&world).position, START);
}

#[test]
fn diagonal_step_onto_open_ground_moves_the_character() {
    let world = world_with_hero();
    let target = TileCoord::new(6, 6);
    paint(&world, target, TileKind::Grass);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let result = movement()
        .move_character(&world, HERO, target, &mut rng)
        .expect("move");

    assert_eq!(result.position(), target);
    assert_eq!(result.combat_outcome, None);
    let stored = hero(&world);
    assert_eq!(stored.position, target);
    assert_eq!(stored.home_town, START);
    assert!(world.is_character_at(target).expect("read"));
    assert!(!world.is_character_at(START).expect("read"));
}

#[test]
fn entering_a_town_moves_home() {
    let world = world_with_hero();
    let target = TileCoord::new(4, 5);
    paint(&world, target, TileKind::Town);
    let mut rng = ChaCha8Rng::seed_from_u64(6);

    let _ = movement()
        .move_character(&world, HERO, target, &mut rng)
        .expect("move");

    assert_eq!(hero(&world).home_town, target);
}

#[test]
fn staying_in_place_is_accepted() {
    let world = world_with_hero();
    paint(&world, START, TileKind::Road);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let result = movement()
        .move_character(&world, HERO, START, &mut rng)
        .expect("zero-distance move");

    assert_eq!(result.position(), START);
    assert_eq!(hero(&world).position, START);
}

#[test]
fn occupied_target_starts_combat() {
    let world = world_with_hero();
    let target = TileCoord::new(6, 5);
    paint(&world, target, TileKind::Forest);
    let species = fragile_slime();
    world.register_template(species.clone()).expect("register");
    let _ = world
        .insert_monster(MonsterSpawn::new(target, &species, 0), 10)
        .expect("spawn");
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let result = movement()
        .move_character(&world, HERO, target, &mut rng)
        .expect("fight");

    assert_eq!(result.combat_result(), CombatResult::Victory);
    assert_eq!(result.position(), target);
    assert_eq!(world.monster_count().expect("count"), 0);
    assert_eq!(hero(&world).xp, 50);
}

/// Store that spawns a monster on `lair` right after the first empty lookup
/// there, as a concurrent replenishment would.
struct SpawnBehindLookup {
    world: World,
    lair: TileCoord,
    species: MonsterTemplate,
    armed: AtomicBool,
}

impl WorldStore for SpawnBehindLookup {
    fn tile(&self, coord: TileCoord) -> Result<Option<Tile>, StoreError> {
        self.world.tile(coord)
    }

    fn insert_tile_if_absent(&self, tile: Tile) -> Result<Tile, StoreError> {
        self.world.insert_tile_if_absent(tile)
    }

    fn town_coords(&self) -> Result<Vec<TileCoord>, StoreError> {
        self.world.town_coords()
    }

    fn register_template(&self, template: MonsterTemplate) -> Result<(), StoreError> {
        self.world.register_template(template)
    }

    fn template(&self, id: TemplateId) -> Result<Option<MonsterTemplate>, StoreError> {
        self.world.template(id)
    }

    fn templates(&self) -> Result<Vec<MonsterTemplate>, StoreError> {
        self.world.templates()
    }

    fn monster_count(&self) -> Result<usize, StoreError> {
        self.world.monster_count()
    }

    fn monster(&self, id: MonsterId) -> Result<Option<MonsterRecord>, StoreError> {
        self.world.monster(id)
    }

    fn monster_at(&self, coord: TileCoord) -> Result<Option<MonsterRecord>, StoreError> {
        let found = self.world.monster_at(coord)?;
        if found.is_none() && coord == self.lair && self.armed.swap(false, Ordering::SeqCst) {
            let _ = self
                .world
                .insert_monster(MonsterSpawn::new(coord, &self.species, 0), 10)?;
        }
        Ok(found)
    }

    fn monsters_within(&self, rect: TileRect) -> Result<Vec<MonsterInstance>, StoreError> {
        self.world.monsters_within(rect)
    }

    fn insert_monster(
        &self,
        spawn: MonsterSpawn,
        cap: usize,
    ) -> Result<MonsterInstance, StoreError> {
        self.world.insert_monster(spawn, cap)
    }

    fn character(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        self.world.character(id)
    }

    fn is_character_at(&self, coord: TileCoord) -> Result<bool, StoreError> {
        self.world.is_character_at(coord)
    }

    fn insert_character(&self, character: Character) -> Result<(), StoreError> {
        self.world.insert_character(character)
    }

    fn commit(&self, change: WorldChange) -> Result<(), StoreError> {
        self.world.commit(change)
    }
}

#[test]
fn monster_spawned_after_the_check_turns_the_step_into_combat() {
    let world = world_with_hero();
    let lair = TileCoord::new(6, 5);
    paint(&world, lair, TileKind::Grass);
    let species = fragile_slime();
    world.register_template(species.clone()).expect("register");
    let store = SpawnBehindLookup {
        world,
        lair,
        species,
        armed: AtomicBool::new(true),
    };
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let result = movement()
        .move_character(&store, HERO, lair, &mut rng)
        .expect("step");

    assert!(!store.armed.load(Ordering::SeqCst));
    assert_eq!(result.combat_result(), CombatResult::Victory);
    assert_eq!(result.position(), lair);
    assert_eq!(store.monster_count().expect("count"), 0);
    let stored = hero(&store.world);
    assert_eq!(stored.position, lair);
    assert_eq!(stored.xp, 50);
}

#[test]
fn concurrent_attackers_share_a_single_victory() {
    let world = World::new();
    let lair = TileCoord::new(25, 25);
    let species = fragile_slime();
    world.register_template(species.clone()).expect("register");
    for coord in wildlands_core::WORLD_BOUNDS
        .clip(lair, 1)
        .expect("lair inside the world")
        .iter_row_major()
    {
        paint(&world, coord, TileKind::Grass);
    }
    let attackers: Vec<CharacterId> = wildlands_core::WORLD_BOUNDS
        .clip(lair, 1)
        .expect("lair inside the world")
        .iter_row_major()
        .filter(|coord| *coord != lair)
        .enumerate()
        .map(|(index, coord)| {
            let id = CharacterId::new(index as u64 + 1);
            world
                .insert_character(Character::recruit(id, format!("attacker-{index}"), coord))
                .expect("attacker");
            id
        })
        .collect();
    let _ = world
        .insert_monster(MonsterSpawn::new(lair, &species, 0), 10)
        .expect("spawn");
    let barrier = Barrier::new(attackers.len());
    let system = movement();

    let results: Vec<CombatResult> = thread::scope(|scope| {
        let handles: Vec<_> = attackers
            .iter()
            .map(|id| {
                let world = &world;
                let barrier = &barrier;
                scope.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(id.get());
                    let _ = barrier.wait();
                    system
                        .move_character(world, *id, lair, &mut rng)
                        .expect("move")
                        .combat_result()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("attacker thread panicked"))
            .collect()
    });

    let victories = results
        .iter()
        .filter(|result| **result == CombatResult::Victory)
        .count();
    assert_eq!(victories, 1);
    assert_eq!(world.monster_count().expect("count"), 0);
    let characters = query::characters(&world).expect("characters");
    assert_eq!(characters.iter().map(|c| c.xp).sum::<u32>(), 50);
    assert!(characters.iter().all(|c| c.position == lair));
}
