#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that prepares a world and places newly registered
//! characters.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};
use wildlands_core::{
    Character, CharacterId, MonsterTemplate, StoreError, TemplateId, TileCoord, TileKind,
    WorldStore, WORLD_BOUNDS,
};
use wildlands_system_population::Population;
use wildlands_system_tile_generation::TileGenerator;

/// Default number of coordinates rolled while looking for a spawn town.
pub const DEFAULT_SPAWN_ROLLS: u32 = 100_000;

/// Reasons bootstrapping can fail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// No town was rolled within the allotted attempts.
    #[error("no town tile found after {rolls} rolls")]
    NoSpawnTown {
        /// Number of rolls attempted.
        rolls: u32,
    },
    /// The world store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Bestiary used when no template table is configured.
#[must_use]
pub fn default_templates() -> Vec<MonsterTemplate> {
    [
        (1, "Slime", 10, 8, 6, 5),
        (2, "Goblin", 18, 11, 7, 8),
        (3, "Wolf", 24, 13, 8, 10),
        (4, "Skeleton", 30, 15, 11, 14),
        (5, "Troll", 55, 19, 14, 25),
    ]
    .into_iter()
    .map(
        |(id, name, base_hp, base_attack, base_defense, base_xp)| MonsterTemplate {
            id: TemplateId::new(id),
            name: name.to_owned(),
            base_hp,
            base_attack,
            base_defense,
            base_xp,
            sprite: format!("monsters/{}.png", name.to_lowercase()),
        },
    )
    .collect()
}

/// Prepares worlds and spawns characters into them.
#[derive(Clone, Copy, Debug)]
pub struct Bootstrap {
    tiles: TileGenerator,
    population: Population,
    spawn_rolls: u32,
}

impl Bootstrap {
    /// Creates a bootstrap system that seeds monsters through `population`.
    #[must_use]
    pub const fn new(population: Population) -> Self {
        Self {
            tiles: TileGenerator::new(),
            population,
            spawn_rolls: DEFAULT_SPAWN_ROLLS,
        }
    }

    /// Overrides how many coordinates [`Self::find_spawn_town`] may roll.
    #[must_use]
    pub const fn with_spawn_rolls(mut self, rolls: u32) -> Self {
        self.spawn_rolls = rolls;
        self
    }

    /// Registers every template and returns how many were provided.
    pub fn register_templates<S, I>(&self, store: &S, templates: I) -> Result<usize, StoreError>
    where
        S: WorldStore + ?Sized,
        I: IntoIterator<Item = MonsterTemplate>,
    {
        let mut registered = 0;
        for template in templates {
            debug!(template = template.id.get(), species = %template.name, "template registered");
            store.register_template(template)?;
            registered += 1;
        }
        Ok(registered)
    }

    /// Generates the whole map up front.
    pub fn pregenerate<S, R>(&self, store: &S, rng: &mut R) -> Result<usize, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let visited = self.tiles.generate_all(store, rng)?;
        let towns = store.town_coords()?.len();
        info!(tiles = visited, towns, "world pregenerated");
        Ok(visited)
    }

    /// Fills the population up to its cap.
    pub fn seed_population<S, R>(&self, store: &S, rng: &mut R) -> Result<usize, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let missing = self
            .population
            .config()
            .cap()
            .saturating_sub(store.monster_count()?);
        let spawned = self.population.spawn(store, missing, rng)?;
        info!(spawned, "monster population seeded");
        Ok(spawned)
    }

    /// Rolls random coordinates until one resolves to a town tile.
    ///
    /// Rolled tiles are generated as a side effect.
    pub fn find_spawn_town<S, R>(&self, store: &S, rng: &mut R) -> Result<TileCoord, BootstrapError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let axis = WORLD_BOUNDS.min()..=WORLD_BOUNDS.max();
        for _ in 0..self.spawn_rolls {
            let coord = TileCoord::new(rng.gen_range(axis.clone()), rng.gen_range(axis.clone()));
            if self.tiles.generate(store, coord, rng)?.kind() == TileKind::Town {
                return Ok(coord);
            }
        }
        Err(BootstrapError::NoSpawnTown {
            rolls: self.spawn_rolls,
        })
    }

    /// Registers a new character homed in a randomly chosen town.
    pub fn recruit<S, R>(
        &self,
        store: &S,
        id: CharacterId,
        name: &str,
        rng: &mut R,
    ) -> Result<Character, BootstrapError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let spawn = self.find_spawn_town(store, rng)?;
        let character = Character::recruit(id, name, spawn);
        store.insert_character(character.clone())?;
        info!(
            character = id.get(),
            character_name = name,
            x = spawn.x(),
            y = spawn.y(),
            "character recruited"
        );
        Ok(character)
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new(Population::default())
    }
}
