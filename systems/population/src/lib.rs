#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Monster population maintenance.
//!
//! Keeps the number of live monsters at or below a configured cap and spawns
//! new ones into empty, walkable, non-town cells. Monster levels grow with the
//! Manhattan distance to the nearest town.

use rand::Rng;
use tracing::{debug, warn};
use wildlands_core::{
    MonsterSpawn, MonsterTemplate, StoreError, TileCoord, TileKind, WorldStore, WORLD_BOUNDS,
};
use wildlands_system_tile_generation::TileGenerator;

/// Default upper bound on live monsters.
pub const DEFAULT_POPULATION_CAP: usize = 300;
/// Default number of missing monsters tolerated before replenishing.
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Default number of coordinate rolls a single spawn attempt may use.
pub const DEFAULT_MAX_PLACEMENT_ROLLS: u32 = 10_000;

/// Configuration parameters required to construct the population system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    cap: usize,
    batch_size: usize,
    max_placement_rolls: u32,
}

impl Config {
    /// Creates a configuration with the provided cap and replenish batch size.
    #[must_use]
    pub const fn new(cap: usize, batch_size: usize) -> Self {
        Self {
            cap,
            batch_size,
            max_placement_rolls: DEFAULT_MAX_PLACEMENT_ROLLS,
        }
    }

    /// Overrides how many coordinates one spawn attempt may roll.
    #[must_use]
    pub const fn with_max_placement_rolls(mut self, rolls: u32) -> Self {
        self.max_placement_rolls = rolls;
        self
    }

    /// Upper bound on live monsters.
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Number of missing monsters tolerated before replenishing.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Live count below which [`Population::replenish`] spawns.
    #[must_use]
    pub const fn replenish_threshold(&self) -> usize {
        self.cap.saturating_sub(self.batch_size)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_POPULATION_CAP, DEFAULT_BATCH_SIZE)
    }
}

/// System that spawns monsters and keeps the population topped up.
#[derive(Clone, Copy, Debug, Default)]
pub struct Population {
    config: Config,
    tiles: TileGenerator,
}

impl Population {
    /// Creates a new population system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            tiles: TileGenerator::new(),
        }
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Spawns up to `count` monsters and returns how many were created.
    ///
    /// Spawning stops early once the cap is reached. Without registered
    /// templates nothing is spawned and no error is reported.
    pub fn spawn<S, R>(&self, store: &S, count: usize, rng: &mut R) -> Result<usize, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let templates = store.templates()?;
        if templates.is_empty() {
            debug!(requested = count, "no monster templates registered, skipping spawn");
            return Ok(0);
        }

        let mut spawned = 0;
        'attempts: for _ in 0..count {
            for _ in 0..self.config.max_placement_rolls {
                let coord = random_coord(rng);
                if !self.is_spawnable(store, coord, rng)? {
                    continue;
                }

                let level = self
                    .tiles
                    .nearest_town_distance(store, coord)?
                    .unwrap_or(0);
                let template = pick_template(&templates, rng);
                match store.insert_monster(MonsterSpawn::new(coord, template, level), self.config.cap)
                {
                    Ok(monster) => {
                        debug!(
                            monster = monster.id.get(),
                            template = template.id.get(),
                            level,
                            x = coord.x(),
                            y = coord.y(),
                            "monster spawned"
                        );
                        spawned += 1;
                        continue 'attempts;
                    }
                    Err(StoreError::CellOccupied { .. }) => continue,
                    Err(StoreError::PopulationFull { cap }) => {
                        debug!(cap, spawned, "population cap reached");
                        break 'attempts;
                    }
                    Err(error) => return Err(error),
                }
            }
            warn!(
                rolls = self.config.max_placement_rolls,
                "no spawnable cell found, abandoning spawn attempt"
            );
        }

        Ok(spawned)
    }

    /// Tops the population up to the cap once it fell below the threshold.
    ///
    /// Returns the number of monsters spawned.
    pub fn replenish<S, R>(&self, store: &S, rng: &mut R) -> Result<usize, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let live = store.monster_count()?;
        if live >= self.config.replenish_threshold() {
            return Ok(0);
        }

        let missing = self.config.cap.saturating_sub(live);
        debug!(live, missing, "replenishing monster population");
        self.spawn(store, missing, rng)
    }

    fn is_spawnable<S, R>(&self, store: &S, coord: TileCoord, rng: &mut R) -> Result<bool, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        let tile = self.tiles.generate(store, coord, rng)?;
        if !tile.is_traversable() || tile.kind() == TileKind::Town {
            return Ok(false);
        }
        if store.is_character_at(coord)? {
            return Ok(false);
        }
        Ok(store.monster_at(coord)?.is_none())
    }
}

fn random_coord<R>(rng: &mut R) -> TileCoord
where
    R: Rng + ?Sized,
{
    let axis = WORLD_BOUNDS.min()..=WORLD_BOUNDS.max();
    TileCoord::new(rng.gen_range(axis.clone()), rng.gen_range(axis))
}

fn pick_template<'a, R>(templates: &'a [MonsterTemplate], rng: &mut R) -> &'a MonsterTemplate
where
    R: Rng + ?Sized,
{
    debug_assert!(!templates.is_empty(), "pick_template requires templates");
    &templates[rng.gen_range(0..templates.len())]
}
