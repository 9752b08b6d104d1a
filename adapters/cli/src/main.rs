#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a Wildlands world.

mod config;
mod seed;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wildlands_core::{CharacterId, MoveError, MoveResult, TileCoord, WorldStore};
use wildlands_system_bootstrap::Bootstrap;
use wildlands_system_combat::Combat;
use wildlands_system_exploration::Exploration;
use wildlands_system_movement::Movement;
use wildlands_system_population::{Config, Population};
use wildlands_world::{query, World};

use crate::config::WorldConfig;

/// Explore and walk a lazily generated monster world.
#[derive(Parser, Debug)]
#[command(name = "wildlands", version, about)]
struct Args {
    /// TOML world configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured global seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter directive such as `debug`; defaults to `RUST_LOG`.
    #[arg(long)]
    log: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the tiles around a coordinate.
    #[command(allow_negative_numbers = true)]
    Explore {
        /// Column of the center.
        x: i32,
        /// Row of the center.
        y: i32,
        /// Chebyshev radius of the neighbourhood.
        #[arg(long, default_value_t = 1)]
        radius: u32,
        /// Leaves the center out of the listing.
        #[arg(long)]
        exclude_center: bool,
    },
    /// Takes random single steps with a character.
    Walk {
        /// Configured character to walk; a new one is recruited when absent.
        #[arg(long)]
        character: Option<u64>,
        /// Name of the recruited character.
        #[arg(long, default_value = "Wanderer")]
        name: String,
        /// Number of steps to attempt.
        #[arg(long, default_value_t = 20)]
        steps: u32,
    },
    /// Shows a single tile.
    #[command(allow_negative_numbers = true)]
    Lookup {
        /// Column of the tile.
        x: i32,
        /// Row of the tile.
        y: i32,
    },
}

/// Outcome of one attempted step of a walk.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepReport {
    step: u32,
    target: TileCoord,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<MoveResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<String>,
}

struct Session {
    world: World,
    seed: u64,
    bootstrap: Bootstrap,
    movement: Movement,
    exploration: Exploration,
}

impl Session {
    fn start(config: &WorldConfig, seed: u64) -> Result<Self> {
        let population = Population::new(Config::new(
            config.population.cap,
            config.population.batch,
        ));
        let bootstrap = Bootstrap::new(population);
        let world = World::new();
        let session = Self {
            world,
            seed,
            bootstrap,
            movement: Movement::new(Combat::new(population)),
            exploration: Exploration::new(),
        };

        let _ = bootstrap
            .register_templates(&session.world, config.templates())
            .context("failed to register monster templates")?;
        if config.pregenerate {
            let _ = bootstrap
                .pregenerate(&session.world, &mut session.rng("pregenerate"))
                .context("failed to pregenerate the map")?;
        }
        let _ = bootstrap
            .seed_population(&session.world, &mut session.rng("population"))
            .context("failed to seed the monster population")?;
        for entry in &config.characters {
            let label = format!("recruit:{}", entry.id.get());
            let _ = bootstrap
                .recruit(&session.world, entry.id, &entry.name, &mut session.rng(&label))
                .with_context(|| format!("failed to recruit character {}", entry.name))?;
        }
        Ok(session)
    }

    fn rng(&self, label: &str) -> ChaCha8Rng {
        seed::request_rng(self.seed, label)
    }

    fn explore(&self, center: TileCoord, radius: u32, include_center: bool) -> Result<()> {
        let label = format!("explore:{}:{}:{radius}", center.x(), center.y());
        let views = self
            .exploration
            .explore(&self.world, center, radius, include_center, &mut self.rng(&label))
            .with_context(|| format!("failed to explore around {center}"))?;
        print_json(&views)
    }

    fn lookup(&self, coord: TileCoord) -> Result<()> {
        let label = format!("lookup:{}:{}", coord.x(), coord.y());
        let view = self
            .exploration
            .tile(&self.world, coord, &mut self.rng(&label))
            .with_context(|| format!("failed to look up tile {coord}"))?;
        print_json(&view)
    }

    fn walk(&self, character: Option<u64>, name: &str, steps: u32) -> Result<()> {
        let walker = match character {
            Some(raw) => CharacterId::new(raw),
            None => self.recruit_walker(name)?,
        };

        for step in 1..=steps {
            let mut rng = self.rng(&format!("walk:{}:{step}", walker.get()));
            let position = self
                .world
                .character(walker)?
                .with_context(|| format!("character {} is not registered", walker.get()))?
                .position;
            let target = TileCoord::new(
                position.x() + rng.gen_range(-1..=1),
                position.y() + rng.gen_range(-1..=1),
            );
            let (result, rejected) =
                match self
                    .movement
                    .move_character(&self.world, walker, target, &mut rng)
                {
                    Ok(result) => (Some(result), None),
                    Err(error @ MoveError::Impassable { .. }) => (None, Some(error.to_string())),
                    Err(error) if error.is_validation() => (None, Some(error.to_string())),
                    Err(error) => {
                        return Err(error).with_context(|| format!("step {step} failed"));
                    }
                };
            print_json(&StepReport {
                step,
                target,
                result,
                rejected,
            })?;
        }

        let view = self
            .exploration
            .vision(&self.world, walker, &mut self.rng("walk:vision"))
            .context("failed to reveal the walker's surroundings")?;
        print_json(&view)
    }

    fn recruit_walker(&self, name: &str) -> Result<CharacterId> {
        let next = next_character_id(
            query::characters(&self.world)?
                .iter()
                .map(|character| character.id.get()),
        )?;
        let id = CharacterId::new(next);
        let character = self
            .bootstrap
            .recruit(&self.world, id, name, &mut self.rng(&format!("recruit:{next}")))
            .with_context(|| format!("failed to recruit {name}"))?;
        info!(
            character = next,
            x = character.position.x(),
            y = character.position.y(),
            "walker recruited"
        );
        Ok(id)
    }
}

/// Identifier one past the highest one in use.
fn next_character_id(ids: impl Iterator<Item = u64>) -> Result<u64> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .context("character identifiers are exhausted")
}

fn print_json<T>(value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let line = serde_json::to_string(value).context("failed to encode response")?;
    println!("{line}");
    Ok(())
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).context("invalid log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

/// Entry point for the Wildlands command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    let seed = args.seed.unwrap_or(config.seed);
    info!(seed, "starting world");
    let session = Session::start(&config, seed)?;

    match args.command {
        Command::Explore {
            x,
            y,
            radius,
            exclude_center,
        } => session.explore(TileCoord::new(x, y), radius, !exclude_center),
        Command::Walk {
            character,
            name,
            steps,
        } => session.walk(character, &name, steps),
        Command::Lookup { x, y } => session.lookup(TileCoord::new(x, y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recruits_take_the_next_free_identifier() {
        assert_eq!(next_character_id(std::iter::empty()).expect("first"), 1);
        assert_eq!(next_character_id([4, 9, 2].into_iter()).expect("next"), 10);
    }

    #[test]
    fn exhausted_identifiers_are_an_error() {
        let error = next_character_id([u64::MAX].into_iter()).expect_err("overflow");
        assert!(error.to_string().contains("exhausted"));
    }

    #[test]
    fn malformed_log_filters_are_reported() {
        let error = init_tracing(Some("wildlands=notalevel")).expect_err("bad level");
        assert!(error.to_string().contains("invalid log filter"));
    }
}
