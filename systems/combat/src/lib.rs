#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-round stochastic combat between a character and a monster.
//!
//! Both sides strike simultaneously using their pre-round stats. A round is
//! computed on local copies and committed as one version-guarded change, so
//! two attackers racing for the same monster can never both claim the kill.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::{debug, info, warn};
use wildlands_core::{
    Character, CombatOutcome, CombatResult, MonsterChange, MonsterEffect, MonsterInstance,
    MonsterRecord, MonsterSnapshot, MonsterTemplate, MoveResult, StoreError, TileCoord,
    WorldChange, WorldStore, EXPERIENCE_PER_LEVEL,
};
use wildlands_system_population::Population;

/// Range of the random multiplier drawn for each side.
pub const MULTIPLIER_RANGE: RangeInclusive<f64> = 0.8..=1.25;

/// Share of the monster's defense subtracted from the character's attack.
pub const DEFENSE_MITIGATION: f64 = 0.5;

/// Random multipliers applied to each side's raw damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Multipliers {
    /// Multiplier applied to the character's damage.
    pub character: f64,
    /// Multiplier applied to the monster's damage.
    pub monster: f64,
}

impl Multipliers {
    /// Draws two independent multipliers from [`MULTIPLIER_RANGE`].
    pub fn roll<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            character: rng.gen_range(MULTIPLIER_RANGE),
            monster: rng.gen_range(MULTIPLIER_RANGE),
        }
    }
}

/// Damage dealt by each side during a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchange {
    /// Damage the character deals to the monster.
    pub character_damage: i32,
    /// Damage the monster deals to the character.
    pub monster_damage: i32,
}

impl Exchange {
    /// Computes both sides' damage from pre-round stats.
    #[must_use]
    pub fn compute(
        character: &Character,
        monster: &MonsterInstance,
        template: &MonsterTemplate,
        multipliers: Multipliers,
    ) -> Self {
        let character_raw =
            f64::from(character.attack) - DEFENSE_MITIGATION * f64::from(monster.defense(template));
        let monster_raw = f64::from(monster.attack(template)) - f64::from(character.defense);
        Self {
            character_damage: scaled_damage(character_raw, multipliers.character),
            monster_damage: scaled_damage(monster_raw, multipliers.monster),
        }
    }
}

/// Adds `xp` to the character and applies every level it unlocks.
///
/// Each level raises attack, defense and maximum hit points by one and fully
/// heals the character. Returns the number of levels gained.
pub fn grant_experience(character: &mut Character, xp: u32) -> u32 {
    character.xp = character.xp.saturating_add(xp);
    let mut gained = 0;
    while character.xp >= EXPERIENCE_PER_LEVEL {
        character.xp -= EXPERIENCE_PER_LEVEL;
        character.level = character.level.saturating_add(1);
        character.attack = character.attack.saturating_add(1);
        character.defense = character.defense.saturating_add(1);
        character.max_hp = character.max_hp.saturating_add(1);
        character.hp = character.max_hp;
        gained += 1;
    }
    gained
}

/// State of both combatants after a round, before it is committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    /// Reported result.
    pub result: CombatResult,
    /// Character after damage, rewards, leveling and respawn.
    pub character: Character,
    /// Monster after damage.
    pub monster: MonsterInstance,
    /// Effect of the round on the monster.
    pub effect: MonsterEffect,
    /// Damage dealt by each side.
    pub exchange: Exchange,
}

impl Round {
    /// Plays one round of `character` attacking `monster` standing on `target`.
    ///
    /// A defeated monster rewards the character and lets it step onto
    /// `target`. A defeated character is healed and sent to its home town;
    /// when both fall in the same round the defeat is reported.
    #[must_use]
    pub fn play(
        character: &Character,
        monster: &MonsterInstance,
        template: &MonsterTemplate,
        target: TileCoord,
        multipliers: Multipliers,
    ) -> Self {
        let exchange = Exchange::compute(character, monster, template, multipliers);
        let mut character = character.clone();
        let mut monster = monster.clone();
        monster.current_hp = monster.current_hp.saturating_sub(exchange.character_damage);
        character.hp = character.hp.saturating_sub(exchange.monster_damage);

        let mut result = CombatResult::None;
        let effect = if monster.current_hp <= 0 {
            let _ = grant_experience(&mut character, monster.experience_reward(template));
            character.position = target;
            result = CombatResult::Victory;
            MonsterEffect::Slain
        } else {
            MonsterEffect::Wounded {
                current_hp: monster.current_hp,
            }
        };

        if character.hp <= 0 {
            character.hp = character.max_hp;
            character.position = character.home_town;
            result = CombatResult::Defeat;
        }

        Self {
            result,
            character,
            monster,
            effect,
            exchange,
        }
    }
}

/// What became of an engagement once it reached the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Engagement {
    /// The round was committed.
    Resolved(MoveResult),
    /// The monster disappeared before the round could be committed.
    Vacated,
}

/// System that resolves combat rounds and commits their effects.
#[derive(Clone, Copy, Debug, Default)]
pub struct Combat {
    population: Population,
}

impl Combat {
    /// Creates a combat system that replenishes through `population`.
    #[must_use]
    pub const fn new(population: Population) -> Self {
        Self { population }
    }

    /// Resolves a round between `character` and the monster in `record`.
    ///
    /// When another request changed the monster first, the round is replayed
    /// against the monster's current state; when the monster is gone the
    /// engagement reports [`Engagement::Vacated`]. After a committed victory
    /// the population is replenished; replenishment failures are logged and
    /// never affect the returned outcome.
    pub fn resolve<S, R>(
        &self,
        store: &S,
        character: &Character,
        mut record: MonsterRecord,
        target: TileCoord,
        rng: &mut R,
    ) -> Result<Engagement, StoreError>
    where
        S: WorldStore + ?Sized,
        R: Rng + ?Sized,
    {
        loop {
            let template =
                store
                    .template(record.instance.template)?
                    .ok_or(StoreError::UnknownTemplate {
                        template: record.instance.template,
                    })?;
            let round = Round::play(
                character,
                &record.instance,
                &template,
                target,
                Multipliers::roll(rng),
            );
            let change = WorldChange::with_monster(
                round.character.clone(),
                MonsterChange {
                    monster: record.instance.id,
                    expected_version: record.version,
                    effect: round.effect,
                },
            );

            match store.commit(change) {
                Ok(()) => {
                    report(&round);
                    if round.result == CombatResult::Victory {
                        if let Err(error) = self.population.replenish(store, rng) {
                            warn!(%error, "monster population replenishment failed");
                        }
                    }
                    let snapshot = MonsterSnapshot::capture(&round.monster, &template);
                    let outcome =
                        CombatOutcome::capture(round.result, &round.character, Some(snapshot));
                    return Ok(Engagement::Resolved(MoveResult::fought(
                        round.character.position,
                        outcome,
                    )));
                }
                Err(StoreError::MonsterConflict { monster }) => {
                    debug!(
                        character = character.id.get(),
                        monster = monster.get(),
                        "monster changed during combat, re-reading"
                    );
                    match store.monster(monster)? {
                        Some(fresh) => record = fresh,
                        None => return Ok(Engagement::Vacated),
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }
}

fn report(round: &Round) {
    match round.result {
        CombatResult::Victory => info!(
            character = round.character.id.get(),
            monster = round.monster.id.get(),
            level = round.character.level,
            xp = round.character.xp,
            "monster defeated"
        ),
        CombatResult::Defeat => info!(
            character = round.character.id.get(),
            monster = round.monster.id.get(),
            x = round.character.home_town.x(),
            y = round.character.home_town.y(),
            "character defeated, respawning at home town"
        ),
        CombatResult::None => debug!(
            character = round.character.id.get(),
            monster = round.monster.id.get(),
            dealt = round.exchange.character_damage,
            taken = round.exchange.monster_damage,
            "combat round exchanged"
        ),
    }
}

fn scaled_damage(raw: f64, multiplier: f64) -> i32 {
    // Float-to-int `as` saturates, so extreme stats cannot wrap.
    (raw * multiplier).round().max(0.0) as i32
}
