#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wildlands simulation.
//!
//! This crate defines the vocabulary that connects the authoritative world
//! store, the pure systems, and adapters. Systems read and write world state
//! exclusively through the [`store::WorldStore`] trait, receive an explicit
//! random number generator for every operation, and answer requests with the
//! response types declared here. Response types serialize to the wire shape
//! expected by clients.

pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{MonsterChange, MonsterEffect, MonsterRecord, WorldChange, WorldStore};

/// Bounds of the playable grid shared by every component.
pub const WORLD_BOUNDS: WorldBounds = WorldBounds::new(0, 50);

/// Experience a character must bank before gaining a level.
pub const EXPERIENCE_PER_LEVEL: u32 = 1_000;

/// Starting level assigned to freshly registered characters.
pub const RECRUIT_LEVEL: u32 = 1;
/// Starting hit points assigned to freshly registered characters.
pub const RECRUIT_HP: i32 = 100;
/// Starting attack assigned to freshly registered characters.
pub const RECRUIT_ATTACK: i32 = 10;
/// Starting defense assigned to freshly registered characters.
pub const RECRUIT_DEFENSE: i32 = 10;

/// Location of a single tile expressed as signed column and row coordinates.
///
/// Coordinates are signed so that requests pointing outside of the grid can be
/// represented and rejected instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Chebyshev distance, which governs adjacency and vision.
    #[must_use]
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Computes the Manhattan distance, which governs monster levels.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive axis-aligned rectangle of tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRect {
    min: TileCoord,
    max: TileCoord,
}

impl TileRect {
    /// Creates a rectangle spanning `min` through `max`, both inclusive.
    #[must_use]
    pub const fn new(min: TileCoord, max: TileCoord) -> Self {
        Self { min, max }
    }

    /// Upper-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> TileCoord {
        self.min
    }

    /// Lower-right corner of the rectangle.
    #[must_use]
    pub const fn max(&self) -> TileCoord {
        self.max
    }

    /// Reports whether the coordinate lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
    }

    /// Iterates the rectangle row by row: ascending `y`, then ascending `x`.
    pub fn iter_row_major(self) -> impl Iterator<Item = TileCoord> {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| TileCoord::new(x, y)))
    }
}

/// Square bounds of the world grid, inclusive on both ends of both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldBounds {
    min: i32,
    max: i32,
}

impl WorldBounds {
    /// Creates bounds covering `min..=max` on both axes.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Smallest valid coordinate on either axis.
    #[must_use]
    pub const fn min(&self) -> i32 {
        self.min
    }

    /// Largest valid coordinate on either axis.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Reports whether the coordinate lies inside the world.
    #[must_use]
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min && coord.x <= self.max && coord.y >= self.min && coord.y <= self.max
    }

    /// Rectangle covering the whole world.
    #[must_use]
    pub const fn rect(&self) -> TileRect {
        TileRect::new(
            TileCoord::new(self.min, self.min),
            TileCoord::new(self.max, self.max),
        )
    }

    /// Intersects the square of the given Chebyshev radius around `center`
    /// with the world, returning `None` when nothing remains.
    #[must_use]
    pub fn clip(&self, center: TileCoord, radius: u32) -> Option<TileRect> {
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        let min_x = self.min.max(center.x.saturating_sub(radius));
        let max_x = self.max.min(center.x.saturating_add(radius));
        let min_y = self.min.max(center.y.saturating_sub(radius));
        let max_y = self.max.min(center.y.saturating_add(radius));
        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some(TileRect::new(
            TileCoord::new(min_x, min_y),
            TileCoord::new(max_x, max_y),
        ))
    }
}

/// Terrain assigned to a tile when it is first generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileKind {
    /// Open grassland.
    Grass,
    /// Water, impassable on foot.
    Water,
    /// Mountains, impassable on foot.
    Mountain,
    /// Forest.
    Forest,
    /// Town; characters entering one adopt it as their home town.
    Town,
    /// Road.
    Road,
}

impl TileKind {
    /// Reports whether characters and monsters may stand on this terrain.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        !matches!(self, Self::Water | Self::Mountain)
    }
}

/// Atomic cell of the world grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    coord: TileCoord,
    kind: TileKind,
}

impl Tile {
    /// Creates a tile of the given kind.
    #[must_use]
    pub const fn new(coord: TileCoord, kind: TileKind) -> Self {
        Self { coord, kind }
    }

    /// Coordinate that keys the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Terrain of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Traversability derived from the terrain.
    #[must_use]
    pub const fn is_traversable(&self) -> bool {
        self.kind.is_traversable()
    }
}

/// Identifier of a registered monster template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Creates a new template identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier allocated by the store to a spawned monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u64);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Identifier of a character, owned by the external account record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(u64);

impl CharacterId {
    /// Creates a new character identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Static stat block describing a monster species.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    /// Identifier of the template.
    pub id: TemplateId,
    /// Display name of the species.
    pub name: String,
    /// Hit points before the level bonus.
    pub base_hp: i32,
    /// Attack before the level bonus.
    pub base_attack: i32,
    /// Defense before the level bonus.
    pub base_defense: i32,
    /// Experience before the level bonus and reward multiplier.
    pub base_xp: u32,
    /// Reference to the sprite clients draw for the species.
    pub sprite: String,
}

/// Parameters of a monster about to be inserted into the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterSpawn {
    /// Cell the monster will occupy.
    pub position: TileCoord,
    /// Species of the monster.
    pub template: TemplateId,
    /// Level fixed at spawn time.
    pub level: u32,
    /// Maximum hit points, `base_hp + level`.
    pub max_hp: i32,
}

impl MonsterSpawn {
    /// Derives spawn parameters for `template` at `position` and `level`.
    #[must_use]
    pub fn new(position: TileCoord, template: &MonsterTemplate, level: u32) -> Self {
        Self {
            position,
            template: template.id,
            level,
            max_hp: template.base_hp.saturating_add(level_bonus(level)),
        }
    }

    /// Materialises the spawn at full health under the allocated identifier.
    #[must_use]
    pub const fn into_instance(self, id: MonsterId) -> MonsterInstance {
        MonsterInstance {
            id,
            position: self.position,
            template: self.template,
            level: self.level,
            current_hp: self.max_hp,
            max_hp: self.max_hp,
        }
    }
}

/// Spawned, stateful occurrence of a monster template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterInstance {
    /// Identifier allocated by the store.
    pub id: MonsterId,
    /// Cell occupied by the monster.
    pub position: TileCoord,
    /// Species of the monster.
    pub template: TemplateId,
    /// Level fixed at spawn time.
    pub level: u32,
    /// Remaining hit points.
    pub current_hp: i32,
    /// Hit points at spawn time.
    pub max_hp: i32,
}

impl MonsterInstance {
    /// Attack derived from the template and level.
    #[must_use]
    pub fn attack(&self, template: &MonsterTemplate) -> i32 {
        template.base_attack.saturating_add(level_bonus(self.level))
    }

    /// Defense derived from the template and level.
    #[must_use]
    pub fn defense(&self, template: &MonsterTemplate) -> i32 {
        template.base_defense.saturating_add(level_bonus(self.level))
    }

    /// Experience granted to the character that defeats the monster.
    #[must_use]
    pub fn experience_reward(&self, template: &MonsterTemplate) -> u32 {
        template.base_xp.saturating_add(self.level).saturating_mul(10)
    }
}

/// A player's persistent avatar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Identifier owned by the account record.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Current cell.
    pub position: TileCoord,
    /// Respawn cell used after a defeat.
    pub home_town: TileCoord,
    /// Current level.
    pub level: u32,
    /// Experience banked toward the next level.
    pub xp: u32,
    /// Remaining hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Attack.
    pub attack: i32,
    /// Defense.
    pub defense: i32,
}

impl Character {
    /// Builds a character with registration defaults, homed at `spawn`.
    #[must_use]
    pub fn recruit(id: CharacterId, name: impl Into<String>, spawn: TileCoord) -> Self {
        Self {
            id,
            name: name.into(),
            position: spawn,
            home_town: spawn,
            level: RECRUIT_LEVEL,
            xp: 0,
            hp: RECRUIT_HP,
            max_hp: RECRUIT_HP,
            attack: RECRUIT_ATTACK,
            defense: RECRUIT_DEFENSE,
        }
    }
}

/// Read-time snapshot of a monster as presented to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterSnapshot {
    /// Identifier of the monster.
    pub id: MonsterId,
    /// Species name.
    pub name: String,
    /// Sprite reference of the species.
    pub sprite: String,
    /// Level fixed at spawn time.
    pub level: u32,
    /// Remaining hit points, never negative.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Attack derived from the template and level.
    pub attack: i32,
    /// Defense derived from the template and level.
    pub defense: i32,
    /// Column of the monster.
    pub x: i32,
    /// Row of the monster.
    pub y: i32,
}

impl MonsterSnapshot {
    /// Captures the monster together with the stats derived from its template.
    #[must_use]
    pub fn capture(monster: &MonsterInstance, template: &MonsterTemplate) -> Self {
        Self {
            id: monster.id,
            name: template.name.clone(),
            sprite: template.sprite.clone(),
            level: monster.level,
            hp: monster.current_hp.max(0),
            max_hp: monster.max_hp,
            attack: monster.attack(template),
            defense: monster.defense(template),
            x: monster.position.x(),
            y: monster.position.y(),
        }
    }
}

/// Result reported for a resolved combat round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombatResult {
    /// Both sides survived the round.
    None,
    /// The monster was defeated.
    Victory,
    /// The character was defeated and sent home.
    Defeat,
}

/// Post-combat snapshot of the character and its opponent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatOutcome {
    /// Result of the round.
    pub result: CombatResult,
    /// Character level after leveling.
    pub level: u32,
    /// Character experience after leveling.
    pub xp: u32,
    /// Character attack.
    pub attack: i32,
    /// Character defense.
    pub defense: i32,
    /// Character hit points.
    pub hp: i32,
    /// Character maximum hit points.
    pub max_hp: i32,
    /// Opponent snapshot, if any.
    pub monster: Option<MonsterSnapshot>,
}

impl CombatOutcome {
    /// Captures the character's stats alongside the round's result.
    #[must_use]
    pub fn capture(
        result: CombatResult,
        character: &Character,
        monster: Option<MonsterSnapshot>,
    ) -> Self {
        Self {
            result,
            level: character.level,
            xp: character.xp,
            attack: character.attack,
            defense: character.defense,
            hp: character.hp,
            max_hp: character.max_hp,
            monster,
        }
    }
}

/// Response to a movement request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    /// Column the character stands on after the request.
    pub x: i32,
    /// Row the character stands on after the request.
    pub y: i32,
    /// Combat report when the target was occupied by a monster.
    pub combat_outcome: Option<CombatOutcome>,
}

impl MoveResult {
    /// Response for a plain move that did not involve combat.
    #[must_use]
    pub const fn arrived(position: TileCoord) -> Self {
        Self {
            x: position.x(),
            y: position.y(),
            combat_outcome: None,
        }
    }

    /// Response for a move that was resolved through combat.
    #[must_use]
    pub const fn fought(position: TileCoord, outcome: CombatOutcome) -> Self {
        Self {
            x: position.x(),
            y: position.y(),
            combat_outcome: Some(outcome),
        }
    }

    /// Position of the character after the request.
    #[must_use]
    pub const fn position(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// Result of the combat, or [`CombatResult::None`] for plain moves.
    #[must_use]
    pub fn combat_result(&self) -> CombatResult {
        self.combat_outcome
            .as_ref()
            .map_or(CombatResult::None, |outcome| outcome.result)
    }
}

/// Tile annotated with its occupant for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    /// Column of the tile.
    pub x: i32,
    /// Row of the tile.
    pub y: i32,
    /// Terrain of the tile.
    #[serde(rename = "type")]
    pub kind: TileKind,
    /// Whether the tile can be entered.
    pub traversable: bool,
    /// Monster standing on the tile, if any.
    pub monster: Option<MonsterSnapshot>,
}

impl TileView {
    /// Annotates `tile` with its optional occupant.
    #[must_use]
    pub fn new(tile: Tile, monster: Option<MonsterSnapshot>) -> Self {
        Self {
            x: tile.coord().x(),
            y: tile.coord().y(),
            kind: tile.kind(),
            traversable: tile.is_traversable(),
            monster,
        }
    }

    /// Coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }
}

/// Response to an exploration request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationView {
    /// Column the exploration was centred on.
    pub center_x: i32,
    /// Row the exploration was centred on.
    pub center_y: i32,
    /// Annotated tiles in row-major order.
    pub explored: Vec<TileView>,
}

/// Failures reported by a [`WorldStore`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A lock guarding world state was poisoned by a panicking writer.
    #[error("world store lock `{0}` was poisoned")]
    Poisoned(&'static str),
    /// The monster changed after it was read; the caller should re-read it.
    #[error("monster {} changed since it was read", monster.get())]
    MonsterConflict {
        /// Monster whose version no longer matches.
        monster: MonsterId,
    },
    /// A monster already stands on the cell.
    #[error("cell {coord} is already occupied")]
    CellOccupied {
        /// Contested cell.
        coord: TileCoord,
    },
    /// The live population already reached the cap.
    #[error("monster population already holds {cap} monsters")]
    PopulationFull {
        /// Cap that was enforced.
        cap: usize,
    },
    /// The referenced template is not registered.
    #[error("monster template {} is not registered", template.get())]
    UnknownTemplate {
        /// Missing template.
        template: TemplateId,
    },
    /// The referenced character is not registered.
    #[error("character {} is not registered", character.get())]
    UnknownCharacter {
        /// Missing character.
        character: CharacterId,
    },
    /// A character with the same identifier is already registered.
    #[error("character {} is already registered", character.get())]
    DuplicateCharacter {
        /// Duplicate identifier.
        character: CharacterId,
    },
}

/// Reasons a movement request is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The target lies outside of the world.
    #[error("target {target} lies outside of the world")]
    OutOfBounds {
        /// Requested target.
        target: TileCoord,
    },
    /// The target is more than one step away.
    #[error("target {to} is not adjacent to {from}")]
    NotAdjacent {
        /// Character position.
        from: TileCoord,
        /// Requested target.
        to: TileCoord,
    },
    /// The target terrain cannot be entered.
    #[error("target {target} is impassable {kind:?}")]
    Impassable {
        /// Requested target.
        target: TileCoord,
        /// Terrain of the target.
        kind: TileKind,
    },
    /// No character is registered under the identifier.
    #[error("character {} not found", character.get())]
    CharacterNotFound {
        /// Unknown identifier.
        character: CharacterId,
    },
    /// The world store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MoveError {
    /// Reports whether the error is a request validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::NotAdjacent { .. })
    }
}

/// Reasons a tile or exploration lookup is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The coordinate lies outside of the world.
    #[error("coordinate {coord} lies outside of the world")]
    OutOfBounds {
        /// Requested coordinate.
        coord: TileCoord,
    },
    /// No character is registered under the identifier.
    #[error("character {} not found", character.get())]
    CharacterNotFound {
        /// Unknown identifier.
        character: CharacterId,
    },
    /// The world store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn level_bonus(level: u32) -> i32 {
    i32::try_from(level).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slime() -> MonsterTemplate {
        MonsterTemplate {
            id: TemplateId::new(1),
            name: "Slime".to_owned(),
            base_hp: 10,
            base_attack: 8,
            base_defense: 6,
            base_xp: 5,
            sprite: "slime.png".to_owned(),
        }
    }

    #[test]
    fn distances_match_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(origin.chebyshev_distance(destination), 3);
        assert_eq!(destination.chebyshev_distance(origin), 3);
    }

    #[test]
    fn water_and_mountain_are_the_only_impassable_kinds() {
        let impassable: Vec<TileKind> = [
            TileKind::Grass,
            TileKind::Water,
            TileKind::Mountain,
            TileKind::Forest,
            TileKind::Town,
            TileKind::Road,
        ]
        .into_iter()
        .filter(|kind| !kind.is_traversable())
        .collect();
        assert_eq!(impassable, vec![TileKind::Water, TileKind::Mountain]);
    }

    #[test]
    fn world_bounds_are_inclusive() {
        assert!(WORLD_BOUNDS.contains(TileCoord::new(0, 0)));
        assert!(WORLD_BOUNDS.contains(TileCoord::new(50, 50)));
        assert!(!WORLD_BOUNDS.contains(TileCoord::new(51, 0)));
        assert!(!WORLD_BOUNDS.contains(TileCoord::new(0, -1)));
    }

    #[test]
    fn clip_trims_neighbourhood_at_corner() {
        let rect = WORLD_BOUNDS
            .clip(TileCoord::new(0, 50), 1)
            .expect("corner neighbourhood intersects the world");
        assert_eq!(rect.min(), TileCoord::new(0, 49));
        assert_eq!(rect.max(), TileCoord::new(1, 50));
        assert_eq!(rect.iter_row_major().count(), 4);
    }

    #[test]
    fn clip_outside_world_is_empty() {
        assert!(WORLD_BOUNDS.clip(TileCoord::new(80, 80), 2).is_none());
    }

    #[test]
    fn row_major_iteration_orders_rows_first() {
        let rect = TileRect::new(TileCoord::new(2, 5), TileCoord::new(3, 6));
        let order: Vec<TileCoord> = rect.iter_row_major().collect();
        assert_eq!(
            order,
            vec![
                TileCoord::new(2, 5),
                TileCoord::new(3, 5),
                TileCoord::new(2, 6),
                TileCoord::new(3, 6),
            ]
        );
    }

    #[test]
    fn spawn_adds_level_to_base_hp() {
        let template = slime();
        let spawn = MonsterSpawn::new(TileCoord::new(3, 4), &template, 7);
        let monster = spawn.into_instance(MonsterId::new(9));
        assert_eq!(monster.max_hp, 17);
        assert_eq!(monster.current_hp, 17);
        assert_eq!(monster.attack(&template), 15);
        assert_eq!(monster.defense(&template), 13);
        assert_eq!(monster.experience_reward(&template), 120);
    }

    #[test]
    fn snapshot_never_reports_negative_hp() {
        let template = slime();
        let mut monster = MonsterSpawn::new(TileCoord::new(1, 1), &template, 0)
            .into_instance(MonsterId::new(1));
        monster.current_hp = -4;
        assert_eq!(MonsterSnapshot::capture(&monster, &template).hp, 0);
    }

    #[test]
    fn move_result_serializes_to_wire_shape() {
        let character = Character::recruit(CharacterId::new(1), "Ayla", TileCoord::new(4, 4));
        let template = slime();
        let monster = MonsterSpawn::new(TileCoord::new(5, 4), &template, 2)
            .into_instance(MonsterId::new(12));
        let outcome = CombatOutcome::capture(
            CombatResult::Victory,
            &character,
            Some(MonsterSnapshot::capture(&monster, &template)),
        );
        let result = MoveResult::fought(TileCoord::new(5, 4), outcome);

        let json = serde_json::to_value(&result).expect("serialize move result");
        assert_eq!(json["x"], 5);
        assert_eq!(json["combatOutcome"]["result"], "VICTORY");
        assert_eq!(json["combatOutcome"]["maxHp"], 100);
        assert_eq!(json["combatOutcome"]["monster"]["id"], 12);
        assert_eq!(json["combatOutcome"]["monster"]["maxHp"], 12);
        assert_eq!(json["combatOutcome"]["monster"]["attack"], 10);

        let plain = serde_json::to_value(MoveResult::arrived(TileCoord::new(1, 2)))
            .expect("serialize plain move");
        assert!(plain["combatOutcome"].is_null());
    }

    #[test]
    fn tile_view_serializes_type_field() {
        let view = TileView::new(Tile::new(TileCoord::new(2, 3), TileKind::Forest), None);
        let json = serde_json::to_value(&view).expect("serialize tile view");
        assert_eq!(json["type"], "FOREST");
        assert_eq!(json["traversable"], true);
        assert!(json["monster"].is_null());
    }

    #[test]
    fn validation_errors_are_classified() {
        let coord = TileCoord::new(60, 0);
        assert!(MoveError::OutOfBounds { target: coord }.is_validation());
        assert!(!MoveError::Impassable {
            target: coord,
            kind: TileKind::Water
        }
        .is_validation());
    }
}
