use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use wildlands_core::{CharacterId, MonsterTemplate};
use wildlands_system_bootstrap::default_templates;
use wildlands_system_population::{DEFAULT_BATCH_SIZE, DEFAULT_POPULATION_CAP};

/// Seed used when neither the configuration nor the command line provide one.
pub(crate) const DEFAULT_SEED: u64 = 0x5749_4c44;

/// World configuration loaded from a TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldConfig {
    /// Global seed every request seed is derived from.
    pub(crate) seed: u64,
    /// Whether the whole map is generated before serving requests.
    pub(crate) pregenerate: bool,
    /// Population limits.
    pub(crate) population: PopulationSection,
    /// Monster templates; the default bestiary when empty.
    pub(crate) templates: Vec<MonsterTemplate>,
    /// Characters recruited at start-up.
    pub(crate) characters: Vec<CharacterEntry>,
}

impl WorldConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read world config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid world config {}", path.display()))
    }

    /// Parses and validates a configuration document.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse world config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    /// Templates to register, falling back to the default bestiary.
    pub(crate) fn templates(&self) -> Vec<MonsterTemplate> {
        if self.templates.is_empty() {
            default_templates()
        } else {
            self.templates.clone()
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.population.batch <= self.population.cap,
            "population batch {} exceeds cap {}",
            self.population.batch,
            self.population.cap
        );
        for template in &self.templates {
            ensure!(
                template.base_hp > 0,
                "template {} must have positive base_hp",
                template.name
            );
        }
        let mut ids: Vec<CharacterId> = self.characters.iter().map(|entry| entry.id).collect();
        ids.sort();
        let before = ids.len();
        ids.dedup();
        ensure!(ids.len() == before, "character ids must be unique");
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            pregenerate: false,
            population: PopulationSection::default(),
            templates: Vec::new(),
            characters: Vec::new(),
        }
    }
}

/// Population limits section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PopulationSection {
    /// Upper bound on live monsters.
    pub(crate) cap: usize,
    /// Missing monsters tolerated before replenishing.
    pub(crate) batch: usize,
}

impl Default for PopulationSection {
    fn default() -> Self {
        Self {
            cap: DEFAULT_POPULATION_CAP,
            batch: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Character recruited when the world starts.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CharacterEntry {
    /// Identifier of the character.
    pub(crate) id: CharacterId,
    /// Display name.
    pub(crate) name: String,
}
