//! Scenario loading and configuration.
//!
//! A [`Scenario`] describes the universe to generate and the AI players to
//! seed into it. A [`HeadlessConfig`] describes how cycles are run: turn
//! regeneration, batching, prices and the core tuning. Both are RON
//! documents in which every field may be omitted.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use starlane_core::combatant::{CombatantRecord, CombatantSnapshot};
use starlane_core::config::CoreConfig;
use starlane_core::error::CoreError;
use starlane_core::personality::Personality;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A combatant record failed validation.
    #[error("Invalid combatant: {0}")]
    InvalidCombatant(#[from] CoreError),
    /// The scenario cannot be generated as described.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, ScenarioError> {
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(ron::from_str(&contents)?)
}

/// Shape of the generated universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseSetup {
    /// Number of sectors; sector 0 always holds the special port.
    pub sectors: u32,
    /// Random warps added on top of the ring that links every sector.
    pub extra_warps: u32,
    /// Chance, in percent, that a sector other than 0 gets a commodity port.
    pub port_percent: u32,
    /// Unclaimed planets scattered over the universe.
    pub planets: u32,
    /// Starting stock of every commodity port.
    pub port_stock: u64,
}

impl Default for UniverseSetup {
    fn default() -> Self {
        Self {
            sectors: 30,
            extra_warps: 15,
            port_percent: 40,
            planets: 12,
            port_stock: 5000,
        }
    }
}

/// Starting state of one AI player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    /// Display name.
    pub name: String,
    /// Decision heuristic.
    pub personality: Personality,
    /// Starting credits.
    pub credits: u64,
    /// Starting level on every tech axis.
    pub tech_level: u32,
    /// Starting turns.
    pub turns: u32,
    /// Whether the ship carries an emergency warp device.
    pub emergency_warp: bool,
    /// Starting sector; `None` picks one from the seed.
    pub sector: Option<u32>,
}

impl Default for PlayerSetup {
    fn default() -> Self {
        Self {
            name: "AI".to_string(),
            personality: Personality::Balanced,
            credits: 10_000,
            tech_level: 1,
            turns: 100,
            emergency_warp: false,
            sector: None,
        }
    }
}

impl PlayerSetup {
    /// A player with the given name and personality.
    pub fn new(name: impl Into<String>, personality: Personality) -> Self {
        Self {
            name: name.into(),
            personality,
            ..Default::default()
        }
    }
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Seed for universe generation and every per-player generator.
    pub seed: u64,
    /// Universe shape.
    pub universe: UniverseSetup,
    /// AI players.
    pub players: Vec<PlayerSetup>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Default Galaxy".to_string(),
            description: "One player of each personality in a small galaxy".to_string(),
            seed: 42,
            universe: UniverseSetup::default(),
            players: Personality::ALL
                .iter()
                .map(|&personality| PlayerSetup::new(format!("{personality} AI"), personality))
                .collect(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        load_ron(path.as_ref())
    }

    /// Parse a scenario from a RON string.
    pub fn from_ron_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(ron::from_str(s)?)
    }

    /// Two traders in a tiny galaxy; useful for quick runs.
    pub fn trade_lane() -> Self {
        Self {
            name: "Trade Lane".to_string(),
            description: "Two traders working a ten-sector lane".to_string(),
            seed: 7,
            universe: UniverseSetup {
                sectors: 10,
                extra_warps: 2,
                port_percent: 80,
                planets: 2,
                ..Default::default()
            },
            players: vec![
                PlayerSetup::new("Hauler", Personality::Trader),
                PlayerSetup::new("Broker", Personality::Trader),
            ],
        }
    }

    /// Look up a built-in scenario by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "default" | "galaxy" => Some(Self::default()),
            "trade_lane" => Some(Self::trade_lane()),
            _ => None,
        }
    }

    /// Check that the universe can be generated.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.universe.sectors == 0 {
            return Err(ScenarioError::Invalid("a universe needs at least one sector".into()));
        }
        if self.universe.port_percent > 100 {
            return Err(ScenarioError::Invalid(format!(
                "port_percent {} exceeds 100",
                self.universe.port_percent
            )));
        }
        for player in &self.players {
            if let Some(sector) = player.sector {
                if sector >= self.universe.sectors {
                    return Err(ScenarioError::Invalid(format!(
                        "{} starts in sector {sector}, which does not exist",
                        player.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Prices the headless universe charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyRules {
    /// Credits per fighter.
    pub fighter_price: u64,
    /// Credits per torpedo.
    pub torpedo_price: u64,
    /// Credits per armor point.
    pub armor_price: u64,
    /// Credits per planet development.
    pub develop_cost: u64,
    /// Fighters added per development.
    pub fighters_per_development: u64,
    /// Energy added per development.
    pub energy_per_development: u64,
    /// Development level at which a planet gets its base.
    pub base_development: u32,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            fighter_price: 50,
            torpedo_price: 20,
            armor_price: 10,
            develop_cost: 1000,
            fighters_per_development: 50,
            energy_per_development: 1000,
            base_development: 5,
        }
    }
}

/// How a headless run is driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Cycles to run.
    pub cycles: u32,
    /// Turns granted to every player at the start of a cycle.
    pub turns_per_cycle: u32,
    /// Turn ceiling after regeneration.
    pub max_turns: u32,
    /// Players processed concurrently.
    pub batch_size: usize,
    /// Pause between batches, in milliseconds.
    pub batch_pause_ms: u64,
    /// Process players one at a time, in id order.
    pub sequential: bool,
    /// Prices.
    pub economy: EconomyRules,
    /// Combat rules and executor limits.
    pub core: CoreConfig,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            cycles: 10,
            turns_per_cycle: 50,
            max_turns: 200,
            batch_size: 5,
            batch_pause_ms: 0,
            sequential: false,
            economy: EconomyRules::default(),
            core: CoreConfig::default(),
        }
    }
}

impl HeadlessConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        load_ron(path.as_ref())
    }

    /// Parse a config from a RON string.
    pub fn from_ron_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(ron::from_str(s)?)
    }

    /// Set the cycle count.
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    /// Force sequential processing.
    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// One combat round described as a RON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelFile {
    /// Attacking ship.
    pub attacker: CombatantRecord,
    /// Defending ship or planet.
    pub defender: CombatantRecord,
    /// Whether the defender is a planet.
    #[serde(default)]
    pub defender_is_planet: bool,
    /// Seed for the check rolls.
    #[serde(default)]
    pub seed: u64,
}

impl DuelFile {
    /// Load a duel from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        load_ron(path.as_ref())
    }

    /// Parse a duel from a RON string.
    pub fn from_ron_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(ron::from_str(s)?)
    }

    /// Validate both records into snapshots.
    pub fn combatants(&self) -> Result<(CombatantSnapshot, CombatantSnapshot), ScenarioError> {
        let attacker = CombatantSnapshot::try_from(self.attacker.clone())?;
        let defender = CombatantSnapshot::try_from(self.defender.clone())?;
        Ok((attacker, defender))
    }
}
