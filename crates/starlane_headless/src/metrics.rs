//! Per-cycle report rows and run summaries.
//!
//! Every AI player produces one [`PlayerCycleReport`] per cycle. A
//! [`RunReport`] collects the rows of a whole run, aggregates them into a
//! [`RunSummary`] and records where every player ended up.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use starlane_core::decision::AiDecision;
use starlane_core::executor::ActionResult;
use starlane_core::personality::Personality;

use crate::universe::{Player, Universe};

/// What one player decided and did in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCycleReport {
    /// Cycle number, starting at 1.
    pub cycle: u32,
    /// Player identifier.
    pub player_id: u64,
    /// Player name.
    pub name: String,
    /// Decision heuristic.
    pub personality: Personality,
    /// The decision taken.
    pub decision: AiDecision,
    /// How executing it went.
    pub result: ActionResult,
    /// Credits after execution.
    pub credits: u64,
    /// Sector after execution.
    pub sector: u32,
    /// Turns left after execution.
    pub turns_left: u32,
}

/// Where a player stands at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    /// Player identifier.
    pub player_id: u64,
    /// Player name.
    pub name: String,
    /// Decision heuristic.
    pub personality: Personality,
    /// Credits on hand.
    pub credits: u64,
    /// Credits plus ship value.
    pub net_worth: u64,
    /// Average tech level.
    pub tech_average: f64,
    /// Planets owned.
    pub planets: usize,
    /// Final sector.
    pub sector: u32,
}

impl From<&Player> for PlayerStanding {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            personality: player.personality,
            credits: player.ship.credits,
            net_worth: player.net_worth(),
            tech_average: player.ship.tech.average(),
            planets: player.planets.len(),
            sector: player.sector,
        }
    }
}

/// Aggregates over every row of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Cycles completed.
    pub cycles: u32,
    /// Decisions taken, by action tag.
    pub decisions: BTreeMap<String, u32>,
    /// Primitive calls that succeeded.
    pub actions_executed: u64,
    /// Turns spent.
    pub turns_used: u64,
    /// Primitive calls that failed.
    pub errors: u64,
    /// Combat rounds fought.
    pub combats: u64,
    /// Decisions that fell back to exploring.
    pub fallbacks: u64,
    /// Decisions whose execution reported failure.
    pub failures: u64,
}

impl RunSummary {
    /// Fold one row into the totals.
    pub fn record(&mut self, row: &PlayerCycleReport) {
        *self
            .decisions
            .entry(row.decision.action.as_str().to_string())
            .or_insert(0) += 1;
        self.actions_executed += u64::from(row.result.actions_executed);
        self.turns_used += u64::from(row.result.turns_used);
        self.errors += row.result.errors.len() as u64;
        self.combats += row.result.engagements.len() as u64;
        if row.result.fell_back {
            self.fallbacks += 1;
        }
        if !row.result.success {
            self.failures += 1;
        }
    }

    /// Total decisions recorded.
    pub fn total_decisions(&self) -> u32 {
        self.decisions.values().sum()
    }
}

/// Everything a headless run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Scenario seed.
    pub seed: u64,
    /// Every per-player row, in cycle order.
    pub rows: Vec<PlayerCycleReport>,
    /// Aggregates.
    pub summary: RunSummary,
    /// Final standings, by player id.
    pub standings: Vec<PlayerStanding>,
    /// Hash of the final universe.
    pub final_state_hash: u64,
}

impl RunReport {
    /// Start an empty report.
    pub fn new(scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario: scenario.into(),
            seed,
            rows: Vec::new(),
            summary: RunSummary::default(),
            standings: Vec::new(),
            final_state_hash: 0,
        }
    }

    /// Append the rows of one finished cycle.
    pub fn record_cycle(&mut self, rows: Vec<PlayerCycleReport>) {
        for row in &rows {
            self.summary.record(row);
        }
        self.summary.cycles += 1;
        self.rows.extend(rows);
    }

    /// Capture final standings and the state hash.
    pub fn finalize(&mut self, universe: &Universe) {
        self.standings = universe.players().map(PlayerStanding::from).collect();
        self.final_state_hash = universe.state_hash();
    }

    /// Rows of one player.
    pub fn rows_for(&self, player_id: u64) -> impl Iterator<Item = &PlayerCycleReport> {
        self.rows.iter().filter(move |row| row.player_id == player_id)
    }

    /// Save the report as JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load a report from JSON.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}
