//! AI processing cycles.
//!
//! A cycle grants every player fresh turns, then lets each one decide and
//! act. Players are processed in batches: the players of one batch run
//! concurrently on rayon, batches run one after another with an optional
//! pause between them. The universe sits behind a mutex, so every primitive
//! is a serialized transition no matter how players interleave.
//!
//! Concurrent batches interleave primitives in scheduling order. Runs that
//! must be reproducible use sequential mode, which processes players in id
//! order.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use starlane_core::executor::ActionExecutor;

use crate::metrics::{PlayerCycleReport, RunReport};
use crate::scenario::{HeadlessConfig, Scenario, ScenarioError};
use crate::universe::{PlayerHandle, Universe};

/// Generator purpose: executor choices.
const STREAM_EXECUTOR: u64 = 0;
/// Generator purpose: combat checks.
const STREAM_COMBAT: u64 = 1;

/// Seed a player's generator for one purpose in one cycle.
///
/// Every (seed, cycle, player, purpose) tuple gets its own ChaCha stream.
pub fn player_rng(seed: u64, cycle: u32, player: u64, purpose: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ u64::from(cycle).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    rng.set_stream(player.wrapping_mul(2).wrapping_add(purpose));
    rng
}

fn lock(universe: &Mutex<Universe>) -> MutexGuard<'_, Universe> {
    universe.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs decision cycles over one universe.
pub struct Orchestrator {
    scenario: Scenario,
    config: HeadlessConfig,
    executor: ActionExecutor,
    universe: Mutex<Universe>,
    cycle: u32,
}

impl Orchestrator {
    /// Generate the scenario's universe and get ready to run.
    pub fn new(scenario: Scenario, config: HeadlessConfig) -> Result<Self, ScenarioError> {
        let universe = Universe::generate(&scenario, &config)?;
        Ok(Self {
            executor: ActionExecutor::new(config.core.executor),
            scenario,
            config,
            universe: Mutex::new(universe),
            cycle: 0,
        })
    }

    /// Cycles completed so far.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// The run settings.
    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    /// A copy of the current universe.
    pub fn universe(&self) -> Universe {
        lock(&self.universe).clone()
    }

    /// Run one full cycle and return one row per player.
    pub fn run_cycle(&mut self) -> Vec<PlayerCycleReport> {
        self.cycle += 1;
        let cycle = self.cycle;
        let ids = {
            let mut universe = lock(&self.universe);
            universe.begin_cycle(self.config.turns_per_cycle, self.config.max_turns);
            universe.player_ids()
        };

        let batch_size = self.config.batch_size.max(1);
        let pause = Duration::from_millis(self.config.batch_pause_ms);
        let batches = ids.len().div_ceil(batch_size);
        let mut rows = Vec::with_capacity(ids.len());

        for (index, batch) in ids.chunks(batch_size).enumerate() {
            if self.config.sequential {
                rows.extend(batch.iter().filter_map(|&id| self.process_player(cycle, id)));
            } else {
                let processed: Vec<_> = batch
                    .par_iter()
                    .filter_map(|&id| self.process_player(cycle, id))
                    .collect();
                rows.extend(processed);
            }
            debug!(cycle, batch = index + 1, batches, "Batch processed");
            if index + 1 < batches && !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }

        info!(cycle, players = rows.len(), "Cycle complete");
        rows
    }

    fn process_player(&self, cycle: u32, id: u64) -> Option<PlayerCycleReport> {
        let (situation, personality) = {
            let universe = lock(&self.universe);
            let situation = universe.situation(id)?;
            (situation, universe.player(id)?.personality)
        };

        let decision = personality.decide(&situation);
        let seed = self.scenario.seed;
        let mut rng = player_rng(seed, cycle, id, STREAM_EXECUTOR);
        let mut handle = PlayerHandle::new(
            &self.universe,
            id,
            player_rng(seed, cycle, id, STREAM_COMBAT),
        );
        let result = self
            .executor
            .execute(&decision, personality, &mut handle, &mut rng);

        if !result.success {
            warn!(
                player = id,
                action = %result.action,
                errors = ?result.errors,
                "Decision failed"
            );
        }

        let universe = lock(&self.universe);
        let player = universe.player(id)?;
        Some(PlayerCycleReport {
            cycle,
            player_id: id,
            name: player.name.clone(),
            personality,
            decision,
            result,
            credits: player.ship.credits,
            sector: player.sector,
            turns_left: player.turns,
        })
    }

    /// Run the configured number of cycles and report.
    pub fn run(&mut self) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::new(self.scenario.name.clone(), self.scenario.seed);
        info!(
            scenario = %self.scenario.name,
            cycles = self.config.cycles,
            sequential = self.config.sequential,
            "Starting run"
        );

        for _ in 0..self.config.cycles {
            let rows = self.run_cycle();
            report.record_cycle(rows);
        }
        report.finalize(&lock(&self.universe));

        info!(
            cycles = report.summary.cycles,
            decisions = report.summary.total_decisions(),
            combats = report.summary.combats,
            elapsed_ms = start.elapsed().as_millis(),
            "Run complete"
        );
        report
    }
}

/// Generate a scenario and run it to completion.
pub fn run_scenario(scenario: Scenario, config: HeadlessConfig) -> Result<RunReport, ScenarioError> {
    Ok(Orchestrator::new(scenario, config)?.run())
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResult {
    /// Final state hash of every run.
    pub hashes: Vec<u64>,
    /// Whether every run produced the same rows and final state.
    pub identical: bool,
}

/// Run a scenario several times sequentially and compare the results.
pub fn verify_determinism(
    scenario: &Scenario,
    config: &HeadlessConfig,
    runs: u32,
) -> Result<VerifyResult, ScenarioError> {
    let config = config.clone().with_sequential(true);
    let mut first: Option<RunReport> = None;
    let mut hashes = Vec::new();
    let mut identical = true;

    for run in 0..runs {
        let report = run_scenario(scenario.clone(), config.clone())?;
        debug!(run, hash = report.final_state_hash, "Verification run complete");
        hashes.push(report.final_state_hash);
        match &first {
            Some(reference) => {
                if reference.rows != report.rows
                    || reference.final_state_hash != report.final_state_hash
                {
                    warn!(run, "Run diverged from the first run");
                    identical = false;
                }
            }
            None => first = Some(report),
        }
    }

    Ok(VerifyResult { hashes, identical })
}
