//! Bounded action executor.
//!
//! Turns one [`AiDecision`] into a short sequence of primitive calls on a
//! [`GameFacade`]. Every loop has a hard iteration ceiling independent of the
//! turn budget, so the work per decision stays bounded no matter what the
//! decision asks for. A failing primitive is recorded in
//! [`ActionResult::errors`] and the loop carries on; running out of turns or
//! legal moves ends the loop early without being an error.

mod facade;
mod holdings;
mod movement;
mod trade;

#[cfg(test)]
pub(crate) mod testing;

pub use facade::{
    ActionError, EngageTarget, GameFacade, PlanetView, PlayerStatus, PortKind, PortView,
    SectorView, SupplyOrder, SupplyReceipt, TradeReceipt, TradeSide,
};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::Winner;
use crate::decision::{AiAction, AiDecision};
use crate::personality::Personality;

/// Iteration ceilings and thresholds for the executor loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorLimits {
    /// Trade loop ceiling.
    pub trade_iterations: u32,
    /// Deep exploration ceiling.
    pub explore_deep_iterations: u32,
    /// Short exploration ceiling.
    pub explore_iterations: u32,
    /// Upgrade loop ceiling.
    pub upgrade_iterations: u32,
    /// Turns for the fallback exploration.
    pub fallback_explore_turns: u32,
    /// Patrol loop ceiling.
    pub patrol_iterations: u32,
    /// Planet development ceiling.
    pub develop_iterations: u32,
    /// Planets claimed per decision at most.
    pub claim_iterations: u32,
    /// Below this many credits the trade loop sells before it buys.
    pub critical_credits: u64,
}

impl Default for ExecutorLimits {
    fn default() -> Self {
        Self {
            trade_iterations: 20,
            explore_deep_iterations: 30,
            explore_iterations: 10,
            upgrade_iterations: 20,
            fallback_explore_turns: 10,
            patrol_iterations: 10,
            develop_iterations: 10,
            claim_iterations: 3,
            critical_credits: 500,
        }
    }
}

/// One engagement fought during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    /// What was attacked.
    pub target: EngageTarget,
    /// Who won.
    pub winner: Winner,
}

/// What the executor actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// The decision's action.
    pub action: AiAction,
    /// False only when nothing succeeded and something failed.
    pub success: bool,
    /// Primitive calls that succeeded.
    pub actions_executed: u32,
    /// Turns consumed, never more than the budget.
    pub turns_used: u32,
    /// Non-fatal failures, in order.
    pub errors: Vec<String>,
    /// Combats fought.
    pub engagements: Vec<Engagement>,
    /// Whether the fallback exploration ran.
    pub fell_back: bool,
}

/// Turn-budget bookkeeping shared by the loops.
#[derive(Debug)]
pub(crate) struct Progress {
    budget: u32,
    result: ActionResult,
}

impl Progress {
    fn new(action: AiAction, budget: u32) -> Self {
        Self {
            budget,
            result: ActionResult {
                action,
                success: true,
                actions_executed: 0,
                turns_used: 0,
                errors: Vec::new(),
                engagements: Vec::new(),
                fell_back: false,
            },
        }
    }

    pub(crate) fn has_turns(&self) -> bool {
        self.result.turns_used < self.budget
    }

    pub(crate) fn turns_used(&self) -> u32 {
        self.result.turns_used
    }

    /// Account for one primitive call costing `turns` on success.
    pub(crate) fn record<T>(
        &mut self,
        what: &str,
        turns: u32,
        outcome: Result<T, ActionError>,
    ) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.result.actions_executed += 1;
                self.result.turns_used += turns;
                Some(value)
            }
            Err(err) => {
                debug!(action = %self.result.action, what, error = %err, "sub-action failed");
                self.result.errors.push(format!("{what}: {err}"));
                None
            }
        }
    }

    pub(crate) fn engaged(&mut self, engagement: Engagement) {
        self.result.engagements.push(engagement);
    }

    fn start_fallback(&mut self, turns: u32) {
        self.budget = self.result.turns_used + turns;
        self.result.fell_back = true;
    }

    fn finish(mut self) -> ActionResult {
        self.result.success = self.result.actions_executed > 0 || self.result.errors.is_empty();
        self.result
    }
}

/// Runs decisions against a [`GameFacade`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionExecutor {
    limits: ExecutorLimits,
}

impl ActionExecutor {
    /// Executor with custom limits.
    #[must_use]
    pub const fn new(limits: ExecutorLimits) -> Self {
        Self { limits }
    }

    /// Configured limits.
    #[must_use]
    pub const fn limits(&self) -> &ExecutorLimits {
        &self.limits
    }

    /// Execute one decision.
    ///
    /// Spends at most `decision.turns_to_spend` turns. When the action used
    /// no turns despite a non-zero budget, a short exploration runs instead
    /// so the player always makes progress. A purchase that bought nothing
    /// falls back the same way, on the player's remaining turns.
    pub fn execute<G, R>(
        &self,
        decision: &AiDecision,
        personality: Personality,
        game: &mut G,
        rng: &mut R,
    ) -> ActionResult
    where
        G: GameFacade + ?Sized,
        R: Rng,
    {
        let limits = &self.limits;
        let budget = decision.turns_to_spend;
        let mut progress = Progress::new(decision.action, budget);

        match decision.action {
            AiAction::TradeRoute => trade::run(limits, game, rng, &mut progress, false),
            AiAction::EmergencyTrade => trade::run(limits, game, rng, &mut progress, true),
            AiAction::ExploreDeep => {
                movement::explore(game, rng, &mut progress, limits.explore_deep_iterations, false);
            }
            AiAction::Explore => {
                movement::explore(game, rng, &mut progress, limits.explore_iterations, false);
            }
            AiAction::ExploreSell => {
                movement::explore(game, rng, &mut progress, limits.explore_iterations, true);
            }
            AiAction::Patrol => movement::patrol(limits, game, rng, &mut progress),
            AiAction::Hyperspace => movement::hyperspace(game, &mut progress),
            AiAction::UpgradeShip => {
                holdings::upgrade(limits, personality.upgrade_priority(), game, &mut progress);
            }
            AiAction::PurchaseCombatEquipment => holdings::top_up_supplies(game, &mut progress),
            AiAction::ClaimPlanet => holdings::claim(limits, game, &mut progress),
            AiAction::DevelopPlanets => holdings::develop(limits, game, &mut progress),
            AiAction::Wait => {}
        }

        let fallback_turns = if progress.turns_used() > 0 {
            0
        } else if decision.action.is_purchase() {
            // Purchases spend no turns; only one that bought nothing falls back.
            match progress.result.actions_executed {
                0 => limits.fallback_explore_turns.min(game.status().turns),
                _ => 0,
            }
        } else {
            limits.fallback_explore_turns.min(budget)
        };
        if fallback_turns > 0 {
            let turns = fallback_turns;
            debug!(action = %decision.action, turns, "no turns used, falling back to explore");
            progress.start_fallback(turns);
            movement::explore(game, rng, &mut progress, limits.fallback_explore_turns, false);
        }

        let result = progress.finish();
        debug!(
            action = %result.action,
            executed = result.actions_executed,
            turns = result.turns_used,
            errors = result.errors.len(),
            "action executed"
        );
        result
    }
}
