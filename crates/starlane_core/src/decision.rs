//! AI decisions: one action tag with a turn budget.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything an AI player can decide to do in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiAction {
    /// Buy and sell at commodity ports.
    TradeRoute,
    /// Long random walk through the warp network.
    ExploreDeep,
    /// Wander while selling cargo at every port met.
    ExploreSell,
    /// Hunt for rivals to engage.
    Patrol,
    /// Claim unowned planets in the current sector.
    ClaimPlanet,
    /// Buy tech upgrades at a special port.
    UpgradeShip,
    /// Invest in owned planets.
    DevelopPlanets,
    /// Sell whatever is possible to recover credits.
    EmergencyTrade,
    /// Refill fighters, torpedoes and armor.
    PurchaseCombatEquipment,
    /// Short random walk.
    Explore,
    /// Jump to the special port sector.
    Hyperspace,
    /// Do nothing this cycle.
    Wait,
}

impl AiAction {
    /// All actions.
    pub const ALL: [AiAction; 12] = [
        AiAction::TradeRoute,
        AiAction::ExploreDeep,
        AiAction::ExploreSell,
        AiAction::Patrol,
        AiAction::ClaimPlanet,
        AiAction::UpgradeShip,
        AiAction::DevelopPlanets,
        AiAction::EmergencyTrade,
        AiAction::PurchaseCombatEquipment,
        AiAction::Explore,
        AiAction::Hyperspace,
        AiAction::Wait,
    ];

    /// Purchases made at a special port. They cost no turns.
    #[must_use]
    pub const fn is_purchase(self) -> bool {
        matches!(self, AiAction::UpgradeShip | AiAction::PurchaseCombatEquipment)
    }

    /// Stable snake_case tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AiAction::TradeRoute => "trade_route",
            AiAction::ExploreDeep => "explore_deep",
            AiAction::ExploreSell => "explore_sell",
            AiAction::Patrol => "patrol",
            AiAction::ClaimPlanet => "claim_planet",
            AiAction::UpgradeShip => "upgrade_ship",
            AiAction::DevelopPlanets => "develop_planets",
            AiAction::EmergencyTrade => "emergency_trade",
            AiAction::PurchaseCombatEquipment => "purchase_combat_equipment",
            AiAction::Explore => "explore",
            AiAction::Hyperspace => "hyperspace",
            AiAction::Wait => "wait",
        }
    }
}

impl fmt::Display for AiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single decision an AI player makes per cycle.
///
/// `priority` is informational: personalities pick the first qualifying
/// branch, they never re-rank by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiDecision {
    /// What to do.
    pub action: AiAction,
    /// Turns the executor may spend on it.
    pub turns_to_spend: u32,
    /// Priority score, 0-100.
    pub priority: u8,
    /// Diagnostic tag naming the branch that fired.
    pub reason: String,
}

impl AiDecision {
    /// Create a decision; the priority is clamped to 100.
    #[must_use]
    pub fn new(action: AiAction, turns_to_spend: u32, priority: u8, reason: impl Into<String>) -> Self {
        Self {
            action,
            turns_to_spend,
            priority: priority.min(100),
            reason: reason.into(),
        }
    }

    /// The do-nothing decision.
    #[must_use]
    pub fn wait(reason: impl Into<String>) -> Self {
        Self::new(AiAction::Wait, 0, 0, reason)
    }
}
