//! AI personalities.
//!
//! Each personality maps an [`AiSituation`] to exactly one [`AiDecision`].
//! Two gates run before any personality-specific logic, in this order:
//!
//! 1. Hoarding: too many credits for the current tech, go spend them.
//! 2. Readiness: combat supplies below half capacity, go restock.
//!
//! After the gates every personality walks its own branches top to bottom
//! and takes the first one that qualifies. The priority carried by the
//! decision is informational only.

mod balanced;
mod colonizer;
mod explorer;
mod trader;
mod warrior;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::decision::{AiAction, AiDecision};
use crate::error::CoreError;
use crate::situation::AiSituation;
use crate::tech::TechAxis;

/// Turn budget for a trade route.
pub const TRADE_ROUTE_TURNS: u32 = 20;
/// Turn budget for emergency trading.
pub const EMERGENCY_TRADE_TURNS: u32 = 10;
/// Turn budget for deep exploration.
pub const EXPLORE_DEEP_TURNS: u32 = 30;
/// Turn budget for a short exploration.
pub const EXPLORE_TURNS: u32 = 10;
/// Turn budget for a patrol.
pub const PATROL_TURNS: u32 = 10;
/// Turn budget for claiming planets.
pub const CLAIM_TURNS: u32 = 3;
/// Turn budget for planet development.
pub const DEVELOP_TURNS: u32 = 10;

/// The five AI personalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    /// Profit through commodity trading.
    Trader,
    /// Map the galaxy, claim far-away planets.
    Explorer,
    /// Fight rivals, keep the guns upgraded.
    Warrior,
    /// Claim and develop planets.
    Colonizer,
    /// A bit of everything.
    #[default]
    Balanced,
}

impl Personality {
    /// All personalities.
    pub const ALL: [Personality; 5] = [
        Personality::Trader,
        Personality::Explorer,
        Personality::Warrior,
        Personality::Colonizer,
        Personality::Balanced,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Personality::Trader => "trader",
            Personality::Explorer => "explorer",
            Personality::Warrior => "warrior",
            Personality::Colonizer => "colonizer",
            Personality::Balanced => "balanced",
        }
    }

    /// Decide what to do next. Total: every situation yields a decision.
    #[must_use]
    pub fn decide(self, situation: &AiSituation) -> AiDecision {
        let decision = self
            .hoarding_gate(situation)
            .or_else(|| self.readiness_gate(situation))
            .unwrap_or_else(|| match self {
                Personality::Trader => trader::decide(situation),
                Personality::Explorer => explorer::decide(situation),
                Personality::Warrior => warrior::decide(situation),
                Personality::Colonizer => colonizer::decide(situation),
                Personality::Balanced => balanced::decide(situation),
            });
        trace!(
            personality = self.as_str(),
            player = situation.player_id,
            action = %decision.action,
            priority = decision.priority,
            reason = %decision.reason,
            "AI decision"
        );
        decision
    }

    /// Order in which this personality buys tech upgrades.
    #[must_use]
    pub const fn upgrade_priority(self) -> &'static [TechAxis; 10] {
        use TechAxis::{
            Armor, Beam, Cloak, Computer, Engine, Hull, Power, Sensors, Shield, TorpedoLauncher,
        };
        match self {
            Personality::Trader => &[
                Hull, Engine, Power, Computer, Shield, Beam, Armor, TorpedoLauncher, Sensors, Cloak,
            ],
            Personality::Explorer => &[
                Engine, Sensors, Cloak, Hull, Power, Shield, Computer, Beam, Armor, TorpedoLauncher,
            ],
            Personality::Warrior => &[
                Beam, TorpedoLauncher, Shield, Armor, Computer, Power, Hull, Engine, Sensors, Cloak,
            ],
            Personality::Colonizer => &[
                Hull, Power, Shield, Armor, Beam, Computer, Engine, TorpedoLauncher, Sensors, Cloak,
            ],
            Personality::Balanced => &[
                Hull, Beam, Shield, Engine, Power, Computer, Armor, TorpedoLauncher, Sensors, Cloak,
            ],
        }
    }

    const fn is_warrior(self) -> bool {
        matches!(self, Personality::Warrior)
    }

    fn hoarding_gate(self, situation: &AiSituation) -> Option<AiDecision> {
        if !situation.is_hoarding() {
            return None;
        }
        let name = self.as_str();
        if situation.at_special_port() {
            Some(AiDecision::new(
                AiAction::UpgradeShip,
                0,
                99,
                format!("{name}_hoarding_upgrade"),
            ))
        } else {
            Some(AiDecision::new(
                AiAction::Hyperspace,
                situation.turns.min(1),
                98,
                format!("{name}_hoarding_seek_upgrade"),
            ))
        }
    }

    fn readiness_gate(self, situation: &AiSituation) -> Option<AiDecision> {
        if !situation.supplies.below_half() {
            return None;
        }
        let name = self.as_str();
        if !situation.at_special_port() {
            let priority = if self.is_warrior() { 99 } else { 97 };
            return Some(AiDecision::new(
                AiAction::Hyperspace,
                situation.turns.min(1),
                priority,
                format!("{name}_refill_combat_supplies"),
            ));
        }
        if situation.credits > 0 {
            let priority = if self.is_warrior() { 98 } else { 96 };
            return Some(AiDecision::new(
                AiAction::PurchaseCombatEquipment,
                0,
                priority,
                format!("{name}_restock_combat_supplies"),
            ));
        }
        None
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "personality",
                name: s.to_string(),
            })
    }
}

/// Go upgrade at the special port, or head there first.
fn upgrade_or_seek(
    situation: &AiSituation,
    upgrade_priority: u8,
    seek_priority: u8,
    name: &str,
) -> Option<AiDecision> {
    if situation.at_special_port() {
        Some(AiDecision::new(
            AiAction::UpgradeShip,
            0,
            upgrade_priority,
            format!("{name}_upgrade"),
        ))
    } else if situation.turns > 0 {
        Some(AiDecision::new(
            AiAction::Hyperspace,
            1,
            seek_priority,
            format!("{name}_seek_upgrade"),
        ))
    } else {
        None
    }
}

/// Sell off cargo when money runs low.
fn emergency_trade(situation: &AiSituation, below: u64, priority: u8, name: &str) -> Option<AiDecision> {
    (situation.credits < below && situation.turns > 0 && situation.can_raise_cash()).then(|| {
        AiDecision::new(
            AiAction::EmergencyTrade,
            situation.turns.min(EMERGENCY_TRADE_TURNS),
            priority,
            format!("{name}_low_credits"),
        )
    })
}

/// Short exploration, the common fallback before waiting.
fn explore(situation: &AiSituation, priority: u8, reason: &str) -> Option<AiDecision> {
    (situation.turns > 0).then(|| {
        AiDecision::new(
            AiAction::Explore,
            situation.turns.min(EXPLORE_TURNS),
            priority,
            reason,
        )
    })
}

fn wait(name: &str) -> AiDecision {
    AiDecision::wait(format!("{name}_no_turns"))
}
