//! Single-round combat resolution.
//!
//! One call to [`resolve_combat`] (or [`CombatRules::resolve`]) settles one
//! complete round between an attacking ship and a defending ship or planet:
//!
//! 1. Engine check (ship defenders only), may end the round as a draw
//! 2. Sensor vs. cloak check (ship defenders only), same
//! 3. Emergency warp escape (ship defenders only)
//! 4. Beams: vs fighters, vs shields, overflow to hull
//! 5. Torpedo volleys
//! 6. Fighter exchange
//! 7. Outcome and, for a ship-vs-ship attacker win, salvage
//!
//! The resolver is a pure function of the two snapshots and the rolls it
//! draws from the supplied [`RollSource`]. It never fails and touches no
//! shared state; the caller persists the outcome and applies the loser reset
//! ([`CombatantSnapshot::reset_to_base`]).

mod log;
mod resolver;
mod rng;

pub use log::{CombatStep, Side, StepPhase, TargetResource};
pub use resolver::CombatRules;
pub use rng::{RngRolls, RollSource, ScriptedRolls};

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantSnapshot;
use crate::error::{CoreError, Result};

/// Who won the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// The attacking ship.
    Attacker,
    /// The defending ship or planet.
    Defender,
    /// Nobody.
    Draw,
}

/// How the round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEnd {
    /// The defender's engines outran the attacker.
    Outmaneuvered,
    /// The attacker's sensors could not lock through the cloak.
    NoLock,
    /// The defender fired an emergency warp device.
    Escaped,
    /// Both sides were destroyed.
    MutualDestruction,
    /// The defender was destroyed (or the planet stripped of defenses).
    AttackerVictory,
    /// The attacker was destroyed.
    DefenderVictory,
    /// Both sides survived.
    Stalemate,
}

/// Resources transferred from a destroyed defender to the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Salvage {
    /// Credits recovered, including a share of the ship's value.
    pub credits: u64,
    /// Ore recovered.
    pub ore: u64,
    /// Organics recovered.
    pub organics: u64,
    /// Goods recovered.
    pub goods: u64,
    /// Colonists rescued.
    pub colonists: u64,
}

impl Salvage {
    /// Add this salvage to the winner's credits and cargo.
    pub fn credit_to(&self, winner: &mut CombatantSnapshot) {
        winner.credits = winner.credits.saturating_add(self.credits);
        winner.cargo.ore = winner.cargo.ore.saturating_add(self.ore);
        winner.cargo.organics = winner.cargo.organics.saturating_add(self.organics);
        winner.cargo.goods = winner.cargo.goods.saturating_add(self.goods);
        winner.cargo.colonists = winner.cargo.colonists.saturating_add(self.colonists);
    }
}

/// Combat pools one side brought into the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SidePools {
    /// Beam output drawn from energy.
    pub beam_power: u64,
    /// Shield pool drawn from the energy left after beams.
    pub shield_pool: u64,
    /// Shield points left at the end of the round.
    pub shields_remaining: u64,
    /// Torpedoes launched.
    pub torpedoes_fired: u64,
}

/// Result of one resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Winner of the round.
    pub winner: Winner,
    /// How the round ended.
    pub end: CombatEnd,
    /// Attacker after the round.
    pub attacker: CombatantSnapshot,
    /// Defender after the round.
    pub defender: CombatantSnapshot,
    /// Present only for a ship-vs-ship attacker victory.
    pub salvage: Option<Salvage>,
    /// The full log of the round.
    pub steps: Vec<CombatStep>,
    /// Attacker pools.
    pub attacker_pools: SidePools,
    /// Defender pools.
    pub defender_pools: SidePools,
    /// Whether the defender was a planet.
    pub defender_is_planet: bool,
    /// Whether the defender escaped by emergency warp.
    pub defender_escaped: bool,
    /// Turns the round cost the attacker.
    pub turns_used: u32,
}

impl CombatOutcome {
    /// Encode to bytes for storage or byte-level comparison.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Whether a log step with this label exists.
    #[must_use]
    pub fn has_step(&self, action: &str) -> bool {
        self.steps.iter().any(|step| step.action == action)
    }
}

/// Resolve one round with the default [`CombatRules`].
pub fn resolve_combat<R: RollSource>(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    defender_is_planet: bool,
    rolls: &mut R,
) -> CombatOutcome {
    CombatRules::default().resolve(attacker, defender, defender_is_planet, rolls)
}
