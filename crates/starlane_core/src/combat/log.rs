//! Step-by-step audit trail of one combat round.

use serde::{Deserialize, Serialize};

/// Which side of the engagement acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The initiating ship.
    Attacker,
    /// The ship or planet being attacked.
    Defender,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

/// Kind of log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// A weapon was fired or a check was rolled.
    Attack,
    /// A resource was reduced.
    Damage,
    /// The round ended.
    Result,
}

/// Resource a damage step was applied to.
///
/// `None` marks steps that carry no damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetResource {
    /// No resource affected.
    None,
    /// Hull/armor points.
    Hull,
    /// Shield pool.
    Shield,
    /// Fighters.
    Fighters,
}

/// One entry in the combat log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatStep {
    /// Position in the log, starting at zero.
    pub index: u32,
    /// Entry kind.
    pub phase: StepPhase,
    /// Side that acted.
    pub actor: Side,
    /// Machine-readable label, e.g. `beams_vs_fighters`.
    pub action: String,
    /// Human-readable description.
    pub description: String,
    /// Damage dealt, zero when none.
    pub damage: u64,
    /// What the damage hit.
    pub target: TargetResource,
}

/// Append-only builder for the combat log.
#[derive(Debug, Clone, Default)]
pub(crate) struct CombatLog {
    steps: Vec<CombatStep>,
}

impl CombatLog {
    fn push(
        &mut self,
        phase: StepPhase,
        actor: Side,
        action: &str,
        description: String,
        damage: u64,
        target: TargetResource,
    ) {
        let index = u32::try_from(self.steps.len()).unwrap_or(u32::MAX);
        self.steps.push(CombatStep {
            index,
            phase,
            actor,
            action: action.to_string(),
            description,
            damage,
            target,
        });
    }

    pub(crate) fn attack(&mut self, actor: Side, action: &str, description: String) {
        self.push(
            StepPhase::Attack,
            actor,
            action,
            description,
            0,
            TargetResource::None,
        );
    }

    /// Records damage; zero-damage hits are skipped.
    pub(crate) fn damage(
        &mut self,
        actor: Side,
        action: &str,
        description: String,
        damage: u64,
        target: TargetResource,
    ) {
        if damage > 0 {
            self.push(StepPhase::Damage, actor, action, description, damage, target);
        }
    }

    pub(crate) fn result(&mut self, actor: Side, action: &str, description: String) {
        self.push(
            StepPhase::Result,
            actor,
            action,
            description,
            0,
            TargetResource::None,
        );
    }

    pub(crate) fn into_steps(self) -> Vec<CombatStep> {
        self.steps
    }
}
