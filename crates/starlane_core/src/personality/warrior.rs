//! Warrior: keep weapons upgraded and hunt rivals.

use super::{emergency_trade, explore, upgrade_or_seek, wait, CLAIM_TURNS, PATROL_TURNS};
use crate::decision::{AiAction, AiDecision};
use crate::situation::AiSituation;

const NAME: &str = "warrior";

pub(super) fn decide(situation: &AiSituation) -> AiDecision {
    if situation.credits >= 1500 {
        if let Some(decision) = upgrade_or_seek(situation, 98, 96, NAME) {
            return decision;
        }
    }
    if situation.turns >= 3 && situation.sector.warps > 0 {
        return AiDecision::new(
            AiAction::Patrol,
            situation.turns.min(PATROL_TURNS),
            80,
            "warrior_patrol",
        );
    }
    if situation.turns > 0 && situation.sector.unclaimed_planets > 0 && situation.credits >= 5000
    {
        return AiDecision::new(
            AiAction::ClaimPlanet,
            situation.turns.min(CLAIM_TURNS),
            85,
            "warrior_claim_outpost",
        );
    }
    if let Some(decision) = emergency_trade(situation, 1000, 75, NAME) {
        return decision;
    }
    explore(situation, 50, "warrior_scout").unwrap_or_else(|| wait(NAME))
}
