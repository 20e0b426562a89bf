//! Colonizer: claim planets and build them up.

use super::{
    emergency_trade, explore, upgrade_or_seek, wait, CLAIM_TURNS, DEVELOP_TURNS,
};
use crate::decision::{AiAction, AiDecision};
use crate::situation::AiSituation;

const NAME: &str = "colonizer";

pub(super) fn decide(situation: &AiSituation) -> AiDecision {
    if situation.turns > 0 && situation.sector.unclaimed_planets > 0 {
        return AiDecision::new(
            AiAction::ClaimPlanet,
            situation.turns.min(CLAIM_TURNS),
            95,
            "colonizer_claim",
        );
    }
    if situation.turns > 0 && situation.owned_planets > 0 && situation.credits >= 1000 {
        return AiDecision::new(
            AiAction::DevelopPlanets,
            situation.turns.min(DEVELOP_TURNS),
            85,
            "colonizer_develop",
        );
    }
    if situation.credits >= 3000 {
        if let Some(decision) = upgrade_or_seek(situation, 90, 88, NAME) {
            return decision;
        }
    }
    if let Some(decision) = emergency_trade(situation, 500, 80, NAME) {
        return decision;
    }
    explore(situation, 75, "colonizer_find_planets").unwrap_or_else(|| wait(NAME))
}
