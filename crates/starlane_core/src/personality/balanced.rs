//! Balanced: trade, claim and upgrade in moderation.

use super::{
    emergency_trade, explore, upgrade_or_seek, wait, CLAIM_TURNS, EXPLORE_TURNS,
    TRADE_ROUTE_TURNS,
};
use crate::decision::{AiAction, AiDecision};
use crate::situation::AiSituation;

const NAME: &str = "balanced";

pub(super) fn decide(situation: &AiSituation) -> AiDecision {
    if let Some(decision) = emergency_trade(situation, 500, 100, NAME) {
        return decision;
    }
    if situation.turns > 0 && situation.sector.unclaimed_planets > 0 && situation.credits >= 10_000
    {
        return AiDecision::new(
            AiAction::ClaimPlanet,
            situation.turns.min(CLAIM_TURNS),
            80,
            "balanced_claim",
        );
    }
    if situation.turns >= 10 && situation.has_commodity_port() {
        return AiDecision::new(
            AiAction::TradeRoute,
            situation.turns.min(TRADE_ROUTE_TURNS),
            75,
            "balanced_trade_route",
        );
    }
    if situation.credits >= 2500 {
        if let Some(decision) = upgrade_or_seek(situation, 92, 90, NAME) {
            return decision;
        }
    }
    if situation.turns >= 5 && situation.sector.warps > 0 {
        return AiDecision::new(
            AiAction::Explore,
            situation.turns.min(EXPLORE_TURNS),
            60,
            "balanced_explore",
        );
    }
    explore(situation, 50, "balanced_wander").unwrap_or_else(|| wait(NAME))
}
