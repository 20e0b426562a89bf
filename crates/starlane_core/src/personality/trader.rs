//! Trader: squeeze profit out of commodity ports, upgrade holds and engines.

use super::{emergency_trade, explore, upgrade_or_seek, wait, TRADE_ROUTE_TURNS};
use crate::decision::{AiAction, AiDecision};
use crate::situation::AiSituation;

const NAME: &str = "trader";

pub(super) fn decide(situation: &AiSituation) -> AiDecision {
    if let Some(decision) = emergency_trade(situation, 500, 100, NAME) {
        return decision;
    }
    if situation.turns >= 10 && situation.has_commodity_port() {
        return AiDecision::new(
            AiAction::TradeRoute,
            situation.turns.min(TRADE_ROUTE_TURNS),
            90,
            "trader_trade_route",
        );
    }
    if situation.credits >= 2000 {
        if let Some(decision) = upgrade_or_seek(situation, 95, 93, NAME) {
            return decision;
        }
    }
    explore(situation, 70, "trader_find_ports").unwrap_or_else(|| wait(NAME))
}
