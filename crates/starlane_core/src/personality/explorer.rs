//! Explorer: range far through the warp network, claim what it finds.

use super::{emergency_trade, explore, wait, CLAIM_TURNS, EXPLORE_DEEP_TURNS, EXPLORE_TURNS};
use crate::decision::{AiAction, AiDecision};
use crate::situation::AiSituation;

const NAME: &str = "explorer";

pub(super) fn decide(situation: &AiSituation) -> AiDecision {
    if situation.turns >= 5 && situation.sector.warps > 0 {
        return AiDecision::new(
            AiAction::ExploreDeep,
            situation.turns.min(EXPLORE_DEEP_TURNS),
            95,
            "explorer_deep_space",
        );
    }
    if situation.turns > 0
        && situation.sector.unclaimed_planets > 0
        && situation.credits >= 10_000
    {
        return AiDecision::new(
            AiAction::ClaimPlanet,
            situation.turns.min(CLAIM_TURNS),
            85,
            "explorer_claim_frontier",
        );
    }
    if let Some(decision) = emergency_trade(situation, 1000, 80, NAME) {
        return decision;
    }
    if situation.turns > 0 && situation.cargo_total() > 0 && situation.has_commodity_port() {
        return AiDecision::new(
            AiAction::ExploreSell,
            situation.turns.min(EXPLORE_TURNS),
            65,
            "explorer_sell_on_the_way",
        );
    }
    explore(situation, 50, "explorer_wander").unwrap_or_else(|| wait(NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::situation::CombatSupplies;
    use crate::tech::TechLevels;

    fn situation(turns: u32, credits: u64) -> AiSituation {
        let tech = TechLevels::uniform(1);
        AiSituation {
            turns,
            credits,
            tech,
            supplies: CombatSupplies::full(&tech),
            ..Default::default()
        }
    }

    #[test]
    fn test_deep_exploration_first() {
        let mut s = situation(100, 50_000);
        s.sector.warps = 2;
        s.sector.unclaimed_planets = 1;
        let decision = decide(&s);
        assert_eq!(decision.action, AiAction::ExploreDeep);
        assert_eq!(decision.turns_to_spend, EXPLORE_DEEP_TURNS);
    }

    #[test]
    fn test_claims_when_wealthy_and_short_on_turns() {
        let mut s = situation(3, 50_000);
        s.sector.warps = 2;
        s.sector.unclaimed_planets = 1;
        assert_eq!(decide(&s).action, AiAction::ClaimPlanet);
    }

    #[test]
    fn test_explore_sell_with_cargo() {
        let mut s = situation(3, 5000);
        s.cargo.ore = 5;
        s.sector.commodity_ports = 1;
        assert_eq!(decide(&s).action, AiAction::ExploreSell);
    }

    #[test]
    fn test_wait_without_turns() {
        assert_eq!(decide(&situation(0, 5000)).action, AiAction::Wait);
    }
}
