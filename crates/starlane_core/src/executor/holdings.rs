//! Upgrades, combat supplies and planets.

use super::facade::{GameFacade, SupplyOrder};
use super::{ExecutorLimits, Progress};
use crate::tech::TechAxis;

/// Walk the priority order buying one level per step.
///
/// Stops once every axis has failed in a row, then tops up supplies to the
/// (possibly raised) capacities.
pub(super) fn upgrade<G>(
    limits: &ExecutorLimits,
    order: &[TechAxis],
    game: &mut G,
    progress: &mut Progress,
) where
    G: GameFacade + ?Sized,
{
    let mut failures = 0;
    for &axis in order.iter().cycle().take(limits.upgrade_iterations as usize) {
        let what = format!("upgrade {axis}");
        if progress.record(&what, 0, game.upgrade_ship(axis)).is_some() {
            failures = 0;
        } else {
            failures += 1;
            if failures >= order.len() {
                break;
            }
        }
    }
    top_up_supplies(game, progress);
}

/// Refill fighters, torpedoes and armor if anything is missing and credits allow.
pub(super) fn top_up_supplies<G>(game: &mut G, progress: &mut Progress)
where
    G: GameFacade + ?Sized,
{
    let status = game.status();
    let order = SupplyOrder::top_up(&status.supplies);
    if order.is_empty() || status.credits == 0 {
        return;
    }
    progress.record(
        "purchase combat supplies",
        0,
        game.purchase_combat_supplies(order),
    );
}

/// Claim unowned planets in the current sector.
pub(super) fn claim<G>(limits: &ExecutorLimits, game: &mut G, progress: &mut Progress)
where
    G: GameFacade + ?Sized,
{
    let sector = game.sector();
    for planet in sector
        .unclaimed_planets()
        .take(limits.claim_iterations as usize)
    {
        if !progress.has_turns() {
            break;
        }
        let what = format!("claim {}", planet.name);
        progress.record(&what, 1, game.claim_planet(sector.number, &planet.name));
    }
}

/// Develop owned planets round-robin until every one of them fails in a row.
pub(super) fn develop<G>(limits: &ExecutorLimits, game: &mut G, progress: &mut Progress)
where
    G: GameFacade + ?Sized,
{
    let planets = game.status().planets;
    let mut failures = 0;
    for &planet in planets.iter().cycle().take(limits.develop_iterations as usize) {
        if !progress.has_turns() {
            break;
        }
        let what = format!("develop planet {planet}");
        if progress.record(&what, 1, game.develop_planet(planet)).is_some() {
            failures = 0;
        } else {
            failures += 1;
            if failures >= planets.len() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::testing::FakeGame;
    use super::super::{ActionExecutor, ActionResult};
    use crate::decision::{AiAction, AiDecision};
    use crate::personality::Personality;
    use crate::tech::{TechAxis, MAX_TECH_LEVEL};

    fn run(game: &mut FakeGame, action: AiAction, turns: u32, personality: Personality) -> ActionResult {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        ActionExecutor::default().execute(
            &AiDecision::new(action, turns, 90, "test"),
            personality,
            game,
            &mut rng,
        )
    }

    #[test]
    fn test_upgrade_follows_personality_order() {
        let mut game = FakeGame::line(1);
        game.credits = 3000;
        let result = run(&mut game, AiAction::UpgradeShip, 0, Personality::Warrior);
        // 2000 buys one level; the next nine attempts fail and end the loop.
        assert_eq!(game.upgrades, vec![TechAxis::Beam]);
        assert_eq!(game.tech.beam, 2);
        assert_eq!(result.errors.len(), 10);
        assert_eq!(result.turns_used, 0);
    }

    #[test]
    fn test_upgrade_capped_at_twenty_attempts() {
        let mut game = FakeGame::line(1);
        game.credits = u64::MAX / 2;
        run(&mut game, AiAction::UpgradeShip, 0, Personality::Trader);
        assert_eq!(game.upgrades.len(), 20);
        assert_eq!(game.tech.hull, 3);
    }

    #[test]
    fn test_upgrade_tops_up_raised_capacity() {
        let mut game = FakeGame::line(1);
        game.credits = 2500;
        run(&mut game, AiAction::UpgradeShip, 0, Personality::Warrior);
        assert_eq!(game.tech.beam, 2);
        assert_eq!(game.supply_purchases, 0);

        let mut game = FakeGame::line(1);
        game.credits = 2500;
        run(&mut game, AiAction::UpgradeShip, 0, Personality::Colonizer);
        assert_eq!(game.tech.hull, 2);

        let mut game = FakeGame::line(1);
        game.credits = 2500;
        game.supplies.fighters = 10;
        run(&mut game, AiAction::UpgradeShip, 0, Personality::Explorer);
        assert_eq!(game.supply_purchases, 1);
        assert_eq!(game.supplies.fighters, game.supplies.fighter_capacity);
    }

    #[test]
    fn test_upgrade_stops_when_everything_maxed() {
        let mut game = FakeGame::line(1);
        game.credits = u64::MAX / 2;
        game.tech = crate::tech::TechLevels::uniform(MAX_TECH_LEVEL);
        let result = run(&mut game, AiAction::UpgradeShip, 0, Personality::Balanced);
        assert!(game.upgrades.is_empty());
        assert_eq!(result.errors.len(), 10);
    }

    #[test]
    fn test_purchase_combat_equipment_is_free() {
        let mut game = FakeGame::line(1);
        game.supplies.torpedoes = 0;
        let result = run(&mut game, AiAction::PurchaseCombatEquipment, 0, Personality::Warrior);
        assert_eq!(result.actions_executed, 1);
        assert_eq!(result.turns_used, 0);
        assert_eq!(game.supplies.torpedoes, game.supplies.torpedo_capacity);
    }

    #[test]
    fn test_claim_at_most_three() {
        let mut game = FakeGame::line(1).with_planets(0, 5);
        let result = run(&mut game, AiAction::ClaimPlanet, 10, Personality::Colonizer);
        assert_eq!(game.owned.len(), 3);
        assert_eq!(result.turns_used, 3);
    }

    #[test]
    fn test_develop_round_robin() {
        let mut game = FakeGame::line(1).with_planets(0, 2);
        game.owned = vec![1, 2];
        let result = run(&mut game, AiAction::DevelopPlanets, 10, Personality::Colonizer);
        assert_eq!(game.developments, 10);
        assert_eq!(result.turns_used, 10);
    }

    #[test]
    fn test_develop_stops_when_broke() {
        let mut game = FakeGame::line(1).with_planets(0, 2);
        game.owned = vec![1, 2];
        game.credits = 0;
        let result = run(&mut game, AiAction::DevelopPlanets, 10, Personality::Colonizer);
        assert_eq!(game.developments, 0);
        // two failures then the fallback explore finds no warps
        assert_eq!(result.errors.len(), 2);
        assert!(result.fell_back);
    }
}
