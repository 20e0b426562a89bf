//! Exploration, patrols and hyperspace jumps.

use rand::seq::SliceRandom;
use rand::Rng;

use super::facade::{EngageTarget, GameFacade};
use super::{trade, Engagement, ExecutorLimits, Progress};

/// Move through one uniformly random outbound warp.
///
/// Returns false when there is nowhere to go.
pub(super) fn wander<G, R>(game: &mut G, rng: &mut R, progress: &mut Progress) -> bool
where
    G: GameFacade + ?Sized,
    R: Rng,
{
    let sector = game.sector();
    let Some(&next) = sector.warps.choose(rng) else {
        return false;
    };
    progress.record("move", 1, game.move_to(next));
    true
}

/// Random walk, optionally selling cargo at every commodity port reached.
pub(super) fn explore<G, R>(
    game: &mut G,
    rng: &mut R,
    progress: &mut Progress,
    iterations: u32,
    sell: bool,
) where
    G: GameFacade + ?Sized,
    R: Rng,
{
    for _ in 0..iterations {
        if !progress.has_turns() || !wander(game, rng, progress) {
            break;
        }
        if sell {
            trade::sell_everything(game, progress);
        }
    }
}

/// Random walk that engages the first rival met, once.
pub(super) fn patrol<G, R>(
    limits: &ExecutorLimits,
    game: &mut G,
    rng: &mut R,
    progress: &mut Progress,
) where
    G: GameFacade + ?Sized,
    R: Rng,
{
    let player = game.status().player_id;
    let mut engaged = false;
    for _ in 0..limits.patrol_iterations {
        if !progress.has_turns() {
            break;
        }
        if !engaged {
            let sector = game.sector();
            let target = sector
                .rival_ships
                .first()
                .map(|&id| EngageTarget::Ship(id))
                .or_else(|| sector.rival_planet(player).map(|p| EngageTarget::Planet(p.id)));
            if let Some(target) = target {
                engaged = true;
                if let Some(outcome) = progress.record("engage", 1, game.engage(target)) {
                    progress.engaged(Engagement {
                        target,
                        winner: outcome.winner,
                    });
                }
                continue;
            }
        }
        if !wander(game, rng, progress) {
            break;
        }
    }
}

/// Jump to the special port sector unless already there.
pub(super) fn hyperspace<G>(game: &mut G, progress: &mut Progress)
where
    G: GameFacade + ?Sized,
{
    let target = game.special_sector();
    if game.status().sector == target {
        return;
    }
    progress.record("hyperspace", 1, game.hyperspace_jump(target));
}
