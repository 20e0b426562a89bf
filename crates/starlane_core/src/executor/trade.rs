//! Trading at commodity ports.

use rand::Rng;

use super::facade::{GameFacade, PlayerStatus, PortView, TradeSide};
use super::{movement, ExecutorLimits, Progress};
use crate::combatant::Commodity;

/// Trade loop.
///
/// Alternates buying the port's native commodity with selling whatever else
/// is aboard. Full holds or low credits switch it to selling first. With
/// nothing to trade here but cargo aboard, it moves on to look for a buyer.
pub(super) fn run<G, R>(
    limits: &ExecutorLimits,
    game: &mut G,
    rng: &mut R,
    progress: &mut Progress,
    emergency: bool,
) where
    G: GameFacade + ?Sized,
    R: Rng,
{
    let mut last_side = None;
    for _ in 0..limits.trade_iterations {
        if !progress.has_turns() {
            break;
        }
        let status = game.status();
        let sector = game.sector();
        let cash_poor = emergency || status.credits < limits.critical_credits;
        let next = sector
            .commodity_port()
            .and_then(|port| next_trade(port, &status, cash_poor, last_side).map(|t| (port.id, t)));

        match next {
            Some((port, (side, commodity, quantity))) => {
                let what = format!("{side} {quantity} {commodity}");
                progress.record(&what, 1, game.trade(port, side, commodity, quantity));
                last_side = Some(side);
            }
            None if status.cargo.total() > 0 => {
                if !movement::wander(game, rng, progress) {
                    break;
                }
                last_side = None;
            }
            None => break,
        }
    }
}

/// Sell every hold commodity the local port buys, while turns last.
pub(super) fn sell_everything<G>(game: &mut G, progress: &mut Progress)
where
    G: GameFacade + ?Sized,
{
    let Some(port) = game.sector().commodity_port().copied() else {
        return;
    };
    for commodity in Commodity::HOLD_CARGO {
        if !progress.has_turns() {
            return;
        }
        let amount = game.status().cargo.amount(commodity);
        if amount > 0 && port.buys(commodity) {
            let what = format!("sell {amount} {commodity}");
            progress.record(&what, 1, game.trade(port.id, TradeSide::Sell, commodity, amount));
        }
    }
}

/// Pick the next trade at `port`, if any is possible.
fn next_trade(
    port: &PortView,
    status: &PlayerStatus,
    cash_poor: bool,
    last_side: Option<TradeSide>,
) -> Option<(TradeSide, Commodity, u64)> {
    let sell = Commodity::HOLD_CARGO
        .into_iter()
        .filter(|&commodity| port.buys(commodity))
        .map(|commodity| (commodity, status.cargo.amount(commodity)))
        .filter(|&(_, amount)| amount > 0)
        .fold(None, |best: Option<(Commodity, u64)>, candidate| match best {
            Some(best) if best.1 >= candidate.1 => Some(best),
            _ => Some(candidate),
        })
        .map(|(commodity, amount)| (TradeSide::Sell, commodity, amount));

    let buy = port
        .native()
        .filter(|native| native.is_hold_cargo())
        .map(|native| (TradeSide::Buy, native, affordable(port, status)))
        .filter(|&(_, _, quantity)| quantity > 0);

    let sell_first =
        cash_poor || status.free_holds() == 0 || last_side != Some(TradeSide::Sell);
    if sell_first {
        sell.or(buy)
    } else {
        buy.or(sell)
    }
}

/// Units of the native commodity the player can buy right now.
fn affordable(port: &PortView, status: &PlayerStatus) -> u64 {
    let by_credits = status
        .credits
        .checked_div(port.sell_price)
        .unwrap_or(u64::MAX);
    port.stock.min(status.free_holds()).min(by_credits)
}
