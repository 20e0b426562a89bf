//! In-memory [`GameFacade`] for executor tests.

use super::facade::{
    ActionError, EngageTarget, GameFacade, PlanetView, PlayerStatus, PortKind, PortView,
    SectorView, SupplyOrder, SupplyReceipt, TradeReceipt, TradeSide,
};
use crate::combat::{resolve_combat, CombatOutcome, ScriptedRolls};
use crate::combatant::{Cargo, CombatantSnapshot, Commodity};
use crate::situation::{AiSituation, CombatSupplies, SectorSummary};
use crate::tech::{TechAxis, TechLevels, MAX_TECH_LEVEL};

const PLAYER: u64 = 1;
const DEVELOP_COST: u64 = 500;

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSector {
    pub ports: Vec<PortView>,
    pub planets: Vec<PlanetView>,
    pub warps: Vec<u32>,
    pub rivals: Vec<u64>,
}

/// Sectors in a line, special port in sector 0, player at the far end.
#[derive(Debug, Clone)]
pub(crate) struct FakeGame {
    pub sectors: Vec<FakeSector>,
    pub at: u32,
    pub turns: u32,
    pub credits: u64,
    pub cargo: Cargo,
    pub tech: TechLevels,
    pub supplies: CombatSupplies,
    pub owned: Vec<u64>,
    pub moves: u32,
    pub trades: u32,
    pub path: Vec<u32>,
    pub upgrades: Vec<TechAxis>,
    pub supply_purchases: u32,
    pub developments: u32,
    pub engagements: u32,
}

impl FakeGame {
    pub(crate) fn line(len: u32) -> Self {
        let sectors = (0..len)
            .map(|i| {
                let mut sector = FakeSector::default();
                if i > 0 {
                    sector.warps.push(i - 1);
                }
                if i + 1 < len {
                    sector.warps.push(i + 1);
                }
                if i == 0 {
                    sector.ports.push(PortView {
                        id: 1000,
                        kind: PortKind::Special,
                        stock: 0,
                        sell_price: 0,
                        buy_price: 0,
                    });
                }
                sector
            })
            .collect();
        let tech = TechLevels::default();
        Self {
            sectors,
            at: len.saturating_sub(1),
            turns: 100,
            credits: 10_000,
            cargo: Cargo::default(),
            tech,
            supplies: CombatSupplies::full(&tech),
            owned: Vec::new(),
            moves: 0,
            trades: 0,
            path: Vec::new(),
            upgrades: Vec::new(),
            supply_purchases: 0,
            developments: 0,
            engagements: 0,
        }
    }

    pub(crate) fn with_commodity_port(mut self, sector: u32, native: Commodity) -> Self {
        self.sectors[sector as usize].ports.push(PortView {
            id: 100 + u64::from(sector),
            kind: PortKind::Commodity(native),
            stock: 1000,
            sell_price: 10,
            buy_price: 15,
        });
        self
    }

    pub(crate) fn with_planets(mut self, sector: u32, count: u64) -> Self {
        for id in 1..=count {
            self.sectors[sector as usize].planets.push(PlanetView {
                id,
                name: format!("Planet {id}"),
                owner: None,
            });
        }
        self
    }

    pub(crate) fn situation(&self) -> AiSituation {
        let here = self.here();
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        AiSituation {
            player_id: PLAYER,
            turns: self.turns,
            credits: self.credits,
            tech: self.tech,
            cargo: self.cargo,
            cargo_capacity: self.tech.cargo_capacity(),
            supplies: self.supplies,
            sector: SectorSummary {
                number: self.at,
                commodity_ports: count(here.ports.iter().filter(|p| p.native().is_some()).count()),
                special_ports: count(here.ports.iter().filter(|p| p.kind == PortKind::Special).count()),
                unclaimed_planets: count(here.planets.iter().filter(|p| p.owner.is_none()).count()),
                warps: count(here.warps.len()),
            },
            owned_planets: count(self.owned.len()),
        }
    }

    fn here(&self) -> &FakeSector {
        &self.sectors[self.at as usize]
    }

    fn spend_turn(&mut self) -> Result<(), ActionError> {
        if self.turns == 0 {
            return Err(ActionError::NoTurns);
        }
        self.turns -= 1;
        Ok(())
    }

    fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot::ship(PLAYER, "player", self.tech)
            .with_fighters(self.supplies.fighters)
            .with_torpedoes(self.supplies.torpedoes)
            .with_armor(self.supplies.armor)
    }
}

impl GameFacade for FakeGame {
    fn status(&self) -> PlayerStatus {
        PlayerStatus {
            player_id: PLAYER,
            sector: self.at,
            turns: self.turns,
            credits: self.credits,
            cargo: self.cargo,
            cargo_capacity: self.tech.cargo_capacity(),
            tech: self.tech,
            supplies: self.supplies,
            planets: self.owned.clone(),
        }
    }

    fn sector(&self) -> SectorView {
        let here = self.here();
        SectorView {
            number: self.at,
            ports: here.ports.clone(),
            planets: here.planets.clone(),
            warps: here.warps.clone(),
            rival_ships: here.rivals.clone(),
        }
    }

    fn trade(
        &mut self,
        port: u64,
        side: TradeSide,
        commodity: Commodity,
        quantity: u64,
    ) -> Result<TradeReceipt, ActionError> {
        let view = *self
            .here()
            .ports
            .iter()
            .find(|p| p.id == port)
            .ok_or(ActionError::NoPort(port))?;
        if quantity == 0 {
            return Err(ActionError::ZeroQuantity);
        }
        match side {
            TradeSide::Buy => {
                if view.native() != Some(commodity) {
                    return Err(ActionError::NotTraded { port, side, commodity });
                }
                let cost = quantity * view.sell_price;
                if cost > self.credits {
                    return Err(ActionError::InsufficientCredits {
                        needed: cost,
                        available: self.credits,
                    });
                }
                if self.cargo.total() + quantity > self.tech.cargo_capacity() {
                    return Err(ActionError::CargoFull);
                }
                self.spend_turn()?;
                self.credits -= cost;
                let held = self.cargo.amount(commodity);
                self.cargo.set_amount(commodity, held + quantity);
            }
            TradeSide::Sell => {
                if !view.buys(commodity) {
                    return Err(ActionError::NotTraded { port, side, commodity });
                }
                let held = self.cargo.amount(commodity);
                if held < quantity {
                    return Err(ActionError::NothingToSell(commodity));
                }
                self.spend_turn()?;
                self.credits += quantity * view.buy_price;
                self.cargo.set_amount(commodity, held - quantity);
            }
        }
        self.trades += 1;
        Ok(TradeReceipt {
            credits: self.credits,
            cargo: self.cargo,
        })
    }

    fn move_to(&mut self, sector: u32) -> Result<(), ActionError> {
        if !self.here().warps.contains(&sector) {
            return Err(ActionError::NoWarp {
                from: self.at,
                to: sector,
            });
        }
        self.spend_turn()?;
        self.at = sector;
        self.moves += 1;
        self.path.push(sector);
        Ok(())
    }

    fn hyperspace_jump(&mut self, sector: u32) -> Result<(), ActionError> {
        if sector as usize >= self.sectors.len() {
            return Err(ActionError::UnknownSector(sector));
        }
        self.spend_turn()?;
        self.at = sector;
        Ok(())
    }

    fn upgrade_ship(&mut self, axis: TechAxis) -> Result<u32, ActionError> {
        if !self.here().ports.iter().any(|p| p.kind == PortKind::Special) {
            return Err(ActionError::NotAtSpecialPort);
        }
        let cost = self
            .tech
            .upgrade_cost(axis)
            .ok_or(ActionError::MaxLevel(axis))?;
        if cost > self.credits {
            return Err(ActionError::InsufficientCredits {
                needed: cost,
                available: self.credits,
            });
        }
        self.credits -= cost;
        let level = self.tech.get_mut(axis);
        *level = (*level + 1).min(MAX_TECH_LEVEL);
        let level = *level;
        self.supplies.fighter_capacity = self.tech.fighter_capacity();
        self.supplies.torpedo_capacity = self.tech.torpedo_capacity();
        self.supplies.armor_capacity = self.tech.armor_capacity();
        self.upgrades.push(axis);
        Ok(level)
    }

    fn claim_planet(&mut self, sector: u32, name: &str) -> Result<u64, ActionError> {
        let at = self.at as usize;
        let planet = self.sectors[at]
            .planets
            .iter_mut()
            .find(|p| p.name == name && p.owner.is_none() && sector as usize == at)
            .ok_or_else(|| ActionError::NothingToClaim {
                sector,
                name: name.to_string(),
            })?;
        if self.turns == 0 {
            return Err(ActionError::NoTurns);
        }
        planet.owner = Some(PLAYER);
        let id = planet.id;
        self.turns -= 1;
        self.owned.push(id);
        Ok(id)
    }

    fn purchase_combat_supplies(
        &mut self,
        order: SupplyOrder,
    ) -> Result<SupplyReceipt, ActionError> {
        if !self.here().ports.iter().any(|p| p.kind == PortKind::Special) {
            return Err(ActionError::NotAtSpecialPort);
        }
        let mut delivered = SupplyOrder::default();
        let mut budget = self.credits;
        for (want, got) in [
            (order.fighters, &mut delivered.fighters),
            (order.torpedoes, &mut delivered.torpedoes),
            (order.armor, &mut delivered.armor),
        ] {
            *got = want.min(budget);
            budget -= *got;
        }
        let cost = self.credits - budget;
        if cost == 0 {
            return Err(ActionError::InsufficientCredits {
                needed: 1,
                available: 0,
            });
        }
        self.credits = budget;
        self.supplies.fighters += delivered.fighters;
        self.supplies.torpedoes += delivered.torpedoes;
        self.supplies.armor += delivered.armor;
        self.supply_purchases += 1;
        Ok(SupplyReceipt { delivered, cost })
    }

    fn develop_planet(&mut self, planet: u64) -> Result<(), ActionError> {
        if !self.owned.contains(&planet) {
            return Err(ActionError::NotOwner(planet));
        }
        if self.credits < DEVELOP_COST {
            return Err(ActionError::InsufficientCredits {
                needed: DEVELOP_COST,
                available: self.credits,
            });
        }
        self.spend_turn()?;
        self.credits -= DEVELOP_COST;
        self.developments += 1;
        Ok(())
    }

    fn engage(&mut self, target: EngageTarget) -> Result<CombatOutcome, ActionError> {
        let id = target.id();
        if !self.here().rivals.contains(&id) {
            return Err(ActionError::TargetNotFound(id));
        }
        self.spend_turn()?;
        self.engagements += 1;
        let rival = CombatantSnapshot::ship(id, "rival", TechLevels::default());
        let mut rolls = ScriptedRolls::always_pass();
        Ok(resolve_combat(&self.snapshot(), &rival, false, &mut rolls))
    }
}
