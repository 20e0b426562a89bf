//! In-memory universe the AI players act on.
//!
//! [`Universe`] owns every sector, port, planet and player. Each primitive
//! takes the acting player's id and either applies one complete transition
//! or fails without side effects. [`PlayerHandle`] binds a player to a
//! shared `Mutex<Universe>` and exposes the primitives as a
//! [`GameFacade`], one lock per call.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use starlane_core::combat::{CombatOutcome, CombatRules, RngRolls, Winner};
use starlane_core::combatant::{CombatantSnapshot, Commodity};
use starlane_core::executor::{
    ActionError, EngageTarget, GameFacade, PlanetView, PlayerStatus, PortKind, PortView,
    SectorView, SupplyOrder, SupplyReceipt, TradeReceipt, TradeSide,
};
use starlane_core::personality::Personality;
use starlane_core::situation::{AiSituation, CombatSupplies, SectorSummary};
use starlane_core::tech::{TechAxis, TechLevels, MAX_TECH_LEVEL};

use crate::scenario::{EconomyRules, HeadlessConfig, Scenario, ScenarioError};

/// Sector holding the special port.
pub const SPECIAL_SECTOR: u32 = 0;

/// Identifier of the special port.
pub const SPECIAL_PORT_ID: u64 = 1;

/// Commodity ports are numbered `PORT_ID_BASE + sector`.
pub const PORT_ID_BASE: u64 = 100;

const PLANET_NAMES: [&str; 8] = [
    "Kepler", "Vesta", "Orinoco", "Tamsin", "Halcyon", "Brigid", "Cassia", "Nereid",
];

/// Reference price of a commodity before a port's markup.
pub const fn base_price(commodity: Commodity) -> u64 {
    match commodity {
        Commodity::Ore => 20,
        Commodity::Organics => 30,
        Commodity::Goods => 50,
        Commodity::Energy => 10,
    }
}

/// A sector and its ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sector {
    /// Sector number.
    pub number: u32,
    /// Sectors reachable in one move, ascending.
    pub warps: Vec<u32>,
    /// Ports in this sector.
    pub ports: Vec<PortView>,
}

/// A planet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planet {
    /// Planet identifier.
    pub id: u64,
    /// Planet name.
    pub name: String,
    /// Sector the planet orbits in.
    pub sector: u32,
    /// Owning player.
    pub owner: Option<u64>,
    /// Times the planet has been developed.
    pub development: u32,
    /// Stationed fighters.
    pub fighters: u64,
    /// Stored energy feeding beams and shields.
    pub energy: u64,
    /// Torpedoes in the planetary magazine.
    pub torpedoes: u64,
    /// Whether the planet has a base.
    pub base_built: bool,
}

impl Planet {
    fn view(&self) -> PlanetView {
        PlanetView {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner,
        }
    }

    fn snapshot(&self, owner_tech: TechLevels) -> CombatantSnapshot {
        CombatantSnapshot::planet(self.id, self.name.clone(), owner_tech, self.base_built)
            .with_fighters(self.fighters)
            .with_energy(self.energy)
            .with_torpedoes(self.torpedoes)
    }
}

/// An AI player and its ship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Decision heuristic.
    pub personality: Personality,
    /// Current sector.
    pub sector: u32,
    /// Turns left.
    pub turns: u32,
    /// The ship, including credits and cargo.
    pub ship: CombatantSnapshot,
    /// Owned planets.
    pub planets: Vec<u64>,
}

impl Player {
    fn spend_turn(&mut self) -> Result<(), ActionError> {
        if self.turns == 0 {
            return Err(ActionError::NoTurns);
        }
        self.turns -= 1;
        Ok(())
    }

    fn supplies(&self) -> CombatSupplies {
        let tech = &self.ship.tech;
        CombatSupplies {
            fighters: self.ship.fighters,
            fighter_capacity: tech.fighter_capacity(),
            torpedoes: self.ship.torpedoes,
            torpedo_capacity: tech.torpedo_capacity(),
            armor: self.ship.armor,
            armor_capacity: tech.armor_capacity(),
        }
    }

    /// Credits plus the value of the ship's tech.
    pub fn net_worth(&self) -> u64 {
        self.ship.credits.saturating_add(self.ship.tech.net_worth())
    }

    fn send_home(&mut self) {
        self.ship.reset_to_base();
        self.sector = SPECIAL_SECTOR;
    }
}

/// The whole game state of a headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    sectors: Vec<Sector>,
    planets: BTreeMap<u64, Planet>,
    players: BTreeMap<u64, Player>,
    port_stock: u64,
    economy: EconomyRules,
    combat: CombatRules,
}

fn link(sectors: &mut [Sector], a: u32, b: u32) {
    if a == b {
        return;
    }
    for (from, to) in [(a, b), (b, a)] {
        let warps = &mut sectors[from as usize].warps;
        if let Err(pos) = warps.binary_search(&to) {
            warps.insert(pos, to);
        }
    }
}

fn commodity_port(rng: &mut ChaCha8Rng, sector: u32, stock: u64) -> PortView {
    let native = *Commodity::HOLD_CARGO
        .choose(rng)
        .unwrap_or(&Commodity::Ore);
    let jitter: u64 = rng.gen_range(90..=110);
    let base = base_price(native);
    PortView {
        id: PORT_ID_BASE + u64::from(sector),
        kind: PortKind::Commodity(native),
        stock,
        sell_price: (base * 80 * jitter / 10_000).max(1),
        buy_price: (base * 120 * jitter / 10_000).max(1),
    }
}

fn percent_of(value: u64, percent: u64) -> u64 {
    u64::try_from(u128::from(value) * u128::from(percent) / 100).unwrap_or(u64::MAX)
}

impl Universe {
    /// Generate the universe a scenario describes.
    ///
    /// The same scenario and config always produce the same universe.
    pub fn generate(scenario: &Scenario, config: &HeadlessConfig) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let setup = &scenario.universe;
        let mut rng = ChaCha8Rng::seed_from_u64(scenario.seed);
        let count = setup.sectors;

        let mut sectors: Vec<Sector> = (0..count)
            .map(|number| Sector {
                number,
                warps: Vec::new(),
                ports: Vec::new(),
            })
            .collect();

        for number in 0..count {
            link(&mut sectors, number, (number + 1) % count);
        }
        for _ in 0..setup.extra_warps {
            let a = rng.gen_range(0..count);
            let b = rng.gen_range(0..count);
            link(&mut sectors, a, b);
        }

        sectors[SPECIAL_SECTOR as usize].ports.push(PortView {
            id: SPECIAL_PORT_ID,
            kind: PortKind::Special,
            stock: 0,
            sell_price: 0,
            buy_price: 0,
        });
        for number in 1..count {
            if rng.gen_range(0..100) < setup.port_percent {
                let port = commodity_port(&mut rng, number, setup.port_stock);
                sectors[number as usize].ports.push(port);
            }
        }

        let mut planets = BTreeMap::new();
        for index in 0..setup.planets {
            let id = u64::from(index) + 1;
            let sector = if count > 1 { rng.gen_range(1..count) } else { 0 };
            let name = format!("{}-{id}", PLANET_NAMES[index as usize % PLANET_NAMES.len()]);
            planets.insert(
                id,
                Planet {
                    id,
                    name,
                    sector,
                    owner: None,
                    development: 0,
                    fighters: 0,
                    energy: 0,
                    torpedoes: 0,
                    base_built: false,
                },
            );
        }

        let mut players = BTreeMap::new();
        for (index, player) in scenario.players.iter().enumerate() {
            let id = index as u64 + 1;
            let level = player.tech_level.clamp(1, MAX_TECH_LEVEL);
            let mut ship = CombatantSnapshot::ship(id, player.name.clone(), TechLevels::uniform(level))
                .with_credits(player.credits);
            ship.emergency_warp = player.emergency_warp;
            let sector = player.sector.unwrap_or_else(|| rng.gen_range(0..count));
            players.insert(
                id,
                Player {
                    id,
                    name: player.name.clone(),
                    personality: player.personality,
                    sector,
                    turns: player.turns,
                    ship,
                    planets: Vec::new(),
                },
            );
        }

        info!(
            scenario = %scenario.name,
            sectors = count,
            planets = planets.len(),
            players = players.len(),
            "Universe generated"
        );

        Ok(Self {
            sectors,
            planets,
            players,
            port_stock: setup.port_stock,
            economy: config.economy,
            combat: config.core.combat.clone(),
        })
    }

    /// All sectors, by number.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// All planets, by id.
    pub fn planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets.values()
    }

    /// All players, by id.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Player ids in ascending order.
    pub fn player_ids(&self) -> Vec<u64> {
        self.players.keys().copied().collect()
    }

    /// A player by id.
    pub fn player(&self, id: u64) -> Option<&Player> {
        self.players.get(&id)
    }

    /// A planet by id.
    pub fn planet(&self, id: u64) -> Option<&Planet> {
        self.planets.get(&id)
    }

    /// Mutable player access for setup and tests.
    pub fn player_mut(&mut self, id: u64) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Mutable planet access for setup and tests.
    pub fn planet_mut(&mut self, id: u64) -> Option<&mut Planet> {
        self.planets.get_mut(&id)
    }

    /// Mutable sector access for setup and tests.
    pub fn sector_mut(&mut self, number: u32) -> Option<&mut Sector> {
        self.sectors.get_mut(number as usize)
    }

    /// Hash of every sector, planet and player.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.sectors.hash(&mut hasher);
        for planet in self.planets.values() {
            planet.hash(&mut hasher);
        }
        for player in self.players.values() {
            player.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Grant cycle turns, recharge energy and restock ports.
    pub fn begin_cycle(&mut self, turns_per_cycle: u32, max_turns: u32) {
        for player in self.players.values_mut() {
            player.turns = player.turns.saturating_add(turns_per_cycle).min(max_turns);
            player.ship.energy = player.ship.energy_max;
        }
        let restock = (self.port_stock / 10).max(1);
        for port in self.sectors.iter_mut().flat_map(|s| s.ports.iter_mut()) {
            if port.native().is_some() {
                port.stock = port.stock.saturating_add(restock).min(self.port_stock);
            }
        }
    }

    fn sector_of(&self, player: u64) -> Result<&Sector, ActionError> {
        let at = self.player_ref(player)?.sector;
        self.sectors
            .get(at as usize)
            .ok_or(ActionError::UnknownSector(at))
    }

    fn player_ref(&self, id: u64) -> Result<&Player, ActionError> {
        self.players.get(&id).ok_or(ActionError::TargetNotFound(id))
    }

    fn player_entry(&mut self, id: u64) -> Result<&mut Player, ActionError> {
        self.players.get_mut(&id).ok_or(ActionError::TargetNotFound(id))
    }

    fn require_special_port(&self, player: u64) -> Result<(), ActionError> {
        let sector = self.sector_of(player)?;
        if sector.ports.iter().any(|port| port.kind == PortKind::Special) {
            Ok(())
        } else {
            Err(ActionError::NotAtSpecialPort)
        }
    }

    /// The player's own state.
    pub fn status(&self, player: u64) -> Option<PlayerStatus> {
        let p = self.players.get(&player)?;
        Some(PlayerStatus {
            player_id: p.id,
            sector: p.sector,
            turns: p.turns,
            credits: p.ship.credits,
            cargo: p.ship.cargo,
            cargo_capacity: p.ship.tech.cargo_capacity(),
            tech: p.ship.tech,
            supplies: p.supplies(),
            planets: p.planets.clone(),
        })
    }

    /// The sector as the player sees it.
    pub fn sector_view(&self, player: u64) -> Option<SectorView> {
        let sector = self.sector_of(player).ok()?;
        Some(SectorView {
            number: sector.number,
            ports: sector.ports.clone(),
            planets: self
                .planets
                .values()
                .filter(|planet| planet.sector == sector.number)
                .map(Planet::view)
                .collect(),
            warps: sector.warps.clone(),
            rival_ships: self
                .players
                .values()
                .filter(|other| other.id != player && other.sector == sector.number)
                .map(|other| other.id)
                .collect(),
        })
    }

    /// Build the snapshot an AI player decides from.
    pub fn situation(&self, player: u64) -> Option<AiSituation> {
        let p = self.players.get(&player)?;
        let view = self.sector_view(player)?;
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        Some(AiSituation {
            player_id: p.id,
            turns: p.turns,
            credits: p.ship.credits,
            tech: p.ship.tech,
            cargo: p.ship.cargo,
            cargo_capacity: p.ship.tech.cargo_capacity(),
            supplies: p.supplies(),
            sector: SectorSummary {
                number: view.number,
                commodity_ports: count(view.ports.iter().filter(|port| port.native().is_some()).count()),
                special_ports: count(view.ports.iter().filter(|port| port.kind == PortKind::Special).count()),
                unclaimed_planets: count(view.unclaimed_planets().count()),
                warps: count(view.warps.len()),
            },
            owned_planets: count(p.planets.len()),
        })
    }

    /// Buy from or sell to a port in the player's sector.
    pub fn trade(
        &mut self,
        player: u64,
        port: u64,
        side: TradeSide,
        commodity: Commodity,
        quantity: u64,
    ) -> Result<TradeReceipt, ActionError> {
        let at = self.player_ref(player)?.sector;
        let view = *self
            .sector_of(player)?
            .ports
            .iter()
            .find(|p| p.id == port)
            .ok_or(ActionError::NoPort(port))?;
        if quantity == 0 {
            return Err(ActionError::ZeroQuantity);
        }

        let p = self.player_entry(player)?;
        let held = p.ship.cargo.amount(commodity);
        match side {
            TradeSide::Buy => {
                // Energy ports sell only into the power plant, never the holds.
                if !commodity.is_hold_cargo() || view.native() != Some(commodity) {
                    return Err(ActionError::NotTraded { port, side, commodity });
                }
                if quantity > view.stock {
                    return Err(ActionError::OutOfStock(port));
                }
                let cost = quantity.saturating_mul(view.sell_price);
                if cost > p.ship.credits {
                    return Err(ActionError::InsufficientCredits {
                        needed: cost,
                        available: p.ship.credits,
                    });
                }
                if p.ship.cargo.total().saturating_add(quantity) > p.ship.tech.cargo_capacity() {
                    return Err(ActionError::CargoFull);
                }
                p.spend_turn()?;
                p.ship.credits -= cost;
                p.ship.cargo.set_amount(commodity, held + quantity);
            }
            TradeSide::Sell => {
                if !view.buys(commodity) {
                    return Err(ActionError::NotTraded { port, side, commodity });
                }
                if held < quantity {
                    return Err(ActionError::NothingToSell(commodity));
                }
                p.spend_turn()?;
                p.ship.credits = p.ship.credits.saturating_add(quantity.saturating_mul(view.buy_price));
                p.ship.cargo.set_amount(commodity, held - quantity);
            }
        }
        let receipt = TradeReceipt {
            credits: p.ship.credits,
            cargo: p.ship.cargo,
        };

        if side == TradeSide::Buy {
            if let Some(stocked) = self.sectors[at as usize]
                .ports
                .iter_mut()
                .find(|p| p.id == port)
            {
                stocked.stock -= quantity;
            }
        }
        Ok(receipt)
    }

    /// Move through a warp.
    pub fn move_to(&mut self, player: u64, sector: u32) -> Result<(), ActionError> {
        let here = self.sector_of(player)?;
        if !here.warps.contains(&sector) {
            return Err(ActionError::NoWarp {
                from: here.number,
                to: sector,
            });
        }
        let p = self.player_entry(player)?;
        p.spend_turn()?;
        p.sector = sector;
        Ok(())
    }

    /// Jump straight to any sector.
    pub fn hyperspace_jump(&mut self, player: u64, sector: u32) -> Result<(), ActionError> {
        if sector as usize >= self.sectors.len() {
            return Err(ActionError::UnknownSector(sector));
        }
        let p = self.player_entry(player)?;
        p.spend_turn()?;
        p.sector = sector;
        Ok(())
    }

    /// Buy one tech level at the special port.
    pub fn upgrade_ship(&mut self, player: u64, axis: TechAxis) -> Result<u32, ActionError> {
        self.require_special_port(player)?;
        let p = self.player_entry(player)?;
        let cost = p
            .ship
            .tech
            .upgrade_cost(axis)
            .ok_or(ActionError::MaxLevel(axis))?;
        if cost > p.ship.credits {
            return Err(ActionError::InsufficientCredits {
                needed: cost,
                available: p.ship.credits,
            });
        }
        p.ship.credits -= cost;
        let level = p.ship.tech.get_mut(axis);
        *level = (*level + 1).min(MAX_TECH_LEVEL);
        let level = *level;
        p.ship.armor_max = p.ship.tech.armor_capacity();
        p.ship.energy_max = p.ship.tech.energy_capacity();
        Ok(level)
    }

    /// Claim an unowned planet in the player's sector.
    pub fn claim_planet(&mut self, player: u64, sector: u32, name: &str) -> Result<u64, ActionError> {
        let at = self.player_ref(player)?.sector;
        let nothing = || ActionError::NothingToClaim {
            sector,
            name: name.to_string(),
        };
        if at != sector {
            return Err(nothing());
        }
        let id = self
            .planets
            .values()
            .find(|planet| planet.sector == sector && planet.owner.is_none() && planet.name == name)
            .map(|planet| planet.id)
            .ok_or_else(nothing)?;

        let p = self.player_entry(player)?;
        p.spend_turn()?;
        p.planets.push(id);
        if let Some(planet) = self.planets.get_mut(&id) {
            planet.owner = Some(player);
        }
        Ok(id)
    }

    /// Buy as much of a supply order as credits and capacity allow.
    pub fn purchase_combat_supplies(
        &mut self,
        player: u64,
        order: SupplyOrder,
    ) -> Result<SupplyReceipt, ActionError> {
        self.require_special_port(player)?;
        if order.is_empty() {
            return Err(ActionError::ZeroQuantity);
        }
        let economy = self.economy;
        let p = self.player_entry(player)?;
        let supplies = p.supplies();
        let room = SupplyOrder::top_up(&supplies);

        let mut delivered = SupplyOrder::default();
        let mut budget = p.ship.credits;
        for (want, room, price, got) in [
            (order.fighters, room.fighters, economy.fighter_price, &mut delivered.fighters),
            (order.torpedoes, room.torpedoes, economy.torpedo_price, &mut delivered.torpedoes),
            (order.armor, room.armor, economy.armor_price, &mut delivered.armor),
        ] {
            let wanted = want.min(room);
            let affordable = budget.checked_div(price).unwrap_or(wanted);
            *got = wanted.min(affordable);
            budget -= *got * price;
        }
        let cost = p.ship.credits - budget;
        if delivered.is_empty() {
            return Err(ActionError::InsufficientCredits {
                needed: economy.armor_price.min(economy.torpedo_price).min(economy.fighter_price),
                available: p.ship.credits,
            });
        }
        p.ship.credits = budget;
        p.ship.fighters += delivered.fighters;
        p.ship.torpedoes += delivered.torpedoes;
        p.ship.armor += delivered.armor;
        p.ship.armor_max = p.ship.armor_max.max(p.ship.armor);
        Ok(SupplyReceipt { delivered, cost })
    }

    /// Invest in an owned planet.
    pub fn develop_planet(&mut self, player: u64, planet: u64) -> Result<(), ActionError> {
        let economy = self.economy;
        let owned = self
            .planets
            .get(&planet)
            .is_some_and(|p| p.owner == Some(player));
        if !owned {
            return Err(ActionError::NotOwner(planet));
        }
        let p = self.player_entry(player)?;
        if p.ship.credits < economy.develop_cost {
            return Err(ActionError::InsufficientCredits {
                needed: economy.develop_cost,
                available: p.ship.credits,
            });
        }
        p.spend_turn()?;
        p.ship.credits -= economy.develop_cost;

        if let Some(target) = self.planets.get_mut(&planet) {
            target.development += 1;
            target.fighters = target.fighters.saturating_add(economy.fighters_per_development);
            target.energy = target.energy.saturating_add(economy.energy_per_development);
            if target.development >= economy.base_development {
                target.base_built = true;
            }
        }
        Ok(())
    }

    /// Resolve one combat round and apply everything it implies.
    ///
    /// A destroyed ship is reset to base stats and sent to the special
    /// sector. A winning attacker takes the loser's salvage, or the planet.
    /// A defender that warps out lands on a random neighbouring sector.
    pub fn engage<R: Rng>(
        &mut self,
        player: u64,
        target: EngageTarget,
        rng: &mut R,
    ) -> Result<CombatOutcome, ActionError> {
        let at = self.player_ref(player)?.sector;
        match target {
            EngageTarget::Ship(id) => {
                if id == player {
                    return Err(ActionError::SelfTarget);
                }
                let defender = self
                    .players
                    .get(&id)
                    .filter(|other| other.sector == at)
                    .ok_or(ActionError::TargetNotFound(id))?
                    .ship
                    .clone();
                let attacker = self
                    .players
                    .get_mut(&player)
                    .ok_or(ActionError::TargetNotFound(player))?;
                attacker.spend_turn()?;
                let outcome =
                    self.combat
                        .resolve(&attacker.ship, &defender, false, &mut RngRolls(&mut *rng));
                self.apply_ship_outcome(player, id, &outcome, rng);
                Ok(outcome)
            }
            EngageTarget::Planet(id) => {
                let planet = self
                    .planets
                    .get(&id)
                    .filter(|planet| planet.sector == at)
                    .ok_or(ActionError::TargetNotFound(id))?;
                let owner = planet.owner.ok_or(ActionError::TargetNotFound(id))?;
                if owner == player {
                    return Err(ActionError::SelfTarget);
                }
                let owner_tech = self
                    .players
                    .get(&owner)
                    .map_or_else(TechLevels::default, |p| p.ship.tech);
                let defender = planet.snapshot(owner_tech);
                let attacker = self
                    .players
                    .get_mut(&player)
                    .ok_or(ActionError::TargetNotFound(player))?;
                attacker.spend_turn()?;
                let outcome =
                    self.combat
                        .resolve(&attacker.ship, &defender, true, &mut RngRolls(&mut *rng));
                self.apply_planet_outcome(player, owner, &outcome);
                Ok(outcome)
            }
        }
    }

    fn apply_ship_outcome<R: Rng>(
        &mut self,
        attacker_id: u64,
        defender_id: u64,
        outcome: &CombatOutcome,
        rng: &mut R,
    ) {
        let credit_share = self.combat.credit_salvage_percent;
        if let Some(attacker) = self.players.get_mut(&attacker_id) {
            attacker.ship = outcome.attacker.clone();
            if let Some(salvage) = &outcome.salvage {
                salvage.credit_to(&mut attacker.ship);
            }
            if attacker.ship.armor == 0 {
                attacker.send_home();
            }
        }

        let escape_to = if outcome.defender_escaped {
            let at = self.players.get(&defender_id).map_or(SPECIAL_SECTOR, |p| p.sector);
            self.sectors
                .get(at as usize)
                .and_then(|sector| sector.warps.choose(rng).copied())
        } else {
            None
        };
        if let Some(defender) = self.players.get_mut(&defender_id) {
            defender.ship = outcome.defender.clone();
            if outcome.salvage.is_some() {
                let lost = percent_of(defender.ship.credits, credit_share);
                defender.ship.credits -= lost;
            }
            if let Some(sector) = escape_to {
                defender.sector = sector;
            } else if !outcome.defender_escaped && defender.ship.armor == 0 {
                defender.send_home();
            }
        }

        debug!(
            attacker = attacker_id,
            defender = defender_id,
            winner = ?outcome.winner,
            end = ?outcome.end,
            "Ship combat applied"
        );
    }

    fn apply_planet_outcome(&mut self, attacker_id: u64, owner: u64, outcome: &CombatOutcome) {
        let planet_id = outcome.defender.id;
        if let Some(planet) = self.planets.get_mut(&planet_id) {
            planet.fighters = outcome.defender.fighters;
            planet.energy = outcome.defender.energy;
            planet.torpedoes = outcome.defender.torpedoes;
            if outcome.winner == Winner::Attacker {
                planet.owner = Some(attacker_id);
            }
        }
        if outcome.winner == Winner::Attacker {
            if let Some(previous) = self.players.get_mut(&owner) {
                previous.planets.retain(|&id| id != planet_id);
            }
        }
        if let Some(attacker) = self.players.get_mut(&attacker_id) {
            attacker.ship = outcome.attacker.clone();
            if outcome.winner == Winner::Attacker {
                attacker.planets.push(planet_id);
            }
            if attacker.ship.armor == 0 {
                attacker.send_home();
            }
        }

        debug!(
            attacker = attacker_id,
            planet = planet_id,
            winner = ?outcome.winner,
            "Planet combat applied"
        );
    }
}

fn lock(universe: &Mutex<Universe>) -> MutexGuard<'_, Universe> {
    universe.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One player's view of a shared universe.
pub struct PlayerHandle<'a> {
    universe: &'a Mutex<Universe>,
    player: u64,
    rng: ChaCha8Rng,
}

impl<'a> PlayerHandle<'a> {
    /// Act as `player`; `rng` drives the combat checks.
    pub fn new(universe: &'a Mutex<Universe>, player: u64, rng: ChaCha8Rng) -> Self {
        Self {
            universe,
            player,
            rng,
        }
    }

    /// The acting player's id.
    pub fn player(&self) -> u64 {
        self.player
    }
}

impl GameFacade for PlayerHandle<'_> {
    fn status(&self) -> PlayerStatus {
        lock(self.universe)
            .status(self.player)
            .unwrap_or_else(|| PlayerStatus {
                player_id: self.player,
                ..Default::default()
            })
    }

    fn sector(&self) -> SectorView {
        lock(self.universe)
            .sector_view(self.player)
            .unwrap_or_default()
    }

    fn special_sector(&self) -> u32 {
        SPECIAL_SECTOR
    }

    fn trade(
        &mut self,
        port: u64,
        side: TradeSide,
        commodity: Commodity,
        quantity: u64,
    ) -> Result<TradeReceipt, ActionError> {
        lock(self.universe).trade(self.player, port, side, commodity, quantity)
    }

    fn move_to(&mut self, sector: u32) -> Result<(), ActionError> {
        lock(self.universe).move_to(self.player, sector)
    }

    fn hyperspace_jump(&mut self, sector: u32) -> Result<(), ActionError> {
        lock(self.universe).hyperspace_jump(self.player, sector)
    }

    fn upgrade_ship(&mut self, axis: TechAxis) -> Result<u32, ActionError> {
        lock(self.universe).upgrade_ship(self.player, axis)
    }

    fn claim_planet(&mut self, sector: u32, name: &str) -> Result<u64, ActionError> {
        lock(self.universe).claim_planet(self.player, sector, name)
    }

    fn purchase_combat_supplies(
        &mut self,
        order: SupplyOrder,
    ) -> Result<SupplyReceipt, ActionError> {
        lock(self.universe).purchase_combat_supplies(self.player, order)
    }

    fn develop_planet(&mut self, planet: u64) -> Result<(), ActionError> {
        lock(self.universe).develop_planet(self.player, planet)
    }

    fn engage(&mut self, target: EngageTarget) -> Result<CombatOutcome, ActionError> {
        lock(self.universe).engage(self.player, target, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{PlayerSetup, UniverseSetup};

    fn scenario(sectors: u32, players: Vec<PlayerSetup>) -> Scenario {
        Scenario {
            name: "test".into(),
            description: String::new(),
            seed: 3,
            universe: UniverseSetup {
                sectors,
                extra_warps: 0,
                port_percent: 0,
                planets: 0,
                port_stock: 1000,
            },
            players,
        }
    }

    fn pilot(name: &str, sector: u32) -> PlayerSetup {
        PlayerSetup {
            sector: Some(sector),
            ..PlayerSetup::new(name, Personality::Balanced)
        }
    }

    fn universe(sectors: u32, players: Vec<PlayerSetup>) -> Universe {
        Universe::generate(&scenario(sectors, players), &HeadlessConfig::default()).unwrap()
    }

    fn add_port(universe: &mut Universe, sector: u32, native: Commodity) -> u64 {
        let id = PORT_ID_BASE + u64::from(sector);
        universe.sector_mut(sector).unwrap().ports.push(PortView {
            id,
            kind: PortKind::Commodity(native),
            stock: 1000,
            sell_price: 10,
            buy_price: 15,
        });
        id
    }

    fn add_planet(universe: &mut Universe, id: u64, sector: u32, owner: Option<u64>) {
        universe.planets.insert(
            id,
            Planet {
                id,
                name: format!("P{id}"),
                sector,
                owner,
                development: 0,
                fighters: 0,
                energy: 0,
                torpedoes: 0,
                base_built: false,
            },
        );
        if let Some(owner) = owner {
            universe.player_mut(owner).unwrap().planets.push(id);
        }
    }

    // ========================================================================
    // Generation
    // ========================================================================

    #[test]
    fn test_generation_is_deterministic() {
        let scenario = Scenario::default();
        let config = HeadlessConfig::default();
        let a = Universe::generate(&scenario, &config).unwrap();
        let b = Universe::generate(&scenario, &config).unwrap();
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_ring_links_every_sector() {
        let u = universe(6, vec![]);
        for sector in u.sectors() {
            let next = (sector.number + 1) % 6;
            let prev = (sector.number + 5) % 6;
            assert!(sector.warps.contains(&next));
            assert!(sector.warps.contains(&prev));
            assert!(!sector.warps.contains(&sector.number));
        }
    }

    #[test]
    fn test_special_port_only_in_sector_zero() {
        let mut setup = Scenario::default();
        setup.universe.port_percent = 100;
        let u = Universe::generate(&setup, &HeadlessConfig::default()).unwrap();
        assert!(u.sectors()[0].ports.iter().any(|p| p.kind == PortKind::Special));
        for sector in &u.sectors()[1..] {
            assert_eq!(sector.ports.len(), 1);
            let port = sector.ports[0];
            assert!(port.native().is_some());
            assert!(port.buy_price > port.sell_price);
        }
    }

    #[test]
    fn test_planets_never_in_special_sector() {
        let mut setup = Scenario::default();
        setup.universe.planets = 40;
        let u = Universe::generate(&setup, &HeadlessConfig::default()).unwrap();
        assert_eq!(u.planets().count(), 40);
        assert!(u.planets().all(|p| p.sector != SPECIAL_SECTOR && p.owner.is_none()));
    }

    #[test]
    fn test_situation_reflects_sector() {
        let mut u = universe(4, vec![pilot("A", 0)]);
        add_planet(&mut u, 1, 0, None);
        let situation = u.situation(1).unwrap();
        assert_eq!(situation.turns, 100);
        assert_eq!(situation.credits, 10_000);
        assert!(situation.at_special_port());
        assert_eq!(situation.sector.unclaimed_planets, 1);
        assert_eq!(situation.sector.warps, 2);
        assert!(!situation.supplies.below_half());
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    #[test]
    fn test_buy_and_sell() {
        let mut u = universe(3, vec![pilot("A", 1)]);
        let ore = add_port(&mut u, 1, Commodity::Ore);
        let receipt = u.trade(1, ore, TradeSide::Buy, Commodity::Ore, 10).unwrap();
        assert_eq!(receipt.credits, 9_900);
        assert_eq!(receipt.cargo.ore, 10);
        assert_eq!(u.sectors()[1].ports[0].stock, 990);

        let err = u.trade(1, ore, TradeSide::Sell, Commodity::Ore, 5).unwrap_err();
        assert!(matches!(err, ActionError::NotTraded { .. }));

        u.move_to(1, 2).unwrap();
        let goods = add_port(&mut u, 2, Commodity::Goods);
        let receipt = u.trade(1, goods, TradeSide::Sell, Commodity::Ore, 10).unwrap();
        assert_eq!(receipt.credits, 10_050);
        assert_eq!(u.player(1).unwrap().turns, 97);
    }

    #[test]
    fn test_energy_cannot_be_bought_into_holds() {
        let mut u = universe(3, vec![pilot("A", 1)]);
        let energy = add_port(&mut u, 1, Commodity::Energy);
        let err = u.trade(1, energy, TradeSide::Buy, Commodity::Energy, 10).unwrap_err();
        assert!(matches!(
            err,
            ActionError::NotTraded { side: TradeSide::Buy, commodity: Commodity::Energy, .. }
        ));
        let player = u.player(1).unwrap();
        assert_eq!(player.ship.credits, 10_000);
        assert_eq!(player.turns, 100);
        assert_eq!(u.sectors()[1].ports[0].stock, 1000);

        u.player_mut(1).unwrap().ship.cargo.goods = 4;
        let receipt = u.trade(1, energy, TradeSide::Sell, Commodity::Goods, 4).unwrap();
        assert_eq!(receipt.cargo.goods, 0);
        assert!(receipt.credits > 10_000);
    }

    #[test]
    fn test_failed_trade_has_no_side_effects() {
        let mut u = universe(3, vec![pilot("A", 1)]);
        let ore = add_port(&mut u, 1, Commodity::Ore);
        u.player_mut(1).unwrap().ship.credits = 5;
        let err = u.trade(1, ore, TradeSide::Buy, Commodity::Ore, 10).unwrap_err();
        assert!(matches!(err, ActionError::InsufficientCredits { needed: 100, available: 5 }));
        assert_eq!(u.player(1).unwrap().turns, 100);
        assert_eq!(u.sectors()[1].ports[0].stock, 1000);
    }

    #[test]
    fn test_move_requires_warp() {
        let mut u = universe(5, vec![pilot("A", 0)]);
        assert!(matches!(
            u.move_to(1, 2),
            Err(ActionError::NoWarp { from: 0, to: 2 })
        ));
        u.move_to(1, 4).unwrap();
        assert_eq!(u.player(1).unwrap().sector, 4);
        u.hyperspace_jump(1, 2).unwrap();
        assert_eq!(u.player(1).unwrap().sector, 2);
        assert!(matches!(u.hyperspace_jump(1, 9), Err(ActionError::UnknownSector(9))));
    }

    #[test]
    fn test_upgrade_needs_special_port() {
        let mut u = universe(3, vec![pilot("A", 1)]);
        assert_eq!(u.upgrade_ship(1, TechAxis::Hull), Err(ActionError::NotAtSpecialPort));
        u.hyperspace_jump(1, 0).unwrap();
        assert_eq!(u.upgrade_ship(1, TechAxis::Armor), Ok(2));
        let p = u.player(1).unwrap();
        assert_eq!(p.ship.credits, 8_000);
        assert_eq!(p.ship.armor_max, 200);
        assert_eq!(p.ship.armor, 100);
    }

    #[test]
    fn test_supply_purchase_is_capped_by_room_and_credits() {
        let mut u = universe(3, vec![pilot("A", 0)]);
        {
            let p = u.player_mut(1).unwrap();
            p.ship.fighters = 0;
            p.ship.torpedoes = 0;
            p.ship.credits = 6_000;
        }
        let order = SupplyOrder {
            fighters: 500,
            torpedoes: 500,
            armor: 0,
        };
        let receipt = u.purchase_combat_supplies(1, order).unwrap();
        // room for 100 of each; 100 fighters cost 5000, 50 torpedoes the rest
        assert_eq!(receipt.delivered.fighters, 100);
        assert_eq!(receipt.delivered.torpedoes, 50);
        assert_eq!(receipt.cost, 6_000);
        assert_eq!(u.player(1).unwrap().ship.credits, 0);

        assert!(matches!(
            u.purchase_combat_supplies(1, order),
            Err(ActionError::InsufficientCredits { .. })
        ));
    }

    #[test]
    fn test_claim_and_develop() {
        let mut u = universe(3, vec![pilot("A", 1)]);
        add_planet(&mut u, 7, 1, None);
        assert!(u.claim_planet(1, 1, "P8").is_err());
        assert_eq!(u.claim_planet(1, 1, "P7"), Ok(7));
        assert!(u.claim_planet(1, 1, "P7").is_err());
        assert_eq!(u.player(1).unwrap().planets, vec![7]);

        for _ in 0..5 {
            u.develop_planet(1, 7).unwrap();
        }
        let planet = u.planet(7).unwrap();
        assert_eq!(planet.development, 5);
        assert_eq!(planet.fighters, 250);
        assert!(planet.base_built);
        assert_eq!(u.player(1).unwrap().ship.credits, 5_000);
        assert_eq!(u.develop_planet(1, 99), Err(ActionError::NotOwner(99)));
    }

    #[test]
    fn test_begin_cycle_caps_turns() {
        let mut u = universe(3, vec![pilot("A", 1)]);
        u.player_mut(1).unwrap().ship.energy = 0;
        u.begin_cycle(50, 120);
        let p = u.player(1).unwrap();
        assert_eq!(p.turns, 120);
        assert_eq!(p.ship.energy, p.ship.energy_max);
    }

    // ========================================================================
    // Combat aftermath
    // ========================================================================

    fn duel_universe() -> Universe {
        let mut veteran = pilot("Veteran", 2);
        veteran.tech_level = 20;
        veteran.credits = 0;
        let mut rookie = pilot("Rookie", 2);
        rookie.credits = 1_000;
        universe(4, vec![veteran, rookie])
    }

    #[test]
    fn test_ship_loser_is_reset_and_sent_home() {
        let mut u = duel_universe();
        u.player_mut(2).unwrap().ship.cargo.ore = 100;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = u.engage(1, EngageTarget::Ship(2), &mut rng).unwrap();
        assert_eq!(outcome.winner, Winner::Attacker);
        let salvage = outcome.salvage.unwrap();

        let winner = u.player(1).unwrap();
        assert_eq!(winner.ship.credits, salvage.credits);
        assert_eq!(winner.ship.cargo.ore, salvage.ore);
        assert_eq!(winner.turns, 99);

        let loser = u.player(2).unwrap();
        assert_eq!(loser.sector, SPECIAL_SECTOR);
        assert_eq!(loser.ship.tech, TechLevels::uniform(1));
        assert_eq!(loser.ship.cargo.total(), 0);
        assert_eq!(loser.ship.credits, 500);
    }

    #[test]
    fn test_escaped_defender_moves_to_a_neighbour() {
        let mut u = duel_universe();
        u.player_mut(2).unwrap().ship.emergency_warp = true;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = u.engage(1, EngageTarget::Ship(2), &mut rng).unwrap();
        assert!(outcome.defender_escaped);
        let defender = u.player(2).unwrap();
        assert!(!defender.ship.emergency_warp);
        assert!([1, 3].contains(&defender.sector));
        assert_eq!(defender.ship.credits, 1_000);
    }

    #[test]
    fn test_planet_is_captured() {
        let mut u = duel_universe();
        add_planet(&mut u, 5, 2, Some(2));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = u.engage(1, EngageTarget::Planet(5), &mut rng).unwrap();
        assert_eq!(outcome.winner, Winner::Attacker);
        assert_eq!(u.planet(5).unwrap().owner, Some(1));
        assert_eq!(u.player(1).unwrap().planets, vec![5]);
        assert!(u.player(2).unwrap().planets.is_empty());
    }

    #[test]
    fn test_engage_validates_target() {
        let mut u = duel_universe();
        add_planet(&mut u, 5, 2, Some(1));
        add_planet(&mut u, 6, 2, None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(u.engage(1, EngageTarget::Ship(1), &mut rng), Err(ActionError::SelfTarget));
        assert_eq!(u.engage(1, EngageTarget::Planet(5), &mut rng), Err(ActionError::SelfTarget));
        assert_eq!(
            u.engage(1, EngageTarget::Planet(6), &mut rng),
            Err(ActionError::TargetNotFound(6))
        );
        u.hyperspace_jump(2, 3).unwrap();
        assert_eq!(
            u.engage(1, EngageTarget::Ship(2), &mut rng),
            Err(ActionError::TargetNotFound(2))
        );
        assert_eq!(u.player(1).unwrap().turns, 100);
    }

    #[test]
    fn test_handle_drives_universe() {
        let u = Mutex::new(universe(3, vec![pilot("A", 1), pilot("B", 1)]));
        let mut handle = PlayerHandle::new(&u, 1, ChaCha8Rng::seed_from_u64(0));
        assert_eq!(handle.sector().rival_ships, vec![2]);
        handle.move_to(2).unwrap();
        assert_eq!(handle.status().sector, 2);
        assert!(handle.sector().rival_ships.is_empty());
        assert_eq!(handle.special_sector(), SPECIAL_SECTOR);
    }
}
