//! The game-state collaborator the executor drives.
//!
//! [`GameFacade`] is the persistence boundary: every primitive is a small
//! state transition on the player's records, and every primitive answers
//! with enough new state for the executor to carry on without re-querying.
//! The executor only ever sees what a player in the current sector would see.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::CombatOutcome;
use crate::combatant::{Cargo, Commodity};
use crate::situation::CombatSupplies;
use crate::tech::{TechAxis, TechLevels};

/// A primitive the game refused to perform.
///
/// These are sub-action failures: the executor records them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The player has no turns left.
    #[error("no turns remaining")]
    NoTurns,
    /// Not enough credits.
    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits {
        /// Credits required.
        needed: u64,
        /// Credits on hand.
        available: u64,
    },
    /// No free holds.
    #[error("cargo holds full")]
    CargoFull,
    /// Nothing of that commodity aboard.
    #[error("no {0} to sell")]
    NothingToSell(Commodity),
    /// The port has no stock left.
    #[error("port {0} is out of stock")]
    OutOfStock(u64),
    /// The port does not trade that way.
    #[error("cannot {side} {commodity} at port {port}")]
    NotTraded {
        /// Port identifier.
        port: u64,
        /// Requested side.
        side: TradeSide,
        /// Requested commodity.
        commodity: Commodity,
    },
    /// No such port in the current sector.
    #[error("port {0} is not in this sector")]
    NoPort(u64),
    /// The action needs a special port.
    #[error("not at a special port")]
    NotAtSpecialPort,
    /// No warp leads there.
    #[error("no warp from sector {from} to {to}")]
    NoWarp {
        /// Current sector.
        from: u32,
        /// Requested sector.
        to: u32,
    },
    /// Sector does not exist.
    #[error("unknown sector {0}")]
    UnknownSector(u32),
    /// The tech axis is already at its cap.
    #[error("{0} is already at maximum level")]
    MaxLevel(TechAxis),
    /// No unclaimed planet by that name here.
    #[error("no unclaimed planet '{name}' in sector {sector}")]
    NothingToClaim {
        /// Sector searched.
        sector: u32,
        /// Planet name requested.
        name: String,
    },
    /// The planet belongs to someone else.
    #[error("planet {0} is not owned by this player")]
    NotOwner(u64),
    /// Engagement target missing or out of reach.
    #[error("target {0} not found in this sector")]
    TargetNotFound(u64),
    /// Players may not attack their own ship or planet.
    #[error("cannot attack own assets")]
    SelfTarget,
    /// The quantity was zero.
    #[error("quantity must be positive")]
    ZeroQuantity,
}

/// Direction of a trade, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    /// Player buys from the port.
    Buy,
    /// Player sells to the port.
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        })
    }
}

/// Kind of port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    /// Sells its native commodity, buys the others.
    Commodity(Commodity),
    /// Upgrades and combat supplies.
    Special,
}

/// A port as seen from the sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortView {
    /// Port identifier.
    pub id: u64,
    /// Port kind.
    pub kind: PortKind,
    /// Units of the native commodity on sale.
    pub stock: u64,
    /// Price per unit of the native commodity.
    pub sell_price: u64,
    /// Price per unit the port pays for other commodities.
    pub buy_price: u64,
}

impl PortView {
    /// Native commodity, if this is a commodity port.
    #[must_use]
    pub const fn native(&self) -> Option<Commodity> {
        match self.kind {
            PortKind::Commodity(commodity) => Some(commodity),
            PortKind::Special => None,
        }
    }

    /// Whether the port buys this commodity from players.
    #[must_use]
    pub fn buys(&self, commodity: Commodity) -> bool {
        self.native().is_some_and(|native| native != commodity)
    }
}

/// A planet as seen from the sector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanetView {
    /// Planet identifier.
    pub id: u64,
    /// Planet name.
    pub name: String,
    /// Owning player, if any.
    pub owner: Option<u64>,
}

/// The player's current sector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectorView {
    /// Sector number.
    pub number: u32,
    /// Ports here.
    pub ports: Vec<PortView>,
    /// Planets here.
    pub planets: Vec<PlanetView>,
    /// Sectors reachable in one move.
    pub warps: Vec<u32>,
    /// Other players' ships present.
    pub rival_ships: Vec<u64>,
}

impl SectorView {
    /// First commodity port, if any.
    #[must_use]
    pub fn commodity_port(&self) -> Option<&PortView> {
        self.ports.iter().find(|port| port.native().is_some())
    }

    /// Whether a special port is here.
    #[must_use]
    pub fn has_special_port(&self) -> bool {
        self.ports.iter().any(|port| port.kind == PortKind::Special)
    }

    /// Planets nobody owns.
    pub fn unclaimed_planets(&self) -> impl Iterator<Item = &PlanetView> {
        self.planets.iter().filter(|planet| planet.owner.is_none())
    }

    /// First planet owned by someone other than `player`.
    #[must_use]
    pub fn rival_planet(&self, player: u64) -> Option<&PlanetView> {
        self.planets
            .iter()
            .find(|planet| planet.owner.is_some_and(|owner| owner != player))
    }
}

/// The player's own state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Player identifier.
    pub player_id: u64,
    /// Current sector number.
    pub sector: u32,
    /// Turns left.
    pub turns: u32,
    /// Credits on hand.
    pub credits: u64,
    /// Cargo aboard.
    pub cargo: Cargo,
    /// Hold capacity.
    pub cargo_capacity: u64,
    /// Ship tech levels.
    pub tech: TechLevels,
    /// Combat supplies.
    pub supplies: CombatSupplies,
    /// Identifiers of owned planets.
    pub planets: Vec<u64>,
}

impl PlayerStatus {
    /// Free holds.
    #[must_use]
    pub fn free_holds(&self) -> u64 {
        self.cargo_capacity.saturating_sub(self.cargo.total())
    }
}

/// State after a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// Credits after the trade.
    pub credits: u64,
    /// Cargo after the trade.
    pub cargo: Cargo,
}

/// Combat supplies to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplyOrder {
    /// Fighters wanted.
    pub fighters: u64,
    /// Torpedoes wanted.
    pub torpedoes: u64,
    /// Armor points wanted.
    pub armor: u64,
}

impl SupplyOrder {
    /// Whatever is missing to reach capacity.
    #[must_use]
    pub fn top_up(supplies: &CombatSupplies) -> Self {
        Self {
            fighters: supplies.fighter_capacity.saturating_sub(supplies.fighters),
            torpedoes: supplies.torpedo_capacity.saturating_sub(supplies.torpedoes),
            armor: supplies.armor_capacity.saturating_sub(supplies.armor),
        }
    }

    /// Whether nothing is ordered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fighters == 0 && self.torpedoes == 0 && self.armor == 0
    }
}

/// What a supply purchase actually delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplyReceipt {
    /// Items delivered.
    pub delivered: SupplyOrder,
    /// Credits spent.
    pub cost: u64,
}

/// Target of an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngageTarget {
    /// Another player's ship.
    Ship(u64),
    /// A planet owned by another player.
    Planet(u64),
}

impl EngageTarget {
    /// Identifier of the target.
    #[must_use]
    pub const fn id(self) -> u64 {
        match self {
            EngageTarget::Ship(id) | EngageTarget::Planet(id) => id,
        }
    }
}

/// Primitives a player (AI or human) can invoke on the game.
///
/// Implementations own all persistent state. Each call either applies one
/// complete transition or fails without side effects. Turn costs: trade,
/// move, hyperspace, claim, develop and engage cost one turn; upgrades and
/// supply purchases are free.
pub trait GameFacade {
    /// The player's own state.
    fn status(&self) -> PlayerStatus;

    /// The current sector.
    fn sector(&self) -> SectorView;

    /// Sector holding the special port.
    fn special_sector(&self) -> u32 {
        0
    }

    /// Buy or sell at a port in the current sector.
    ///
    /// # Errors
    /// Fails on missing port, stock, holds, credits or turns.
    fn trade(
        &mut self,
        port: u64,
        side: TradeSide,
        commodity: Commodity,
        quantity: u64,
    ) -> Result<TradeReceipt, ActionError>;

    /// Move through a warp.
    ///
    /// # Errors
    /// Fails when no warp leads to `sector` or no turns are left.
    fn move_to(&mut self, sector: u32) -> Result<(), ActionError>;

    /// Jump directly to any sector.
    ///
    /// # Errors
    /// Fails for unknown sectors or when no turns are left.
    fn hyperspace_jump(&mut self, sector: u32) -> Result<(), ActionError>;

    /// Buy one level on a tech axis; returns the new level.
    ///
    /// # Errors
    /// Fails away from a special port, at the level cap or without credits.
    fn upgrade_ship(&mut self, axis: TechAxis) -> Result<u32, ActionError>;

    /// Claim an unowned planet; returns its identifier.
    ///
    /// # Errors
    /// Fails when no such unclaimed planet exists here.
    fn claim_planet(&mut self, sector: u32, name: &str) -> Result<u64, ActionError>;

    /// Buy fighters, torpedoes and armor, as much of the order as credits allow.
    ///
    /// # Errors
    /// Fails away from a special port or when nothing is affordable.
    fn purchase_combat_supplies(&mut self, order: SupplyOrder)
        -> Result<SupplyReceipt, ActionError>;

    /// Invest in an owned planet.
    ///
    /// # Errors
    /// Fails for planets the player does not own, or without credits or turns.
    fn develop_planet(&mut self, planet: u64) -> Result<(), ActionError>;

    /// Attack a rival ship or planet in the current sector.
    ///
    /// The implementation resolves one combat round and persists its effects.
    ///
    /// # Errors
    /// Fails when the target is missing, owned by the player, or no turns are left.
    fn engage(&mut self, target: EngageTarget) -> Result<CombatOutcome, ActionError>;
}
