//! What an AI player knows when it decides.
//!
//! Built fresh by the orchestrator for every decision cycle and thrown away
//! afterwards; nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::combatant::Cargo;
use crate::tech::TechLevels;

/// Credits above `HOARDING_MULTIPLIER × expected upgrade cost` count as hoarding.
pub const HOARDING_MULTIPLIER: u64 = 50;

/// Average tech level at which hoarding is no longer corrected.
pub const HOARDING_LEVEL_CEILING: f64 = 15.0;

/// Composition of the sector the player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SectorSummary {
    /// Sector number.
    pub number: u32,
    /// Commodity ports present.
    pub commodity_ports: u32,
    /// Special (upgrade) ports present.
    pub special_ports: u32,
    /// Planets nobody owns yet.
    pub unclaimed_planets: u32,
    /// Outbound warps.
    pub warps: u32,
}

/// Fighters, torpedoes and armor against their tech-derived capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CombatSupplies {
    /// Fighters aboard.
    pub fighters: u64,
    /// Fighter capacity.
    pub fighter_capacity: u64,
    /// Torpedoes aboard.
    pub torpedoes: u64,
    /// Torpedo capacity.
    pub torpedo_capacity: u64,
    /// Armor points.
    pub armor: u64,
    /// Armor capacity.
    pub armor_capacity: u64,
}

impl CombatSupplies {
    /// Full supplies for the given tech levels.
    #[must_use]
    pub fn full(tech: &TechLevels) -> Self {
        Self {
            fighters: tech.fighter_capacity(),
            fighter_capacity: tech.fighter_capacity(),
            torpedoes: tech.torpedo_capacity(),
            torpedo_capacity: tech.torpedo_capacity(),
            armor: tech.armor_capacity(),
            armor_capacity: tech.armor_capacity(),
        }
    }

    /// Whether any supply is below half of its capacity.
    #[must_use]
    pub fn below_half(&self) -> bool {
        let below = |current: u64, capacity: u64| current.saturating_mul(2) < capacity;
        below(self.fighters, self.fighter_capacity)
            || below(self.torpedoes, self.torpedo_capacity)
            || below(self.armor, self.armor_capacity)
    }

    /// Whether everything is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.fighters >= self.fighter_capacity
            && self.torpedoes >= self.torpedo_capacity
            && self.armor >= self.armor_capacity
    }
}

/// Snapshot of one AI player's situation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AiSituation {
    /// Player identifier.
    pub player_id: u64,
    /// Turns available.
    pub turns: u32,
    /// Credits on hand.
    pub credits: u64,
    /// Ship tech levels.
    pub tech: TechLevels,
    /// Cargo in the holds.
    pub cargo: Cargo,
    /// Hold capacity.
    pub cargo_capacity: u64,
    /// Combat supplies.
    pub supplies: CombatSupplies,
    /// Current sector.
    pub sector: SectorSummary,
    /// Planets this player owns anywhere.
    pub owned_planets: u32,
}

impl AiSituation {
    /// Whether the player sits at an upgrade port.
    #[must_use]
    pub fn at_special_port(&self) -> bool {
        self.sector.special_ports > 0
    }

    /// Whether a commodity port is in reach.
    #[must_use]
    pub fn has_commodity_port(&self) -> bool {
        self.sector.commodity_ports > 0
    }

    /// Holds in use.
    #[must_use]
    pub fn cargo_total(&self) -> u64 {
        self.cargo.total()
    }

    /// Free holds.
    #[must_use]
    pub fn free_holds(&self) -> u64 {
        self.cargo_capacity.saturating_sub(self.cargo_total())
    }

    /// Whether the player can raise cash right here.
    #[must_use]
    pub fn can_raise_cash(&self) -> bool {
        self.cargo_total() > 10 || self.has_commodity_port()
    }

    /// Whether credits are piling up without matching tech growth.
    #[must_use]
    pub fn is_hoarding(&self) -> bool {
        let threshold = HOARDING_MULTIPLIER.saturating_mul(self.tech.expected_upgrade_cost());
        self.credits > threshold && self.tech.average() < HOARDING_LEVEL_CEILING
    }
}
