//! Test fixtures and helpers.
//!
//! Pre-built combatants and AI situations for consistent testing.

use starlane_core::combatant::{Cargo, CombatantSnapshot};
use starlane_core::situation::{AiSituation, CombatSupplies, SectorSummary};
use starlane_core::tech::TechLevels;

/// A fully stocked ship with every tech axis at `level`.
#[must_use]
pub fn ship(id: u64, level: u32) -> CombatantSnapshot {
    CombatantSnapshot::ship(id, format!("Ship {id}"), TechLevels::uniform(level))
}

/// A ship with nothing but hull points and the given beam level and energy.
#[must_use]
pub fn bare_ship(id: u64, beam: u32, energy: u64, armor: u64) -> CombatantSnapshot {
    let mut tech = TechLevels::uniform(1);
    tech.beam = beam;
    tech.shield = 0;
    CombatantSnapshot::ship(id, format!("Ship {id}"), tech)
        .with_fighters(0)
        .with_torpedoes(0)
        .with_energy(energy)
        .with_armor(armor)
}

/// A planet defended by an owner with every tech axis at `level`.
#[must_use]
pub fn planet(id: u64, level: u32, base_built: bool) -> CombatantSnapshot {
    CombatantSnapshot::planet(id, format!("Planet {id}"), TechLevels::uniform(level), base_built)
}

/// A loaded freighter: credits and full holds.
#[must_use]
pub fn freighter(id: u64, credits: u64) -> CombatantSnapshot {
    let tech = TechLevels::uniform(1);
    ship(id, 1).with_credits(credits).with_cargo(Cargo {
        ore: tech.cargo_capacity() / 2,
        organics: tech.cargo_capacity() / 4,
        goods: tech.cargo_capacity() / 4,
        colonists: 0,
    })
}

/// Builder for [`AiSituation`] values.
#[derive(Debug, Clone)]
pub struct SituationBuilder {
    situation: AiSituation,
}

impl Default for SituationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SituationBuilder {
    /// Level-1 ship, full supplies, empty sector, no turns or credits.
    #[must_use]
    pub fn new() -> Self {
        let tech = TechLevels::uniform(1);
        Self {
            situation: AiSituation {
                tech,
                cargo_capacity: tech.cargo_capacity(),
                supplies: CombatSupplies::full(&tech),
                ..AiSituation::default()
            },
        }
    }

    /// Turns available.
    #[must_use]
    pub fn turns(mut self, turns: u32) -> Self {
        self.situation.turns = turns;
        self
    }

    /// Credits on hand.
    #[must_use]
    pub fn credits(mut self, credits: u64) -> Self {
        self.situation.credits = credits;
        self
    }

    /// Uniform tech level; supplies are refilled to the new capacities.
    #[must_use]
    pub fn tech_level(mut self, level: u32) -> Self {
        let tech = TechLevels::uniform(level);
        self.situation.tech = tech;
        self.situation.cargo_capacity = tech.cargo_capacity();
        self.situation.supplies = CombatSupplies::full(&tech);
        self
    }

    /// Cargo aboard.
    #[must_use]
    pub fn cargo(mut self, cargo: Cargo) -> Self {
        self.situation.cargo = cargo;
        self
    }

    /// Fighters at `percent` of capacity.
    #[must_use]
    pub fn fighters_percent(mut self, percent: u64) -> Self {
        let supplies = &mut self.situation.supplies;
        supplies.fighters = supplies.fighter_capacity * percent / 100;
        self
    }

    /// Sector composition.
    #[must_use]
    pub fn sector(mut self, sector: SectorSummary) -> Self {
        self.situation.sector = sector;
        self
    }

    /// Commodity ports in the sector.
    #[must_use]
    pub fn commodity_ports(mut self, count: u32) -> Self {
        self.situation.sector.commodity_ports = count;
        self
    }

    /// Special ports in the sector.
    #[must_use]
    pub fn special_ports(mut self, count: u32) -> Self {
        self.situation.sector.special_ports = count;
        self
    }

    /// Outbound warps.
    #[must_use]
    pub fn warps(mut self, count: u32) -> Self {
        self.situation.sector.warps = count;
        self
    }

    /// Unclaimed planets in the sector.
    #[must_use]
    pub fn unclaimed_planets(mut self, count: u32) -> Self {
        self.situation.sector.unclaimed_planets = count;
        self
    }

    /// Planets owned.
    #[must_use]
    pub fn owned_planets(mut self, count: u32) -> Self {
        self.situation.owned_planets = count;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> AiSituation {
        self.situation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fighters_percent() {
        let situation = SituationBuilder::new()
            .tech_level(3)
            .fighters_percent(30)
            .build();
        assert_eq!(situation.supplies.fighters, 90);
        assert!(situation.supplies.below_half());
    }

    #[test]
    fn test_bare_ship_has_no_defenses() {
        let ship = bare_ship(1, 2, 5000, 100);
        assert_eq!(ship.fighters, 0);
        assert_eq!(ship.torpedoes, 0);
        assert_eq!(ship.energy, 5000);
        assert_eq!(ship.armor, 100);
    }
}
