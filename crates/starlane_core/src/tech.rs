//! Ship tech levels and the capacities derived from them.
//!
//! Every subsystem of a ship has an integer tech level. Combat pools,
//! supply capacities and upgrade prices are all pure functions of these
//! levels so that the personalities and the resolver agree on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Highest tech level any axis can reach.
pub const MAX_TECH_LEVEL: u32 = 30;

/// Base price of an upgrade; the real price doubles per level.
pub const UPGRADE_BASE_COST: u64 = 1000;

/// Fighters carried per computer level.
pub const FIGHTERS_PER_COMPUTER_LEVEL: u64 = 100;

/// Torpedoes carried per launcher level.
pub const TORPEDOES_PER_LAUNCHER_LEVEL: u64 = 100;

/// Armor points per armor level.
pub const ARMOR_PER_LEVEL: u64 = 100;

/// Cargo holds per hull level.
pub const HOLDS_PER_HULL_LEVEL: u64 = 100;

/// Energy storage per power level.
pub const ENERGY_PER_POWER_LEVEL: u64 = 1000;

/// One upgradeable ship subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechAxis {
    /// Hull size, governs cargo holds.
    Hull,
    /// Engines, used in the evasion check.
    Engine,
    /// Power plant, governs energy storage.
    Power,
    /// Computer, governs fighter bays.
    Computer,
    /// Sensors, used to lock on through cloaks.
    Sensors,
    /// Beam weapons.
    Beam,
    /// Torpedo launchers.
    TorpedoLauncher,
    /// Shield generators.
    Shield,
    /// Armor plating.
    Armor,
    /// Cloaking device.
    Cloak,
}

impl TechAxis {
    /// All axes in canonical order.
    pub const ALL: [TechAxis; 10] = [
        TechAxis::Hull,
        TechAxis::Engine,
        TechAxis::Power,
        TechAxis::Computer,
        TechAxis::Sensors,
        TechAxis::Beam,
        TechAxis::TorpedoLauncher,
        TechAxis::Shield,
        TechAxis::Armor,
        TechAxis::Cloak,
    ];

    /// Credit weight of one level on this axis when valuing a ship.
    ///
    /// Armor is not part of a ship's resale value and weighs nothing.
    #[must_use]
    pub const fn net_worth_weight(self) -> u64 {
        match self {
            TechAxis::Hull => 10_000,
            TechAxis::Shield => 8_000,
            TechAxis::Engine => 6_000,
            TechAxis::Computer => 5_000,
            TechAxis::Sensors => 4_000,
            TechAxis::Power => 7_000,
            TechAxis::Beam => 9_000,
            TechAxis::TorpedoLauncher => 8_000,
            TechAxis::Cloak => 3_000,
            TechAxis::Armor => 0,
        }
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TechAxis::Hull => "hull",
            TechAxis::Engine => "engine",
            TechAxis::Power => "power",
            TechAxis::Computer => "computer",
            TechAxis::Sensors => "sensors",
            TechAxis::Beam => "beam",
            TechAxis::TorpedoLauncher => "torpedo_launcher",
            TechAxis::Shield => "shield",
            TechAxis::Armor => "armor",
            TechAxis::Cloak => "cloak",
        }
    }
}

impl fmt::Display for TechAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechAxis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TechAxis::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "tech axis",
                name: s.to_string(),
            })
    }
}

/// Tech level per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechLevels {
    /// Hull level.
    pub hull: u32,
    /// Engine level.
    pub engine: u32,
    /// Power level.
    pub power: u32,
    /// Computer level.
    pub computer: u32,
    /// Sensor level.
    pub sensors: u32,
    /// Beam weapon level.
    pub beam: u32,
    /// Torpedo launcher level.
    pub torpedo_launcher: u32,
    /// Shield level.
    pub shield: u32,
    /// Armor level.
    pub armor: u32,
    /// Cloak level.
    pub cloak: u32,
}

impl Default for TechLevels {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl TechLevels {
    /// Every axis at the same level.
    #[must_use]
    pub const fn uniform(level: u32) -> Self {
        Self {
            hull: level,
            engine: level,
            power: level,
            computer: level,
            sensors: level,
            beam: level,
            torpedo_launcher: level,
            shield: level,
            armor: level,
            cloak: level,
        }
    }

    /// Level on one axis.
    #[must_use]
    pub const fn get(&self, axis: TechAxis) -> u32 {
        match axis {
            TechAxis::Hull => self.hull,
            TechAxis::Engine => self.engine,
            TechAxis::Power => self.power,
            TechAxis::Computer => self.computer,
            TechAxis::Sensors => self.sensors,
            TechAxis::Beam => self.beam,
            TechAxis::TorpedoLauncher => self.torpedo_launcher,
            TechAxis::Shield => self.shield,
            TechAxis::Armor => self.armor,
            TechAxis::Cloak => self.cloak,
        }
    }

    /// Mutable access to one axis.
    pub fn get_mut(&mut self, axis: TechAxis) -> &mut u32 {
        match axis {
            TechAxis::Hull => &mut self.hull,
            TechAxis::Engine => &mut self.engine,
            TechAxis::Power => &mut self.power,
            TechAxis::Computer => &mut self.computer,
            TechAxis::Sensors => &mut self.sensors,
            TechAxis::Beam => &mut self.beam,
            TechAxis::TorpedoLauncher => &mut self.torpedo_launcher,
            TechAxis::Shield => &mut self.shield,
            TechAxis::Armor => &mut self.armor,
            TechAxis::Cloak => &mut self.cloak,
        }
    }

    /// Sum of all ten levels.
    #[must_use]
    pub fn total(&self) -> u64 {
        TechAxis::ALL
            .iter()
            .map(|&axis| u64::from(self.get(axis)))
            .sum()
    }

    /// Average level across the ten axes, rounded down.
    #[must_use]
    pub fn average_floor(&self) -> u64 {
        self.total() / TechAxis::ALL.len() as u64
    }

    /// Average level across the ten axes.
    #[must_use]
    pub fn average(&self) -> f64 {
        self.total() as f64 / TechAxis::ALL.len() as f64
    }

    /// What a typical next upgrade costs at this average level.
    #[must_use]
    pub fn expected_upgrade_cost(&self) -> u64 {
        upgrade_cost_at(self.average_floor())
    }

    /// Price of raising `axis` by one level, or `None` at the cap.
    #[must_use]
    pub fn upgrade_cost(&self, axis: TechAxis) -> Option<u64> {
        let level = self.get(axis);
        (level < MAX_TECH_LEVEL).then(|| upgrade_cost_at(u64::from(level)))
    }

    /// Resale value of a ship with these levels.
    #[must_use]
    pub fn net_worth(&self) -> u64 {
        TechAxis::ALL
            .iter()
            .map(|&axis| u64::from(self.get(axis)) * axis.net_worth_weight())
            .sum()
    }

    /// Fighter bay capacity.
    #[must_use]
    pub fn fighter_capacity(&self) -> u64 {
        u64::from(self.computer) * FIGHTERS_PER_COMPUTER_LEVEL
    }

    /// Torpedo magazine capacity.
    #[must_use]
    pub fn torpedo_capacity(&self) -> u64 {
        u64::from(self.torpedo_launcher) * TORPEDOES_PER_LAUNCHER_LEVEL
    }

    /// Maximum armor points.
    #[must_use]
    pub fn armor_capacity(&self) -> u64 {
        u64::from(self.armor) * ARMOR_PER_LEVEL
    }

    /// Cargo holds.
    #[must_use]
    pub fn cargo_capacity(&self) -> u64 {
        u64::from(self.hull) * HOLDS_PER_HULL_LEVEL
    }

    /// Maximum stored energy.
    #[must_use]
    pub fn energy_capacity(&self) -> u64 {
        u64::from(self.power) * ENERGY_PER_POWER_LEVEL
    }
}

/// `1000 × 2^level`, saturating for absurd levels.
#[must_use]
pub fn upgrade_cost_at(level: u64) -> u64 {
    let factor = 1u64.checked_shl(level.min(63) as u32).unwrap_or(u64::MAX);
    UPGRADE_BASE_COST.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_worth_of_level_one_ship() {
        let tech = TechLevels::default();
        // 10000 + 8000 + 6000 + 5000 + 4000 + 7000 + 9000 + 8000 + 3000
        assert_eq!(tech.net_worth(), 60_000);
    }

    #[test]
    fn test_net_worth_ignores_armor() {
        let mut tech = TechLevels::default();
        let before = tech.net_worth();
        tech.armor = 20;
        assert_eq!(tech.net_worth(), before);
    }

    #[test]
    fn test_expected_upgrade_cost_uses_floor_of_average() {
        let mut tech = TechLevels::uniform(3);
        tech.hull = 12; // total 39, average 3.9
        assert_eq!(tech.average_floor(), 3);
        assert_eq!(tech.expected_upgrade_cost(), 8_000);
    }

    #[test]
    fn test_upgrade_cost_capped() {
        let mut tech = TechLevels::default();
        assert_eq!(tech.upgrade_cost(TechAxis::Beam), Some(2_000));
        tech.beam = MAX_TECH_LEVEL;
        assert_eq!(tech.upgrade_cost(TechAxis::Beam), None);
    }

    #[test]
    fn test_capacities() {
        let mut tech = TechLevels::default();
        tech.computer = 3;
        tech.torpedo_launcher = 2;
        assert_eq!(tech.fighter_capacity(), 300);
        assert_eq!(tech.torpedo_capacity(), 200);
        assert_eq!(tech.armor_capacity(), 100);
        assert_eq!(tech.cargo_capacity(), 100);
    }

    #[test]
    fn test_axis_round_trips_through_name() {
        for axis in TechAxis::ALL {
            assert_eq!(axis.as_str().parse::<TechAxis>().ok(), Some(axis));
        }
        assert!("warp_drive".parse::<TechAxis>().is_err());
    }

    #[test]
    fn test_get_mut_targets_axis() {
        let mut tech = TechLevels::default();
        *tech.get_mut(TechAxis::Cloak) += 4;
        assert_eq!(tech.cloak, 5);
        assert_eq!(tech.get(TechAxis::Cloak), 5);
    }
}
