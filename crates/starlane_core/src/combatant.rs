//! Combatant snapshots: the plain data the resolver works on.
//!
//! A snapshot describes either a ship or a planet acting as a defender.
//! Counts are unsigned; persisted rows arrive as [`CombatantRecord`] with
//! signed fields and are validated once, at the boundary, via `TryFrom`.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::tech::{TechAxis, TechLevels};

/// Armor points a freshly reset ship starts with.
pub const BASE_ARMOR: u64 = 100;

/// Something that can be bought or sold at a commodity port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    /// Raw ore.
    Ore,
    /// Organics.
    Organics,
    /// Manufactured goods.
    Goods,
    /// Energy cells, stored in the power plant rather than the holds.
    Energy,
}

impl Commodity {
    /// Commodities carried in cargo holds.
    pub const HOLD_CARGO: [Commodity; 3] = [Commodity::Ore, Commodity::Organics, Commodity::Goods];

    /// Whether this commodity occupies cargo holds.
    #[must_use]
    pub const fn is_hold_cargo(self) -> bool {
        !matches!(self, Commodity::Energy)
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Commodity::Ore => "ore",
            Commodity::Organics => "organics",
            Commodity::Goods => "goods",
            Commodity::Energy => "energy",
        }
    }
}

impl std::fmt::Display for Commodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cargo carried in holds (or stored on a planet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cargo {
    /// Ore units.
    pub ore: u64,
    /// Organics units.
    pub organics: u64,
    /// Goods units.
    pub goods: u64,
    /// Colonists aboard.
    pub colonists: u64,
}

impl Cargo {
    /// Amount of a hold commodity. Energy is never held as cargo.
    #[must_use]
    pub const fn amount(&self, commodity: Commodity) -> u64 {
        match commodity {
            Commodity::Ore => self.ore,
            Commodity::Organics => self.organics,
            Commodity::Goods => self.goods,
            Commodity::Energy => 0,
        }
    }

    /// Set the amount of a hold commodity. Setting energy is a no-op.
    pub fn set_amount(&mut self, commodity: Commodity, amount: u64) {
        match commodity {
            Commodity::Ore => self.ore = amount,
            Commodity::Organics => self.organics = amount,
            Commodity::Goods => self.goods = amount,
            Commodity::Energy => {}
        }
    }

    /// Holds in use, colonists included.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.ore
            .saturating_add(self.organics)
            .saturating_add(self.goods)
            .saturating_add(self.colonists)
    }
}

/// One side of an engagement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Ship or planet identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Hull/armor points.
    pub armor: u64,
    /// Maximum hull/armor points.
    pub armor_max: u64,
    /// Stored energy; beam and shield pools draw from it.
    pub energy: u64,
    /// Maximum stored energy.
    pub energy_max: u64,
    /// Fighters aboard (or stationed on the planet).
    pub fighters: u64,
    /// Torpedoes in the magazine.
    pub torpedoes: u64,
    /// Tech levels. For planets these are the owner's ship levels.
    pub tech: TechLevels,
    /// Cargo or planet stockpile.
    pub cargo: Cargo,
    /// Credits carried.
    pub credits: u64,
    /// Planet only: a base adds one effective level to beam, shield and torpedo capacity.
    pub base_built: bool,
    /// Ship only: an emergency warp device that escapes any engagement once.
    pub emergency_warp: bool,
}

impl CombatantSnapshot {
    /// A ship at the given tech levels, fully stocked.
    #[must_use]
    pub fn ship(id: u64, name: impl Into<String>, tech: TechLevels) -> Self {
        Self {
            id,
            name: name.into(),
            armor: tech.armor_capacity(),
            armor_max: tech.armor_capacity(),
            energy: tech.energy_capacity(),
            energy_max: tech.energy_capacity(),
            fighters: tech.fighter_capacity(),
            torpedoes: tech.torpedo_capacity(),
            tech,
            cargo: Cargo::default(),
            credits: 0,
            base_built: false,
            emergency_warp: false,
        }
    }

    /// A planet defended with its owner's tech levels and nothing stockpiled.
    #[must_use]
    pub fn planet(id: u64, name: impl Into<String>, owner_tech: TechLevels, base_built: bool) -> Self {
        Self {
            id,
            name: name.into(),
            armor: 0,
            armor_max: 0,
            energy: 0,
            energy_max: 0,
            fighters: 0,
            torpedoes: 0,
            tech: owner_tech,
            cargo: Cargo::default(),
            credits: 0,
            base_built,
            emergency_warp: false,
        }
    }

    /// Builder: set fighters.
    #[must_use]
    pub fn with_fighters(mut self, fighters: u64) -> Self {
        self.fighters = fighters;
        self
    }

    /// Builder: set torpedoes.
    #[must_use]
    pub fn with_torpedoes(mut self, torpedoes: u64) -> Self {
        self.torpedoes = torpedoes;
        self
    }

    /// Builder: set energy (raising the maximum if needed).
    #[must_use]
    pub fn with_energy(mut self, energy: u64) -> Self {
        self.energy = energy;
        self.energy_max = self.energy_max.max(energy);
        self
    }

    /// Builder: set armor (raising the maximum if needed).
    #[must_use]
    pub fn with_armor(mut self, armor: u64) -> Self {
        self.armor = armor;
        self.armor_max = self.armor_max.max(armor);
        self
    }

    /// Builder: set cargo.
    #[must_use]
    pub fn with_cargo(mut self, cargo: Cargo) -> Self {
        self.cargo = cargo;
        self
    }

    /// Builder: set credits.
    #[must_use]
    pub fn with_credits(mut self, credits: u64) -> Self {
        self.credits = credits;
        self
    }

    /// Builder: fit an emergency warp device.
    #[must_use]
    pub fn with_emergency_warp(mut self) -> Self {
        self.emergency_warp = true;
        self
    }

    /// Effective level on a combat axis, including the planetary base bonus.
    #[must_use]
    pub fn effective_level(&self, axis: TechAxis) -> u64 {
        let bonus = match axis {
            TechAxis::Beam | TechAxis::Shield | TechAxis::TorpedoLauncher if self.base_built => 1,
            _ => 0,
        };
        u64::from(self.tech.get(axis)) + bonus
    }

    /// Reset to level-1 base stats after losing an engagement.
    ///
    /// Credits are kept; everything else is stripped.
    pub fn reset_to_base(&mut self) {
        self.tech = TechLevels::uniform(1);
        self.armor = BASE_ARMOR;
        self.armor_max = BASE_ARMOR;
        self.fighters = 0;
        self.torpedoes = 0;
        self.energy = 0;
        self.cargo = Cargo::default();
        self.emergency_warp = false;
    }
}

/// A combatant as it comes out of persistence, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantRecord {
    /// Identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Hull/armor points.
    pub armor: i64,
    /// Maximum hull/armor points.
    pub armor_max: i64,
    /// Stored energy.
    pub energy: i64,
    /// Maximum stored energy.
    pub energy_max: i64,
    /// Fighters.
    pub fighters: i64,
    /// Torpedoes.
    pub torpedoes: i64,
    /// Tech levels in [`TechAxis::ALL`] order.
    pub tech: [i64; 10],
    /// Ore.
    pub ore: i64,
    /// Organics.
    pub organics: i64,
    /// Goods.
    pub goods: i64,
    /// Colonists.
    pub colonists: i64,
    /// Credits.
    pub credits: i64,
    /// Planet base flag.
    pub base_built: bool,
    /// Emergency warp flag.
    pub emergency_warp: bool,
}

fn non_negative(field: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| CoreError::InvalidSnapshot { field, value })
}

impl TryFrom<CombatantRecord> for CombatantSnapshot {
    type Error = CoreError;

    fn try_from(record: CombatantRecord) -> Result<Self> {
        let mut tech = TechLevels::uniform(0);
        for (axis, &raw) in TechAxis::ALL.iter().zip(record.tech.iter()) {
            let level = u32::try_from(raw).map_err(|_| CoreError::InvalidSnapshot {
                field: axis.as_str(),
                value: raw,
            })?;
            *tech.get_mut(*axis) = level;
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            armor: non_negative("armor", record.armor)?,
            armor_max: non_negative("armor_max", record.armor_max)?,
            energy: non_negative("energy", record.energy)?,
            energy_max: non_negative("energy_max", record.energy_max)?,
            fighters: non_negative("fighters", record.fighters)?,
            torpedoes: non_negative("torpedoes", record.torpedoes)?,
            tech,
            cargo: Cargo {
                ore: non_negative("ore", record.ore)?,
                organics: non_negative("organics", record.organics)?,
                goods: non_negative("goods", record.goods)?,
                colonists: non_negative("colonists", record.colonists)?,
            },
            credits: non_negative("credits", record.credits)?,
            base_built: record.base_built,
            emergency_warp: record.emergency_warp,
        })
    }
}
