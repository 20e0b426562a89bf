//! The combat rules and the resolution algorithm.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::log::{CombatLog, Side, TargetResource};
use super::rng::RollSource;
use super::{CombatEnd, CombatOutcome, Salvage, SidePools, Winner};
use crate::combatant::CombatantSnapshot;
use crate::tech::TechAxis;

/// Tunable constants of the combat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Beam output per effective beam level.
    pub beam_per_level: u64,
    /// Shield pool per effective shield level.
    pub shield_per_level: u64,
    /// Torpedoes launchable per effective launcher level.
    pub torpedoes_per_launcher_level: u64,
    /// Damage per torpedo.
    pub torpedo_damage: u64,
    /// Base of the engine and sensor checks: `(base - defense + offense) × step`.
    pub check_base: i64,
    /// Multiplier of the engine and sensor checks.
    pub check_step: i64,
    /// Share of the loser's credits salvaged, in percent.
    pub credit_salvage_percent: u64,
    /// Share of the loser's ship value salvaged, in percent.
    pub net_worth_salvage_percent: u64,
    /// Share of the loser's cargo salvaged, in percent.
    pub cargo_salvage_percent: u64,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            beam_per_level: 1000,
            shield_per_level: 1000,
            torpedoes_per_launcher_level: 100,
            torpedo_damage: 10,
            check_base: 10,
            check_step: 5,
            credit_salvage_percent: 50,
            net_worth_salvage_percent: 25,
            cargo_salvage_percent: 10,
        }
    }
}

/// Mutable state of one side while the round is fought.
///
/// Armor is signed: beam and torpedo overflow may drive it below zero,
/// it is floored only when the final snapshot is written.
#[derive(Debug, Clone, Copy)]
struct Fighting {
    armor: i64,
    fighters: u64,
    beams: u64,
    shields: u64,
    pools: SidePools,
}

impl Fighting {
    fn new(snapshot: &CombatantSnapshot, beam_power: u64, shield_pool: u64, torpedoes: u64) -> Self {
        Self {
            armor: i64::try_from(snapshot.armor).unwrap_or(i64::MAX),
            fighters: snapshot.fighters,
            beams: beam_power,
            shields: shield_pool,
            pools: SidePools {
                beam_power,
                shield_pool,
                shields_remaining: shield_pool,
                torpedoes_fired: torpedoes,
            },
        }
    }

    fn take_hull_damage(&mut self, amount: u64) {
        self.armor = self
            .armor
            .saturating_sub(i64::try_from(amount).unwrap_or(i64::MAX));
    }

    fn hull_destroyed(&self) -> bool {
        self.armor <= 0
    }

    fn planet_defeated(&self) -> bool {
        self.fighters == 0 && self.shields == 0
    }

    /// Write the end-of-round values into a copy of the starting snapshot.
    fn finish(mut self, start: &CombatantSnapshot) -> (CombatantSnapshot, SidePools) {
        self.pools.shields_remaining = self.shields;
        let shields_lost = self.pools.shield_pool - self.shields;

        let mut end = start.clone();
        end.armor = u64::try_from(self.armor.max(0)).unwrap_or(0);
        end.fighters = self.fighters;
        end.torpedoes = start.torpedoes - self.pools.torpedoes_fired;
        end.energy = start
            .energy
            .saturating_sub(self.pools.beam_power)
            .saturating_sub(shields_lost);
        (end, self.pools)
    }
}

fn percent_of(value: u64, percent: u64) -> u64 {
    u64::try_from(u128::from(value) * u128::from(percent) / 100).unwrap_or(u64::MAX)
}

impl CombatRules {
    /// Torpedoes a combatant can launch this round.
    ///
    /// These are loaded before any check is rolled, so they are spent even
    /// when the round ends early.
    #[must_use]
    pub fn usable_torpedoes(&self, combatant: &CombatantSnapshot) -> u64 {
        let capacity = combatant
            .effective_level(TechAxis::TorpedoLauncher)
            .saturating_mul(self.torpedoes_per_launcher_level);
        combatant.torpedoes.min(capacity)
    }

    /// Beam output: `min(level × beam_per_level, energy)`.
    #[must_use]
    pub fn beam_power(&self, combatant: &CombatantSnapshot) -> u64 {
        combatant
            .effective_level(TechAxis::Beam)
            .saturating_mul(self.beam_per_level)
            .min(combatant.energy)
    }

    /// Shield pool: `min(level × shield_per_level, energy left after beams)`.
    #[must_use]
    pub fn shield_pool(&self, combatant: &CombatantSnapshot) -> u64 {
        let remaining_energy = combatant.energy.saturating_sub(self.beam_power(combatant));
        combatant
            .effective_level(TechAxis::Shield)
            .saturating_mul(self.shield_per_level)
            .min(remaining_energy)
    }

    /// Success chance in percent for an offense level against a defense level.
    ///
    /// Not clamped; anything at or above 100 always succeeds, anything at or
    /// below 0 always fails.
    #[must_use]
    pub fn check_chance(&self, defense_level: u32, offense_level: u32) -> i64 {
        (self.check_base - i64::from(defense_level) + i64::from(offense_level)) * self.check_step
    }

    /// Salvage a winning attacker takes from a destroyed ship.
    #[must_use]
    pub fn salvage_from(&self, loser: &CombatantSnapshot) -> Salvage {
        Salvage {
            credits: percent_of(loser.credits, self.credit_salvage_percent).saturating_add(
                percent_of(loser.tech.net_worth(), self.net_worth_salvage_percent),
            ),
            ore: percent_of(loser.cargo.ore, self.cargo_salvage_percent),
            organics: percent_of(loser.cargo.organics, self.cargo_salvage_percent),
            goods: percent_of(loser.cargo.goods, self.cargo_salvage_percent),
            colonists: percent_of(loser.cargo.colonists, self.cargo_salvage_percent),
        }
    }

    /// Resolve one complete round.
    ///
    /// Draws at most two rolls, and only for ship defenders.
    pub fn resolve<R: RollSource>(
        &self,
        attacker: &CombatantSnapshot,
        defender: &CombatantSnapshot,
        defender_is_planet: bool,
        rolls: &mut R,
    ) -> CombatOutcome {
        let mut log = CombatLog::default();
        let attacker_torpedoes = self.usable_torpedoes(attacker);
        let defender_torpedoes = self.usable_torpedoes(defender);

        debug!(
            attacker = attacker.id,
            defender = defender.id,
            defender_is_planet,
            "Resolving combat round"
        );

        log.attack(
            Side::Attacker,
            "engage",
            format!("{} engages {}", attacker.name, defender.name),
        );

        if !defender_is_planet {
            let engine_chance = self.check_chance(defender.tech.engine, attacker.tech.engine);
            let roll = i64::from(rolls.roll_percent());
            trace!(engine_chance, roll, "Engine check");
            if roll > engine_chance {
                log.result(
                    Side::Defender,
                    "outmaneuvered",
                    format!("{} outmaneuvers {}", defender.name, attacker.name),
                );
                return early_exit(
                    attacker,
                    defender.clone(),
                    attacker_torpedoes,
                    log,
                    Winner::Draw,
                    CombatEnd::Outmaneuvered,
                );
            }

            let sensor_chance = self.check_chance(defender.tech.cloak, attacker.tech.sensors);
            let roll = i64::from(rolls.roll_percent());
            trace!(sensor_chance, roll, "Sensor check");
            if roll > sensor_chance {
                log.result(
                    Side::Attacker,
                    "no_lock",
                    format!("{} is unable to get a lock on {}", attacker.name, defender.name),
                );
                return early_exit(
                    attacker,
                    defender.clone(),
                    attacker_torpedoes,
                    log,
                    Winner::Draw,
                    CombatEnd::NoLock,
                );
            }

            if defender.emergency_warp {
                let mut escaped = defender.clone();
                escaped.emergency_warp = false;
                log.result(
                    Side::Defender,
                    "emergency_warp",
                    format!("{} escapes by emergency warp", defender.name),
                );
                return early_exit(
                    attacker,
                    escaped,
                    attacker_torpedoes,
                    log,
                    Winner::Defender,
                    CombatEnd::Escaped,
                );
            }
        }

        let mut a = Fighting::new(
            attacker,
            self.beam_power(attacker),
            self.shield_pool(attacker),
            attacker_torpedoes,
        );
        let mut d = Fighting::new(
            defender,
            self.beam_power(defender),
            self.shield_pool(defender),
            defender_torpedoes,
        );

        self.beam_phase(&mut a, &mut d, defender_is_planet, &mut log);
        let standing = |a: &Fighting, d: &Fighting| {
            let defender_down = if defender_is_planet {
                d.planet_defeated()
            } else {
                d.hull_destroyed()
            };
            !a.hull_destroyed() && !defender_down
        };

        if standing(&a, &d) {
            self.torpedo_phase(&mut a, &mut d, defender_is_planet, &mut log);
        }
        if standing(&a, &d) {
            fighter_phase(&mut a, &mut d, defender_is_planet, &mut log);
        }

        let attacker_down = a.hull_destroyed();
        let defender_down = if defender_is_planet {
            d.planet_defeated()
        } else {
            d.hull_destroyed()
        };

        let (winner, end) = match (attacker_down, defender_down) {
            (true, true) => {
                log.result(
                    Side::Attacker,
                    "mutual_destruction",
                    "Both combatants are destroyed".to_string(),
                );
                (Winner::Draw, CombatEnd::MutualDestruction)
            }
            (true, false) => {
                log.result(
                    Side::Defender,
                    "defender_victory",
                    format!("{} destroys {}", defender.name, attacker.name),
                );
                (Winner::Defender, CombatEnd::DefenderVictory)
            }
            (false, true) => {
                let description = if defender_is_planet {
                    format!("{} strips {} of its defenses", attacker.name, defender.name)
                } else {
                    format!("{} destroys {}", attacker.name, defender.name)
                };
                log.result(Side::Attacker, "attacker_victory", description);
                (Winner::Attacker, CombatEnd::AttackerVictory)
            }
            (false, false) => {
                log.result(
                    Side::Attacker,
                    "stalemate",
                    "Both combatants survive the exchange".to_string(),
                );
                (Winner::Draw, CombatEnd::Stalemate)
            }
        };

        let salvage =
            (winner == Winner::Attacker && !defender_is_planet).then(|| self.salvage_from(defender));

        let (attacker_end, attacker_pools) = a.finish(attacker);
        let (defender_end, defender_pools) = d.finish(defender);

        debug!(?winner, ?end, "Combat round resolved");

        CombatOutcome {
            winner,
            end,
            attacker: attacker_end,
            defender: defender_end,
            salvage,
            steps: log.into_steps(),
            attacker_pools,
            defender_pools,
            defender_is_planet,
            defender_escaped: false,
            turns_used: 1,
        }
    }

    fn beam_phase(
        &self,
        a: &mut Fighting,
        d: &mut Fighting,
        defender_is_planet: bool,
        log: &mut CombatLog,
    ) {
        if a.beams > 0 {
            log.attack(
                Side::Attacker,
                "beams",
                format!("Attacker fires beams ({} power)", a.beams),
            );
        }
        if d.beams > 0 {
            log.attack(
                Side::Defender,
                "beams",
                format!("Defender fires beams ({} power)", d.beams),
            );
        }

        // Beams can only reach half of a fighter screen.
        let killed = a.beams.min(d.fighters / 2);
        d.fighters -= killed;
        a.beams -= killed;
        log.damage(
            Side::Attacker,
            "beams_vs_fighters",
            format!("Attacker beams destroy {killed} defending fighters"),
            killed,
            TargetResource::Fighters,
        );

        let killed = d.beams.min(a.fighters / 2);
        a.fighters -= killed;
        d.beams -= killed;
        log.damage(
            Side::Defender,
            "beams_vs_fighters",
            format!("Defender beams destroy {killed} attacking fighters"),
            killed,
            TargetResource::Fighters,
        );

        let absorbed = a.beams.min(d.shields);
        d.shields -= absorbed;
        a.beams -= absorbed;
        log.damage(
            Side::Attacker,
            "beams_vs_shields",
            format!("Attacker beams drain {absorbed} defending shield points"),
            absorbed,
            TargetResource::Shield,
        );

        let absorbed = d.beams.min(a.shields);
        a.shields -= absorbed;
        d.beams -= absorbed;
        log.damage(
            Side::Defender,
            "beams_vs_shields",
            format!("Defender beams drain {absorbed} attacking shield points"),
            absorbed,
            TargetResource::Shield,
        );

        let overflow = std::mem::take(&mut a.beams);
        if defender_is_planet {
            if overflow > 0 {
                log.attack(
                    Side::Attacker,
                    "beams_dissipate",
                    format!("{overflow} beam power dissipates against the planet"),
                );
            }
        } else {
            d.take_hull_damage(overflow);
            log.damage(
                Side::Attacker,
                "beams_vs_hull",
                format!("Attacker beams strike the defending hull for {overflow}"),
                overflow,
                TargetResource::Hull,
            );
        }

        let overflow = std::mem::take(&mut d.beams);
        a.take_hull_damage(overflow);
        log.damage(
            Side::Defender,
            "beams_vs_hull",
            format!("Defender beams strike the attacking hull for {overflow}"),
            overflow,
            TargetResource::Hull,
        );
    }

    fn torpedo_phase(
        &self,
        a: &mut Fighting,
        d: &mut Fighting,
        defender_is_planet: bool,
        log: &mut CombatLog,
    ) {
        let damage = a.pools.torpedoes_fired.saturating_mul(self.torpedo_damage);
        if damage > 0 {
            log.attack(
                Side::Attacker,
                "torpedo_volley",
                format!("Attacker launches {} torpedoes", a.pools.torpedoes_fired),
            );
            // Attacking torpedoes reach the whole fighter screen.
            let killed = damage.min(d.fighters);
            d.fighters -= killed;
            log.damage(
                Side::Attacker,
                "torpedoes_vs_fighters",
                format!("Attacker torpedoes destroy {killed} defending fighters"),
                killed,
                TargetResource::Fighters,
            );

            let overflow = damage - killed;
            if defender_is_planet {
                let absorbed = overflow.min(d.shields);
                d.shields -= absorbed;
                log.damage(
                    Side::Attacker,
                    "torpedoes_vs_shields",
                    format!("Attacker torpedoes drain {absorbed} planetary shield points"),
                    absorbed,
                    TargetResource::Shield,
                );
            } else {
                d.take_hull_damage(overflow);
                log.damage(
                    Side::Attacker,
                    "torpedoes_vs_hull",
                    format!("Attacker torpedoes strike the defending hull for {overflow}"),
                    overflow,
                    TargetResource::Hull,
                );
            }
        }

        let damage = d.pools.torpedoes_fired.saturating_mul(self.torpedo_damage);
        if damage > 0 {
            log.attack(
                Side::Defender,
                "torpedo_volley",
                format!("Defender launches {} torpedoes", d.pools.torpedoes_fired),
            );
            let killed = damage.min(a.fighters / 2);
            a.fighters -= killed;
            log.damage(
                Side::Defender,
                "torpedoes_vs_fighters",
                format!("Defender torpedoes destroy {killed} attacking fighters"),
                killed,
                TargetResource::Fighters,
            );

            let overflow = damage - killed;
            a.take_hull_damage(overflow);
            log.damage(
                Side::Defender,
                "torpedoes_vs_hull",
                format!("Defender torpedoes strike the attacking hull for {overflow}"),
                overflow,
                TargetResource::Hull,
            );
        }
    }
}

/// Build the outcome of a round that ended before any shot was fired.
fn early_exit(
    attacker: &CombatantSnapshot,
    defender: CombatantSnapshot,
    attacker_torpedoes: u64,
    log: CombatLog,
    winner: Winner,
    end: CombatEnd,
) -> CombatOutcome {
    let mut attacker_end = attacker.clone();
    attacker_end.torpedoes -= attacker_torpedoes;

    debug!(?winner, ?end, "Combat round ended early");

    CombatOutcome {
        winner,
        end,
        attacker: attacker_end,
        defender,
        salvage: None,
        steps: log.into_steps(),
        attacker_pools: SidePools {
            torpedoes_fired: attacker_torpedoes,
            ..SidePools::default()
        },
        defender_pools: SidePools::default(),
        defender_is_planet: false,
        defender_escaped: end == CombatEnd::Escaped,
        turns_used: 1,
    }
}

fn fighter_phase(a: &mut Fighting, d: &mut Fighting, defender_is_planet: bool, log: &mut CombatLog) {
    let exchanged = a.fighters.min(d.fighters);
    a.fighters -= exchanged;
    d.fighters -= exchanged;
    log.damage(
        Side::Attacker,
        "fighter_exchange",
        format!("{exchanged} defending fighters lost in the exchange"),
        exchanged,
        TargetResource::Fighters,
    );
    log.damage(
        Side::Defender,
        "fighter_exchange",
        format!("{exchanged} attacking fighters lost in the exchange"),
        exchanged,
        TargetResource::Fighters,
    );

    if a.fighters > 0 {
        if defender_is_planet {
            let absorbed = a.fighters.min(d.shields);
            d.shields -= absorbed;
            log.damage(
                Side::Attacker,
                "fighters_vs_shields",
                format!("Surviving attack fighters drain {absorbed} planetary shield points"),
                absorbed,
                TargetResource::Shield,
            );
        } else {
            d.take_hull_damage(a.fighters);
            log.damage(
                Side::Attacker,
                "fighters_vs_hull",
                format!("Surviving attack fighters strike the hull for {}", a.fighters),
                a.fighters,
                TargetResource::Hull,
            );
        }
    }

    if d.fighters > 0 {
        a.take_hull_damage(d.fighters);
        log.damage(
            Side::Defender,
            "fighters_vs_hull",
            format!("Surviving defense fighters strike the hull for {}", d.fighters),
            d.fighters,
            TargetResource::Hull,
        );
    }
}
