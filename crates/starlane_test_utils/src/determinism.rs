//! Determinism testing utilities.
//!
//! Provides a harness for verifying that combat resolution and AI runs
//! produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Combat outcomes must be reproducible from the two snapshots and the roll
//! sequence alone. Sources of non-determinism include:
//!
//! - **Hidden randomness**: every roll comes from an injected
//!   [`RollSource`](starlane_core::combat::RollSource); generators are
//!   always explicitly seeded.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Universe state is kept in ordered collections.
//!
//! - **Thread scheduling**: batch runs must not let one player's outcome
//!   depend on which thread finished first.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual phases and decisions
//! 2. **Property tests**: Random snapshots still resolve reproducibly
//! 3. **Integration tests**: Whole headless runs compare equal by hash

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starlane_core::combat::{resolve_combat, CombatOutcome, RngRolls};
use starlane_core::combatant::CombatantSnapshot;
use tracing::warn;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic computation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Computation is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a computation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `run` - Produces the final state from scratch
/// * `hash` - Computes the state hash
///
/// # Example
///
/// ```
/// use starlane_test_utils::determinism::{compute_hash, verify_determinism};
///
/// let result = verify_determinism(3, || vec![1, 2, 3], |v| compute_hash(v));
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Run, HashFn>(runs: usize, run: Run, hash: HashFn) -> DeterminismResult
where
    Run: Fn() -> S,
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| hash(&run())).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        warn!(runs, ?hashes, "Runs diverged");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Resolve one round with rolls drawn from a seeded ChaCha generator.
#[must_use]
pub fn resolve_seeded(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    defender_is_planet: bool,
    seed: u64,
) -> CombatOutcome {
    let mut rolls = RngRolls(ChaCha8Rng::seed_from_u64(seed));
    resolve_combat(attacker, defender, defender_is_planet, &mut rolls)
}

/// Hash of an outcome's bincode encoding; `0` if encoding fails.
#[must_use]
pub fn outcome_hash(outcome: &CombatOutcome) -> u64 {
    outcome.to_bytes().map_or(0, |bytes| compute_hash(&bytes))
}

/// Resolve the same round `runs` times from the same seed and compare bytes.
#[must_use]
pub fn verify_combat_determinism(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    defender_is_planet: bool,
    seed: u64,
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        runs,
        || resolve_seeded(attacker, defender, defender_is_planet, seed),
        outcome_hash,
    )
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for combat and decision testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use proptest::prelude::*;
    use starlane_core::combatant::{Cargo, CombatantSnapshot};
    use starlane_core::personality::Personality;
    use starlane_core::situation::{AiSituation, CombatSupplies, SectorSummary};
    use starlane_core::tech::{TechLevels, MAX_TECH_LEVEL};

    /// A tech level in the legal range, zero included.
    pub fn arb_level() -> impl Strategy<Value = u32> {
        0..=MAX_TECH_LEVEL
    }

    /// Tech levels on every axis.
    pub fn arb_tech() -> impl Strategy<Value = TechLevels> {
        proptest::array::uniform10(arb_level()).prop_map(|l| TechLevels {
            hull: l[0],
            engine: l[1],
            power: l[2],
            computer: l[3],
            sensors: l[4],
            beam: l[5],
            torpedo_launcher: l[6],
            shield: l[7],
            armor: l[8],
            cloak: l[9],
        })
    }

    /// Hold cargo.
    pub fn arb_cargo() -> impl Strategy<Value = Cargo> {
        (0u64..5000, 0u64..5000, 0u64..5000, 0u64..5000).prop_map(
            |(ore, organics, goods, colonists)| Cargo {
                ore,
                organics,
                goods,
                colonists,
            },
        )
    }

    /// A ship with arbitrary (possibly depleted or overstocked) resources.
    pub fn arb_ship() -> impl Strategy<Value = CombatantSnapshot> {
        (
            arb_tech(),
            0u64..5000,
            0u64..40_000,
            0u64..4000,
            0u64..4000,
            arb_cargo(),
            0u64..1_000_000,
            any::<bool>(),
        )
            .prop_map(
                |(tech, armor, energy, fighters, torpedoes, cargo, credits, warp)| {
                    let mut ship = CombatantSnapshot::ship(1, "ship", tech)
                        .with_armor(armor)
                        .with_energy(energy)
                        .with_fighters(fighters)
                        .with_torpedoes(torpedoes)
                        .with_cargo(cargo)
                        .with_credits(credits);
                    ship.emergency_warp = warp;
                    ship
                },
            )
    }

    /// A planet with arbitrary defenses.
    pub fn arb_planet() -> impl Strategy<Value = CombatantSnapshot> {
        (
            arb_tech(),
            any::<bool>(),
            0u64..40_000,
            0u64..4000,
            0u64..4000,
        )
            .prop_map(|(tech, base, energy, fighters, torpedoes)| {
                CombatantSnapshot::planet(2, "planet", tech, base)
                    .with_energy(energy)
                    .with_fighters(fighters)
                    .with_torpedoes(torpedoes)
            })
    }

    /// One of the five personalities.
    pub fn arb_personality() -> impl Strategy<Value = Personality> {
        prop::sample::select(Personality::ALL.to_vec())
    }

    /// Sector composition, empty sectors included.
    pub fn arb_sector() -> impl Strategy<Value = SectorSummary> {
        (0u32..1000, 0u32..3, 0u32..2, 0u32..4, 0u32..6).prop_map(
            |(number, commodity_ports, special_ports, unclaimed_planets, warps)| SectorSummary {
                number,
                commodity_ports,
                special_ports,
                unclaimed_planets,
                warps,
            },
        )
    }

    /// Any reachable AI situation, all-zero values included.
    pub fn arb_situation() -> impl Strategy<Value = AiSituation> {
        (
            0u32..200,
            prop_oneof![Just(0u64), 0u64..10_000, 0u64..100_000_000],
            arb_tech(),
            arb_cargo(),
            (0u64..=100, 0u64..=100, 0u64..=100),
            arb_sector(),
            0u32..10,
        )
            .prop_map(
                |(turns, credits, tech, cargo, (f, t, a), sector, owned_planets)| {
                    let full = CombatSupplies::full(&tech);
                    AiSituation {
                        player_id: 1,
                        turns,
                        credits,
                        tech,
                        cargo,
                        cargo_capacity: tech.cargo_capacity(),
                        supplies: CombatSupplies {
                            fighters: full.fighter_capacity * f / 100,
                            torpedoes: full.torpedo_capacity * t / 100,
                            armor: full.armor_capacity * a / 100,
                            ..full
                        },
                        sector,
                        owned_planets,
                    }
                },
            )
    }
}
