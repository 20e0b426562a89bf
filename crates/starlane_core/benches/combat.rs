//! Combat and decision benchmarks for starlane_core.
//!
//! Run with: `cargo bench -p starlane_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starlane_core::prelude::*;

/// Full ship-vs-ship round with every phase firing.
pub fn combat_benchmark(c: &mut Criterion) {
    let attacker = CombatantSnapshot::ship(1, "attacker", TechLevels::uniform(8));
    let defender = CombatantSnapshot::ship(2, "defender", TechLevels::uniform(6));
    let planet = CombatantSnapshot::planet(3, "planet", TechLevels::uniform(6), true);

    c.bench_function("resolve_ship_vs_ship", |b| {
        let mut rolls = RngRolls(ChaCha8Rng::seed_from_u64(42));
        b.iter(|| resolve_combat(black_box(&attacker), black_box(&defender), false, &mut rolls));
    });

    c.bench_function("resolve_ship_vs_planet", |b| {
        let mut rolls = ScriptedRolls::always_pass();
        b.iter(|| resolve_combat(black_box(&attacker), black_box(&planet), true, &mut rolls));
    });
}

/// One decision per personality.
pub fn decision_benchmark(c: &mut Criterion) {
    let situation = AiSituation {
        turns: 40,
        credits: 12_000,
        sector: SectorSummary {
            commodity_ports: 1,
            unclaimed_planets: 1,
            warps: 3,
            ..Default::default()
        },
        supplies: CombatSupplies::full(&TechLevels::default()),
        ..Default::default()
    };

    c.bench_function("decide_all_personalities", |b| {
        b.iter(|| {
            for personality in Personality::ALL {
                black_box(personality.decide(black_box(&situation)));
            }
        });
    });
}

criterion_group!(benches, combat_benchmark, decision_benchmark);
criterion_main!(benches);
