//! End-to-end runs of the headless orchestrator.

use std::sync::Mutex;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use starlane_core::decision::{AiAction, AiDecision};
use starlane_core::executor::{ActionExecutor, GameFacade};
use starlane_core::personality::Personality;
use starlane_headless::universe::SPECIAL_SECTOR;
use starlane_headless::{
    run_scenario, verify_determinism, DuelFile, HeadlessConfig, Orchestrator, PlayerHandle,
    PlayerSetup, RunReport, Scenario, Universe,
};

fn sequential(cycles: u32) -> HeadlessConfig {
    HeadlessConfig::default()
        .with_cycles(cycles)
        .with_sequential(true)
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_scenario_and_config_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let scenario_path = dir.path().join("scenario.ron");
    let config_path = dir.path().join("config.ron");
    std::fs::write(
        &scenario_path,
        r#"(
            name: "Disk",
            seed: 11,
            universe: (sectors: 8, planets: 3),
            players: [
                (name: "Col", personality: colonizer),
                (name: "War", personality: warrior, emergency_warp: true),
            ],
        )"#,
    )
    .unwrap();
    std::fs::write(&config_path, "(cycles: 2, turns_per_cycle: 20)").unwrap();

    let scenario = Scenario::load(&scenario_path).unwrap();
    let config = HeadlessConfig::load(&config_path).unwrap().with_sequential(true);
    let report = run_scenario(scenario, config).unwrap();

    assert_eq!(report.scenario, "Disk");
    assert_eq!(report.summary.cycles, 2);
    assert_eq!(report.rows.len(), 4);
}

#[test]
fn test_report_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("run.json");
    let report = run_scenario(Scenario::trade_lane(), sequential(2)).unwrap();
    report.save(&path).unwrap();

    let loaded = RunReport::load(&path).unwrap();
    assert_eq!(loaded.rows, report.rows);
    assert_eq!(loaded.summary, report.summary);
    assert_eq!(loaded.final_state_hash, report.final_state_hash);
}

#[test]
fn test_duel_file_resolves() {
    let duel = DuelFile::from_ron_str(
        r#"(
            attacker: (id: 1, name: "Hawk", armor: 500, armor_max: 500, energy: 10000,
                       energy_max: 10000, fighters: 300, torpedoes: 50,
                       tech: (5, 20, 5, 5, 20, 5, 5, 5, 5, 1)),
            defender: (id: 2, name: "Moth", armor: 100, armor_max: 100, energy: 1000,
                       energy_max: 1000, fighters: 10,
                       tech: (1, 1, 1, 1, 1, 1, 1, 1, 1, 1), credits: 400),
            seed: 5,
        )"#,
    )
    .unwrap();
    let (attacker, defender) = duel.combatants().unwrap();
    let outcome = starlane_core::combat::resolve_combat(
        &attacker,
        &defender,
        duel.defender_is_planet,
        &mut starlane_core::combat::ScriptedRolls::always_pass(),
    );
    assert_eq!(outcome.winner, starlane_core::combat::Winner::Attacker);
    assert!(outcome.salvage.is_some());
}

// ============================================================================
// Runs
// ============================================================================

#[test]
fn test_verify_detects_identical_runs() {
    let result = verify_determinism(&Scenario::default(), &sequential(4), 3).unwrap();
    assert!(result.identical);
    assert!(result.hashes.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_different_seeds_diverge() {
    let a = run_scenario(Scenario::default(), sequential(3)).unwrap();
    let mut other = Scenario::default();
    other.seed += 1;
    let b = run_scenario(other, sequential(3)).unwrap();
    assert_ne!(a.final_state_hash, b.final_state_hash);
}

#[test]
fn test_sub_actions_never_exceed_ceilings() {
    let report = run_scenario(Scenario::default(), sequential(5)).unwrap();
    let limits = HeadlessConfig::default().core.executor;
    let ceiling = limits
        .trade_iterations
        .max(limits.explore_deep_iterations)
        .max(limits.upgrade_iterations * 2)
        + limits.fallback_explore_turns;
    for row in &report.rows {
        assert!(row.result.actions_executed <= ceiling);
        let allowed = if row.decision.action.is_purchase() {
            limits.fallback_explore_turns
        } else {
            row.decision.turns_to_spend
        };
        assert!(row.result.turns_used <= allowed);
    }
}

#[test]
fn test_orchestrator_cycles_accumulate() {
    let mut orchestrator = Orchestrator::new(Scenario::default(), sequential(0)).unwrap();
    orchestrator.run_cycle();
    orchestrator.run_cycle();
    assert_eq!(orchestrator.cycle(), 2);
    let report = orchestrator.run();
    assert_eq!(report.summary.cycles, 0);
    assert_eq!(report.standings.len(), 5);
}

#[test]
fn test_short_of_upgrade_money_still_spends_turns() {
    let scenario = Scenario {
        universe: starlane_headless::scenario::UniverseSetup {
            sectors: 6,
            planets: 0,
            ..Default::default()
        },
        players: vec![PlayerSetup {
            sector: Some(SPECIAL_SECTOR),
            credits: 1_800,
            ..PlayerSetup::new("Stuck", Personality::Warrior)
        }],
        ..Scenario::default()
    };
    let config = HeadlessConfig {
        turns_per_cycle: 0,
        ..sequential(4)
    };
    let report = run_scenario(scenario, config).unwrap();

    let rows: Vec<_> = report.rows_for(1).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.result.turns_used > 0));
    assert!(rows.iter().any(|row| row.result.fell_back));
    assert!(rows[3].turns_left < 100);
}

// ============================================================================
// Facade contract
// ============================================================================

#[test]
fn test_hyperspace_decision_reaches_special_port() {
    let scenario = Scenario {
        players: vec![PlayerSetup {
            sector: Some(4),
            ..PlayerSetup::new("Jumper", Personality::Warrior)
        }],
        ..Scenario::default()
    };
    let universe = Mutex::new(Universe::generate(&scenario, &HeadlessConfig::default()).unwrap());
    let mut handle = PlayerHandle::new(&universe, 1, ChaCha8Rng::seed_from_u64(0));
    let decision = AiDecision::new(AiAction::Hyperspace, 1, 97, "test_seek");

    let result = ActionExecutor::default().execute(
        &decision,
        Personality::Warrior,
        &mut handle,
        &mut ChaCha8Rng::seed_from_u64(1),
    );

    assert!(result.success);
    assert_eq!(result.turns_used, 1);
    assert_eq!(handle.status().sector, SPECIAL_SECTOR);
    assert!(handle.sector().has_special_port());
}

#[test]
fn test_upgrade_decision_spends_no_turns() {
    let scenario = Scenario {
        players: vec![PlayerSetup {
            sector: Some(SPECIAL_SECTOR),
            credits: 50_000,
            ..PlayerSetup::new("Tinker", Personality::Balanced)
        }],
        ..Scenario::default()
    };
    let universe = Mutex::new(Universe::generate(&scenario, &HeadlessConfig::default()).unwrap());
    let mut handle = PlayerHandle::new(&universe, 1, ChaCha8Rng::seed_from_u64(0));
    let decision = AiDecision::new(AiAction::UpgradeShip, 0, 92, "test_upgrade");

    let result = ActionExecutor::default().execute(
        &decision,
        Personality::Balanced,
        &mut handle,
        &mut ChaCha8Rng::seed_from_u64(1),
    );

    assert!(result.actions_executed > 0);
    assert_eq!(result.turns_used, 0);
    let status = handle.status();
    assert_eq!(status.turns, 100);
    assert!(status.credits < 50_000);
    assert!(status.tech.total() > 10);
}
