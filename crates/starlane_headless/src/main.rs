//! Headless Starlane runner.
//!
//! Runs AI decision cycles without the game server, resolves single combat
//! rounds and verifies determinism.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario file with a config file
//! cargo run -p starlane_headless -- run --scenario galaxy.ron --config headless.ron
//!
//! # Run a built-in scenario, processing players one at a time
//! cargo run -p starlane_headless -- run --builtin trade_lane --sequential
//!
//! # Resolve one combat round and print the outcome as JSON
//! cargo run -p starlane_headless -- duel --file duel.ron
//!
//! # Verify determinism
//! cargo run -p starlane_headless -- verify --runs 5
//! ```
//!
//! Logs go to stderr. `RUST_LOG` overrides the default level.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use starlane_core::combat::RngRolls;
use starlane_headless::{
    run_scenario, verify_determinism, DuelFile, HeadlessConfig, Scenario, ScenarioError,
};

#[derive(Parser)]
#[command(name = "starlane_headless")]
#[command(about = "Headless Starlane AI runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run AI decision cycles over a scenario
    Run {
        /// Scenario RON file
        #[arg(short, long, conflicts_with = "builtin")]
        scenario: Option<PathBuf>,

        /// Built-in scenario name (default, trade_lane)
        #[arg(short, long)]
        builtin: Option<String>,

        /// Headless config RON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of cycles
        #[arg(long)]
        cycles: Option<u32>,

        /// Override the scenario seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Process players one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Resolve a single combat round from a RON file
    Duel {
        /// Duel RON file
        #[arg(short, long)]
        file: PathBuf,

        /// Override the duel seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Verify determinism by running the same scenario several times
    Verify {
        /// Scenario RON file
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Headless config RON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of cycles
        #[arg(long)]
        cycles: Option<u32>,

        /// Number of verification runs
        #[arg(short, long, default_value = "3")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so reports can be piped from stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let outcome = match cli.command {
        Some(Commands::Run {
            scenario,
            builtin,
            config,
            cycles,
            seed,
            output,
            sequential,
        }) => cmd_run(scenario, builtin, config, cycles, seed, output, sequential),
        Some(Commands::Duel { file, seed }) => cmd_duel(file, seed),
        Some(Commands::Verify {
            scenario,
            config,
            cycles,
            runs,
        }) => cmd_verify(scenario, config, cycles, runs),
        None => cmd_run(None, None, None, None, None, None, false),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_inputs(
    scenario: Option<PathBuf>,
    builtin: Option<String>,
    config: Option<PathBuf>,
    cycles: Option<u32>,
) -> Result<(Scenario, HeadlessConfig), ScenarioError> {
    let scenario = match (scenario, builtin) {
        (Some(path), _) => Scenario::load(path)?,
        (None, Some(name)) => Scenario::builtin(&name)
            .ok_or_else(|| ScenarioError::Invalid(format!("no built-in scenario '{name}'")))?,
        (None, None) => Scenario::default(),
    };
    let mut config = match config {
        Some(path) => HeadlessConfig::load(path)?,
        None => HeadlessConfig::default(),
    };
    if let Some(cycles) = cycles {
        config.cycles = cycles;
    }
    Ok((scenario, config))
}

/// Run AI cycles and print or save the report
fn cmd_run(
    scenario: Option<PathBuf>,
    builtin: Option<String>,
    config: Option<PathBuf>,
    cycles: Option<u32>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    sequential: bool,
) -> Result<(), ScenarioError> {
    let (mut scenario, mut config) = load_inputs(scenario, builtin, config, cycles)?;
    if let Some(seed) = seed {
        scenario.seed = seed;
    }
    if sequential {
        config.sequential = true;
    }

    tracing::info!(
        "Running '{}' for {} cycles (seed {})",
        scenario.name,
        config.cycles,
        scenario.seed
    );
    let report = run_scenario(scenario, config)?;

    eprintln!();
    eprintln!("═══ Run Summary ═══");
    eprintln!("Cycles:     {}", report.summary.cycles);
    eprintln!("Decisions:  {}", report.summary.total_decisions());
    for (action, count) in &report.summary.decisions {
        eprintln!("  {action:<26} {count:>5}");
    }
    eprintln!("Actions:    {}", report.summary.actions_executed);
    eprintln!("Turns used: {}", report.summary.turns_used);
    eprintln!("Errors:     {}", report.summary.errors);
    eprintln!("Combats:    {}", report.summary.combats);
    eprintln!("Fallbacks:  {}", report.summary.fallbacks);
    eprintln!();
    eprintln!("═══ Standings ═══");
    for standing in &report.standings {
        eprintln!(
            "  {:<20} {:<10} net worth {:>10}  planets {:>3}  tech {:>5.1}",
            standing.name,
            standing.personality.as_str(),
            standing.net_worth,
            standing.planets,
            standing.tech_average
        );
    }
    eprintln!("Final state hash: {:016x}", report.final_state_hash);

    if let Some(path) = output {
        report.save(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

/// Resolve one combat round and print the outcome as JSON
fn cmd_duel(file: PathBuf, seed: Option<u64>) -> Result<(), ScenarioError> {
    let duel = DuelFile::load(&file)?;
    let (attacker, defender) = duel.combatants()?;
    let seed = seed.unwrap_or(duel.seed);
    tracing::info!(
        "Resolving {} vs {} (seed {})",
        attacker.name,
        defender.name,
        seed
    );

    let config = HeadlessConfig::default();
    let mut rolls = RngRolls(ChaCha8Rng::seed_from_u64(seed));
    let outcome =
        config
            .core
            .combat
            .resolve(&attacker, &defender, duel.defender_is_planet, &mut rolls);

    let json = serde_json::to_string_pretty(&outcome).map_err(std::io::Error::other)?;
    println!("{json}");
    eprintln!("Winner: {:?} ({:?})", outcome.winner, outcome.end);
    Ok(())
}

/// Verify determinism by repeating a sequential run
fn cmd_verify(
    scenario: Option<PathBuf>,
    config: Option<PathBuf>,
    cycles: Option<u32>,
    runs: u32,
) -> Result<(), ScenarioError> {
    let (scenario, config) = load_inputs(scenario, None, config, cycles)?;
    tracing::info!(
        "Verifying determinism: '{}' with seed {} ({} runs)",
        scenario.name,
        scenario.seed,
        runs
    );

    let result = verify_determinism(&scenario, &config, runs)?;
    for (run, hash) in result.hashes.iter().enumerate() {
        eprintln!("  run {:>2}: {hash:016x}", run + 1);
    }

    if result.identical {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
    Ok(())
}
