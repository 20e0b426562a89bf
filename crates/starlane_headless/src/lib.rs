//! Headless orchestrator for Starlane AI players.
//!
//! This crate hosts the AI players outside the game server: it generates an
//! in-memory universe from a scenario, runs decision cycles over it and
//! writes JSON reports. This enables:
//!
//! - **Balance testing**: watch the five personalities compete over many cycles
//! - **CI verification**: check that seeded runs are reproducible
//! - **Combat debugging**: resolve single rounds described in RON files
//!
//! # Example
//!
//! ```bash
//! # Run the default galaxy for 20 cycles
//! cargo run -p starlane_headless -- run --cycles 20 --output results/run.json
//!
//! # Resolve one combat round
//! cargo run -p starlane_headless -- duel --file duel.ron
//!
//! # Verify determinism
//! cargo run -p starlane_headless -- verify --runs 3
//! ```
//!
//! Logs go to stderr; reports and duel outcomes go to stdout or files.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod metrics;
pub mod orchestrator;
pub mod scenario;
pub mod universe;

pub use metrics::{PlayerCycleReport, PlayerStanding, RunReport, RunSummary};
pub use orchestrator::{run_scenario, verify_determinism, Orchestrator, VerifyResult};
pub use scenario::{DuelFile, EconomyRules, HeadlessConfig, PlayerSetup, Scenario, ScenarioError};
pub use universe::{PlayerHandle, Universe};
