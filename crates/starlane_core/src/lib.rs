//! # Starlane Core
//!
//! Deterministic combat and AI decision core for the Starlane space-trading game.
//!
//! This crate contains **only** pure logic:
//! - No IO
//! - No persistence
//! - No hidden randomness (every random draw comes from a caller-supplied source)
//!
//! This separation enables:
//! - Reproducible combat given a seed or a scripted roll sequence
//! - Headless batch simulation of AI players
//! - Property testing of the combat and decision invariants
//!
//! ## Crate Structure
//!
//! - [`combat`] - Single-round combat resolution
//! - [`combatant`] - Ship and planet snapshots
//! - [`tech`] - Tech levels, costs and capacities
//! - [`situation`] - What an AI player knows when deciding
//! - [`decision`] - AI actions and decisions
//! - [`personality`] - The five AI personalities
//! - [`executor`] - Bounded execution of decisions against a [`executor::GameFacade`]
//! - [`config`] - RON-loadable tuning

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod combatant;
pub mod config;
pub mod decision;
pub mod error;
pub mod executor;
pub mod personality;
pub mod situation;
pub mod tech;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{
        resolve_combat, CombatEnd, CombatOutcome, CombatRules, CombatStep, RngRolls, RollSource,
        Salvage, ScriptedRolls, Side, Winner,
    };
    pub use crate::combatant::{Cargo, CombatantRecord, CombatantSnapshot, Commodity};
    pub use crate::config::CoreConfig;
    pub use crate::decision::{AiAction, AiDecision};
    pub use crate::error::{CoreError, Result};
    pub use crate::executor::{
        ActionError, ActionExecutor, ActionResult, ExecutorLimits, GameFacade,
    };
    pub use crate::personality::Personality;
    pub use crate::situation::{AiSituation, CombatSupplies, SectorSummary};
    pub use crate::tech::{TechAxis, TechLevels};
}
