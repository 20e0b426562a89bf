//! Tuning knobs for the core, loadable from RON.

use serde::{Deserialize, Serialize};

use crate::combat::CombatRules;
use crate::error::Result;
use crate::executor::ExecutorLimits;

/// Combat rules and executor limits in one document.
///
/// Every field may be omitted; omitted fields take their defaults.
///
/// ```
/// use starlane_core::config::CoreConfig;
///
/// let config = CoreConfig::from_ron_str("(combat: (torpedo_damage: 12))").unwrap();
/// assert_eq!(config.combat.torpedo_damage, 12);
/// assert_eq!(config.executor.trade_iterations, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Combat formulas.
    pub combat: CombatRules,
    /// Executor loop ceilings.
    pub executor: ExecutorLimits,
}

impl CoreConfig {
    /// Parse from a RON string.
    ///
    /// # Errors
    /// Returns [`crate::error::CoreError::ConfigParse`] for malformed input.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Ok(ron::from_str(ron)?)
    }

    /// Render as pretty RON.
    ///
    /// # Errors
    /// Returns [`crate::error::CoreError::Serialization`] if encoding fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| crate::error::CoreError::Serialization(e.to_string()))
    }
}
