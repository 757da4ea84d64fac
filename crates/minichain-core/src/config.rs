//! Ledger configuration.

use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_DIFFICULTY_PREFIX, DEFAULT_MINING_REWARD},
    Difficulty, Mining, Result,
};

/// Settings for [`crate::Ledger::with_config`]. Missing fields take their
/// defaults; `"difficulty": null` turns proof-of-work off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub mining_reward: f64,
    pub difficulty: Option<String>,
    pub parallel_mining: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mining_reward: DEFAULT_MINING_REWARD,
            difficulty: Some(DEFAULT_DIFFICULTY_PREFIX.to_string()),
            parallel_mining: false,
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve the sealing strategy, validating the difficulty prefix.
    pub fn mining(&self) -> Result<Mining> {
        let Some(prefix) = &self.difficulty else {
            return Ok(Mining::Disabled);
        };
        let difficulty = Difficulty::new(prefix.as_str())?;
        Ok(if self.parallel_mining {
            Mining::Parallel(difficulty)
        } else {
            Mining::Sequential(difficulty)
        })
    }
}
