//! Configuration types for the settlement engine.

use serde::{Deserialize, Serialize};

use crate::{Result, VaultError, constants};

/// Runtime configuration of a settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether an accepted contest restarts the dispute window at the
    /// contest's block. When `false` the window stays anchored to the
    /// original close.
    pub contest_extends_window: bool,
    /// Number of channel events kept in the in-memory journal before the
    /// oldest are evicted.
    pub event_journal_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contest_extends_window: false,
            event_journal_capacity: constants::DEFAULT_EVENT_JOURNAL_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`VaultError::Configuration`] for malformed JSON or values
    /// that fail [`EngineConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| VaultError::Configuration(format!("invalid engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns [`VaultError::Configuration`] if the journal capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.event_journal_capacity == 0 {
            return Err(VaultError::Configuration(
                "event_journal_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
