use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Order in which the two account locks of a transfer are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LockOrder {
    /// Source first, then destination, exactly as requested.
    ///
    /// Two concurrent transfers in opposite directions between the same pair
    /// of accounts can each hold one lock and wait for the other; the lock
    /// timeout fails at least one of them.
    Request,
    /// Ascending account id, whatever the direction of the transfer.
    #[default]
    Canonical,
}

/// Runtime settings of the ledger.
///
/// Every field is optional in the JSON representation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Maximum wait for a single account lock, in milliseconds.
    pub lock_timeout_ms: u64,
    pub lock_order: LockOrder,
    /// Number of transfers the CLI runs concurrently.
    pub workers: usize,
}

impl LedgerConfig {
    pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LedgerError::ConfigError(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lock_timeout_ms == 0 {
            return Err(LedgerError::ConfigError(
                "lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(LedgerError::ConfigError(
                "workers must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: Self::DEFAULT_LOCK_TIMEOUT_MS,
            lock_order: LockOrder::default(),
            workers: 1,
        }
    }
}
