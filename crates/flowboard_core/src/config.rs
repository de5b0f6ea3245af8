//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path, log settings and sweep interval.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - Unparseable values fall back to defaults; resolution never fails.

use log::warn;
use std::path::PathBuf;

use crate::logging::default_log_level;

pub const ENV_DB_PATH: &str = "FLOWBOARD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FLOWBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FLOWBOARD_LOG_DIR";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "FLOWBOARD_SWEEP_INTERVAL_SECS";

const DEFAULT_DB_FILE_NAME: &str = "flowboard.sqlite3";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub sweep_interval_secs: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl BoardConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let sweep_interval_secs = match read(ENV_SWEEP_INTERVAL_SECS) {
            None => defaults.sweep_interval_secs,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(
                        "event=config_resolve module=config status=default key={} reason=invalid_number",
                        ENV_SWEEP_INTERVAL_SECS
                    );
                    defaults.sweep_interval_secs
                }
            },
        };

        Self {
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
            sweep_interval_secs,
        }
    }

    /// Sweep interval in the engine's millisecond unit.
    pub fn sweep_interval_ms(&self) -> i64 {
        i64::try_from(self.sweep_interval_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

/// `<temp>/flowboard.sqlite3`.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
