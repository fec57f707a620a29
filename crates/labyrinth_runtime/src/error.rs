//! # Runtime Error Types
//!
//! Lookup misses and blocked steps are not errors; they are ordinary
//! answers. Errors here cover configuration loading and misuse of the run
//! API.

use labyrinth_procedural::ProgressionError;
use thiserror::Error;

/// Errors raised while loading run configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The embedded progression table is invalid.
    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors raised by run operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The run has already ended.
    #[error("run is over")]
    RunOver,

    /// No active chunk carries this index.
    #[error("chunk {0} is not in the active window")]
    ChunkNotActive(u64),

    /// The chunk's exit door was already opened.
    #[error("door of chunk {0} is already open")]
    DoorAlreadyOpen(u64),

    /// A key is required.
    #[error("no key held")]
    NoKey,
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for run operations.
pub type RunResult<T> = Result<T, RunError>;
