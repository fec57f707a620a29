//! # Procedural Error Types
//!
//! Generation itself never fails (bounded retries end in a fallback layout).
//! The only errors are malformed progression tables.

use thiserror::Error;

/// Errors raised while loading or validating a progression table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    /// The TOML document could not be parsed.
    #[error("progression table parse error: {0}")]
    Parse(String),

    /// The table has no stages.
    #[error("progression table has no stages")]
    EmptyTable,

    /// A stage lists no shapes.
    #[error("stage {0} lists no chunk shapes")]
    EmptyStage(u32),

    /// A shape is below the minimum chunk dimension.
    #[error("chunk shape {width}x{height} is smaller than {min}x{min}")]
    ShapeTooSmall {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// Minimum allowed dimension.
        min: usize,
    },

    /// A probability lies outside `[0, 1]`.
    #[error("chance `{name}` must be within [0, 1], got {value}")]
    ChanceOutOfRange {
        /// Field name.
        name: &'static str,
        /// Offending value, formatted.
        value: String,
    },
}

/// Result type for progression table operations.
pub type ProgressionResult<T> = Result<T, ProgressionError>;

impl From<toml::de::Error> for ProgressionError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
