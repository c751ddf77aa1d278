//! Compilation errors.

use kbconf_drivers::DriverError;
use thiserror::Error;

/// Errors that abort a compilation pass.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: DriverError,
    },

    #[error("default keymap must be specified when no per-profile default keymaps are specified")]
    MissingKeymap,

    #[error("`{location}`: expected {expected} {dimension}, found {found}")]
    DimensionMismatch {
        location: String,
        dimension: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("`{field}`: row {row} has {found} entries, expected {expected}")]
    RaggedMatrix {
        field: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("`{field}`: {kind} values cannot be emitted as build parameters")]
    UnsupportedValue { field: String, kind: &'static str },
}

impl CompileError {
    /// Attach the manifest field a driver error came from.
    pub fn field(field: impl Into<String>) -> impl FnOnce(DriverError) -> Self {
        let field = field.into();
        move |source| CompileError::Field { field, source }
    }
}
