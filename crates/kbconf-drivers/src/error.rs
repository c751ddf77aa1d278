//! Error types for driver lookups and hardware resolution.

/// Errors that can occur while resolving driver data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// No driver is registered under this identifier.
    #[error("unsupported driver: '{id}'")]
    UnknownDriver {
        /// The identifier that was looked up.
        id: String,
    },

    /// Pin name is not wired to any ADC channel.
    #[error("pin '{pin}' is not an ADC input")]
    UnknownPin {
        /// The pin name that was looked up.
        pin: String,
    },

    /// Index past the end of a sector list or ADC channel list.
    #[error("index {index} out of range (expected < {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: u64,
        /// Number of valid entries.
        len: u64,
    },

    /// Pin name does not follow the `<Port><Number>` convention.
    #[error("invalid pin name '{pin}' (expected a port letter followed by a pin number, e.g. 'A0')")]
    InvalidPinName {
        /// The malformed pin name.
        pin: String,
    },

    /// A reservation does not fit in the flash.
    #[error("requested {required} bytes but the flash only holds {available} bytes")]
    CapacityExceeded {
        /// Requested size in bytes.
        required: u64,
        /// Total flash size in bytes.
        available: u64,
    },
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
