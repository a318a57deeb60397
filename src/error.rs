//! Error types for DehaTrack

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// DehaTrack error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration value failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Depth sensor acquisition failed; fatal to the frame loop
    #[error("Sensor acquisition failed: {0}")]
    Acquisition(String),

    /// Quantized telemetry field does not fit a signed 16-bit integer
    #[error("Telemetry field {field} out of range: {value}")]
    ValueOutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// The quantized value that overflowed
        value: f64,
    },

    /// Frame sink error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
