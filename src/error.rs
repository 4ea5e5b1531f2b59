//! Error types for launchseq

use thiserror::Error;

/// Result type alias for launchseq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the controller
#[derive(Debug, Error)]
pub enum Error {
    /// The controller or the sound output could not be reached at startup
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A single outbound write failed while the sequencer was running
    #[error("Transport write failed: {0}")]
    TransportWrite(String),

    /// An identifier that does not address any pad
    #[error("Pad id {0} is out of range")]
    AddressOutOfRange(u8),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
