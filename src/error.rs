//! Error types for hlbuffer
//!
//! The highlighting engine itself never fails; these errors come from
//! loading language definitions and configuration.

use thiserror::Error;

/// Result type alias for hlbuffer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid rule '{name}': {source}")]
    InvalidRule {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("No such highlighting definition: {0}")]
    UnknownDefinition(String),

    #[error("Unknown token type: {0}")]
    UnknownToken(String),

    #[error("Invalid definition: {0}")]
    Definition(String),

    #[error("Invalid config value for '{key}': {value}")]
    Config { key: String, value: String },
}
