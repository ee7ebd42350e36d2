//! Error types for Formgate

use thiserror::Error;

/// Result type alias using Formgate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Formgate error types
///
/// Field-level problems (missing or malformed values, password mismatch) are
/// not errors: they are reported through [`crate::form::FormStatus`]. These
/// variants cover events the engine refuses to apply.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown form layout: {0}")]
    UnknownLayout(String),

    #[error("Unknown {kind}: {id}")]
    UnknownControl { kind: String, id: String },

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("City '{city}' is not available for {country}")]
    InvalidCitySelection { country: String, city: String },

    #[error("Option '{choice}' does not exist in {select}")]
    UnknownOption { select: String, choice: String },

    #[error("Submit is disabled: {0}")]
    SubmitBlocked(String),
}

impl Error {
    pub(crate) fn unknown(kind: &str, id: impl Into<String>) -> Self {
        Error::UnknownControl {
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}
