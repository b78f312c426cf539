//! Error type shared by the XML layer, the package layer and the translators.
use thiserror::Error;

/// Main error type for quince operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A part's text is not well-formed XML.
    ///
    /// Only the translation of `part` is aborted; the rest of the package
    /// keeps loading.
    #[error("Malformed XML in '{part}': {message}")]
    MalformedXml { part: String, message: String },

    /// An expected nested structure is missing.
    #[error("Malformed structure: {0}")]
    MalformedStructure(String),

    /// A required part is absent from the package.
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A relationship entry could not be interpreted.
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// Converter options could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach a part name to a [`Error::MalformedXml`] raised without one.
    pub fn in_part(self, part: &str) -> Self {
        match self {
            Error::MalformedXml { part: p, message } if p.is_empty() => Error::MalformedXml {
                part: part.to_string(),
                message,
            },
            other => other,
        }
    }
}

/// Result type for quince operations.
pub type Result<T> = std::result::Result<T, Error>;
