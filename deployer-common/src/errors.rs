//! Errors for reading artifacts and turning their bytecode into code.

use hex::FromHexError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read compiled contracts from disk.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A file or directory could not be read.
    #[error("could not read artifact: {0}")]
    Io(#[from] std::io::Error),

    /// An artifact is not valid JSON or lacks required fields.
    #[error("malformed artifact JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The `_format` field names a format that is not supported.
    #[error("unsupported artifact format '{0}'")]
    UnsupportedFormat(String),

    /// Two artifacts declare the same fully qualified contract name.
    #[error("contract {0} appears several times in the artifacts")]
    DuplicateContract(String),

    /// Reading a particular artifact file failed.
    #[error("invalid artifact {}: {source}", path.display())]
    File {
        /// The artifact file.
        path: PathBuf,
        /// Why it could not be read.
        source: Box<ArtifactError>,
    },
}

/// Malformed bytecode hex.
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// The hex string has an odd number of digits.
    #[error("bytecode has an odd number of hex digits")]
    InvalidLength,

    /// The bytecode ends in the middle of a library placeholder.
    #[error("bytecode ends inside a library placeholder")]
    PlaceholderTooShort,

    /// A character outside of placeholders is not a hex digit.
    #[error("invalid hex digit '{0}'")]
    InvalidHexDigit(char),

    /// A library placeholder contains a character that is neither
    /// alphanumeric, `_` nor `$`.
    #[error("invalid character '{0}' in library placeholder")]
    InvalidPlaceholder(char),
}

impl From<FromHexError> for BytecodeError {
    fn from(err: FromHexError) -> Self {
        match err {
            FromHexError::InvalidHexCharacter { c, .. } => BytecodeError::InvalidHexDigit(c),
            FromHexError::OddLength | FromHexError::InvalidStringLength => {
                BytecodeError::InvalidLength
            }
        }
    }
}

/// Failure to produce deployable code from bytecode.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The bytecode still has a placeholder for the named library.
    #[error("library {0} is not linked")]
    UndefinedLibrary(String),

    /// The bytecode itself could not be decoded.
    #[error("invalid bytecode: {0}")]
    InvalidBytecode(#[from] BytecodeError),
}
