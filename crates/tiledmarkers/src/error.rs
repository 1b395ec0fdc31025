//! Error types for the tiledmarkers crate.

use std::fmt;

/// Result type for tiledmarkers operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a tile.
///
/// Every error is scoped to a single tile address: a failed tile shows no
/// markers until it is requested again.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed.
    Http {
        /// The URL that failed.
        url: String,
        /// The error message.
        message: String,
    },
    /// HTTP response had a non-success status code.
    HttpStatus {
        /// The URL that returned the error.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
    /// The payload was not a well-formed tile.
    Decode(tiledmarkers_decode::DecodeError),
    /// Layer configuration was rejected.
    Config {
        /// Description of what was invalid.
        detail: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http { url, message } => {
                write!(f, "http request to {url} failed: {message}")
            }
            Error::HttpStatus { url, status } => {
                write!(f, "http request to {url} returned status {status}")
            }
            Error::Decode(e) => write!(f, "decode error: {e}"),
            Error::Config { detail } => write!(f, "invalid layer config: {detail}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tiledmarkers_decode::DecodeError> for Error {
    fn from(e: tiledmarkers_decode::DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config {
            detail: e.to_string(),
        }
    }
}
