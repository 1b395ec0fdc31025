//! Error types for decoding operations.

use std::fmt;

/// Errors that can occur while decoding a tile payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not a well-formed protobuf tile.
    Protobuf { message: String },
    /// The payload carried the gzip magic but did not inflate.
    Gzip { message: String },
    /// The layer declares a vector tile version this decoder does not read.
    UnsupportedVersion { layer: String, version: u32 },
    /// Invalid data format or structure.
    InvalidFormat {
        context: &'static str,
        detail: String,
    },
    /// A feature tag referenced a key or value outside the layer tables.
    IndexOutOfBounds { index: usize, len: usize },
    /// A feature lacks an attribute it cannot be placed without.
    MissingAttribute { feature: usize, key: &'static str },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protobuf { message } => write!(f, "malformed tile: {message}"),
            Self::Gzip { message } => write!(f, "failed to inflate gzip payload: {message}"),
            Self::UnsupportedVersion { layer, version } => {
                write!(f, "layer {layer:?} has unsupported version {version}")
            }
            Self::InvalidFormat { context, detail } => {
                write!(f, "invalid format in {context}: {detail}")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::MissingAttribute { feature, key } => {
                write!(f, "feature {feature} is missing numeric attribute `{key}`")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<prost::DecodeError> for DecodeError {
    fn from(e: prost::DecodeError) -> Self {
        Self::Protobuf {
            message: e.to_string(),
        }
    }
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
