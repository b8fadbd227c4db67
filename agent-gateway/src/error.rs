use thiserror::Error;

use agent_gateway_types::AidError;

/// Errors surfaced to callers of [`crate::Gateway`]'s public contract.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gateway connection is closed")]
    Closed,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors decoding a single frame off the wire.
///
/// A `DecodeError` never reaches application code directly: the reader
/// thread logs it and drops the offending frame, keeping the connection
/// alive for the next one.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame matched no known shape (no action, inResponseTo, or message key)")]
    UnknownShape,
    #[error("invalid AID on the wire: {0}")]
    Aid(#[from] AidError),
    #[error("invalid base64 in binary attribute: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("float-array byte length {0} is not a multiple of 4")]
    FloatArrayLength(usize),
}

/// Errors encoding an outgoing frame.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize frame: {0}")]
    Json(#[from] serde_json::Error),
}
