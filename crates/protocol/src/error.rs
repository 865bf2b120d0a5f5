//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding or encoding event frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed event: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("expected a text frame")]
    NonText,
}
