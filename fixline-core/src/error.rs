/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the fixline FIX client engine.
//!
//! Errors are grouped by the layer that raises them: framing and parsing of
//! inbound bytes, building outbound templates, and the session/connection
//! lifecycle. [`FixError`] unifies them for callbacks and public APIs.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all fixline operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error while framing or decoding inbound bytes.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error while building an outbound message.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error from the underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixError {
    /// Returns true if this error is an expectation timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Session(SessionError::ExpectTimeout { .. }))
    }
}

/// Errors that occur while framing inbound bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffered bytes exceed the maximum frame size without a trailer.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Bytes buffered so far.
        size: usize,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },
}

/// Errors that occur while building an outbound message from a template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A template token carries a tag that is not a decimal number.
    #[error("invalid tag in template: {0:?}")]
    InvalidTag(String),
}

/// Errors in session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No matching message arrived before the expectation timed out.
    #[error("timeout after {waited_ms} ms waiting for {filters:?}")]
    ExpectTimeout {
        /// How long the caller waited, in milliseconds.
        waited_ms: u64,
        /// The substrings the caller was waiting for.
        filters: Vec<String>,
    },

    /// Nothing was received from the venue within the inactivity window.
    #[error("heartbeat timeout after {elapsed_ms} milliseconds, reconnecting")]
    HeartbeatTimeout {
        /// Elapsed time in milliseconds since the last inbound message.
        elapsed_ms: u64,
    },

    /// Establishing the connection did not finish in time.
    #[error("connect to {addr} timed out after {timeout_ms} ms")]
    ConnectTimeout {
        /// Venue address.
        addr: String,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The venue closed the connection.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The engine was already started.
    #[error("engine already started")]
    AlreadyStarted,

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}
