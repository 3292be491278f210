//! Error types for the todo API client.
//!
//! 400 and 404 get dedicated variants because the sync layer shows their
//! server message to the user. Any other non-success status lands in
//! `HttpError` with the server's `{error}` message when it sent one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 400; the message names the missing field.
    #[error("{0}")]
    InvalidInput(String),

    /// The server returned 404; the referenced todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned any other unexpected status.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The host could not complete the HTTP round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}
