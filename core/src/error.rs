//! Error types for the catalog client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the single-course lookup is
//! commonly pointed at ids that do not exist. Other non-2xx responses land in
//! `HttpError` with the raw status code and body. Input guards (empty id
//! lists, empty course ids, anonymous FCE requests) are not errors and never
//! produce one of these.

use thiserror::Error;

/// Errors surfaced by request building, response parsing and transports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The configured base URL cannot be turned into a request URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::DeserializationError(err.to_string())
    }
}
