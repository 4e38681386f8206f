//! Error types for the Donate Bot API client.
//!
//! # Design
//! Failures detected locally (`Config`, `Usage`) never reach the network.
//! `Remote` carries the message the service put in the `Error` field of a
//! structured error body. Everything else the transport or the response
//! shape can go wrong with lands in `Transport`, keeping the raw status and
//! body for debugging.

use thiserror::Error;

/// Underlying failure reported by a transport, kept intact for downcasting.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const INVALID_SERVER_ID: &str = "Please provide a valid Discord server ID as a string.";
pub const INVALID_API_KEY: &str = "Please provide a valid Donate Bot API key.";
pub const INVALID_BASE_URL: &str = "Please provide a valid Donate Bot API base URL.";
pub const TXN_ID_REQUIRED: &str = "txnID must be provided as a string inside options.";
pub const INVALID_TXN_ID: &str = "txnID must not be \".\" or \"..\".";
pub const OPTIONS_REQUIRED: &str = "An object of options are required for this function. \
See documentation at https://developers.donatebot.io";

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// `server_id`, `api_key` or `base_url` is missing or empty.
    #[error("{0}")]
    Config(String),

    /// The call arguments are malformed.
    #[error("{0}")]
    Usage(String),

    /// The service answered with a structured `{"Error": "..."}` body.
    #[error("{0}")]
    Remote(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    /// The message of a locally detected or remote error, if this is one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Config(msg) | ApiError::Usage(msg) | ApiError::Remote(msg) => Some(msg),
            ApiError::Transport(_) => None,
        }
    }
}

/// Failures that carry no structured message from the service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),

    /// Non-2xx status without an `Error` field in the body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx response body did not have the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl TransportError {
    pub fn connection(source: impl Into<BoxError>) -> Self {
        TransportError::Connection(source.into())
    }
}
