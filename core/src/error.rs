//! Error types for the users/posts API client.
//!
//! # Design
//! Every failure belongs to one of two kinds. A *transport* error means no
//! HTTP response was obtained (connection refused, DNS failure, or a payload
//! that could not be encoded and so was never sent). A *server* error means a
//! response arrived but was not usable: a non-2xx status, or a 2xx whose body
//! does not match the declared schema. `NotFound` gets its own variant
//! because callers routinely branch on it.
//!
//! A connection that drops while the body is being read is still a transport
//! error, but `BodyRead` keeps the status line that did arrive.

use serde::Deserialize;
use thiserror::Error;

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Server,
}

/// Errors returned by `ApiClient` and `ApiGateway`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was obtained.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A resource identifier that cannot be expressed as a single path
    /// segment (empty, `.` or `..`). Nothing was sent.
    #[error("invalid resource id {0:?}")]
    InvalidId(String),

    /// The status line arrived but reading the body failed.
    #[error("reading response body failed (HTTP {status}): {source}")]
    BodyRead {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound { body: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A 2xx response body did not match the expected schema.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_)
            | ApiError::Serialization(_)
            | ApiError::InvalidId(_)
            | ApiError::BodyRead { .. } => ErrorKind::Transport,
            ApiError::NotFound { .. } | ApiError::Http { .. } | ApiError::Deserialization(_) => {
                ErrorKind::Server
            }
        }
    }

    /// HTTP status received before the failure, if a status line arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } | ApiError::BodyRead { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            ApiError::Serialization(_)
            | ApiError::Deserialization(_)
            | ApiError::InvalidId(_) => None,
        }
    }

    /// The `message` field of a JSON error body, e.g.
    /// `"A user with this email already exists"`.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::NotFound { body } | ApiError::Http { body, .. } => {
                serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.message)
            }
            _ => None,
        }
    }
}
