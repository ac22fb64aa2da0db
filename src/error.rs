//! Error taxonomy for the Stellaris access layer.
//!
//! Transient failures (429, dropped connections) are the only retryable
//! class. Everything else surfaces on the first attempt.

use thiserror::Error;

use crate::rpc_utils::TransportError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 429 from the node.
    #[error("rate limited by node on {endpoint}")]
    RateLimited { endpoint: String },

    /// Connection reset, refused, or any other request-level failure.
    #[error("network error on {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    /// Malformed URL or query, or an unreadable body.
    #[error("invalid request to {endpoint}: {source}")]
    Invalid {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// HTTP 422: the node refused the page size. Shrink the batch and ask again.
    #[error("request to {endpoint} too large (http 422)")]
    RequestTooLarge { endpoint: String },

    #[error("http {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Envelope came back with `ok: false`.
    #[error("API request failed: {endpoint} answered ok=false")]
    Rejected { endpoint: String },

    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub(crate) fn from_transport(endpoint: &str, err: TransportError) -> Self {
        match err {
            TransportError::Timeout(_) => ApiError::Timeout {
                endpoint: endpoint.to_string(),
            },
            err @ TransportError::Invalid(_) => ApiError::Invalid {
                endpoint: endpoint.to_string(),
                source: err,
            },
            other => ApiError::Network {
                endpoint: endpoint.to_string(),
                source: other,
            },
        }
    }

    pub(crate) fn from_status(endpoint: &str, status: u16) -> Self {
        let endpoint = endpoint.to_string();
        match status {
            429 => ApiError::RateLimited { endpoint },
            422 => ApiError::RequestTooLarge { endpoint },
            status => ApiError::Status { endpoint, status },
        }
    }

    /// Only rate limiting and network-level failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. } | ApiError::Network { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited { .. } => Some(429),
            ApiError::RequestTooLarge { .. } => Some(422),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::RateLimited { endpoint }
            | ApiError::Network { endpoint, .. }
            | ApiError::Invalid { endpoint, .. }
            | ApiError::Timeout { endpoint }
            | ApiError::RequestTooLarge { endpoint }
            | ApiError::Status { endpoint, .. }
            | ApiError::Rejected { endpoint }
            | ApiError::Decode { endpoint, .. } => endpoint,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
