use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single upstream call.
///
/// Every variant is recoverable: callers degrade to the next source in their
/// fallback chain rather than surfacing these to the user directly.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{endpoint} returned an unexpected payload: {reason}")]
    Payload {
        endpoint: &'static str,
        reason: String,
    },

    #[error("no API key configured for {endpoint}")]
    Unconfigured { endpoint: &'static str },
}

impl FetchError {
    pub fn payload(endpoint: &'static str, reason: impl Into<String>) -> Self {
        FetchError::Payload {
            endpoint,
            reason: reason.into(),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Payload { endpoint, .. }
            | FetchError::Unconfigured { endpoint } => endpoint,
        }
    }
}

/// Every source in a fallback chain failed.
#[derive(Debug, Error)]
#[error("all {} sources failed", failures.len())]
pub struct Exhausted {
    /// Source name and error, in the order the sources were tried.
    pub failures: Vec<(&'static str, FetchError)>,
}
