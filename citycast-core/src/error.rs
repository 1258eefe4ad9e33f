use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a query could not be turned into a [`crate::Resolution`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather service unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("Unexpected response from weather service: {0}")]
    MalformedResponse(String),
}

/// Failure of a single call to an external provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to reach {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} did not answer within {timeout:?}")]
    Timeout {
        provider: &'static str,
        timeout: Duration,
    },

    #[error("Failed to parse {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// Map a failed weather lookup for `query` into the resolution taxonomy.
    pub fn into_resolution_error(self, query: &str) -> ResolutionError {
        match self {
            ProviderError::Status { .. } => ResolutionError::LocationNotFound(query.to_string()),
            err @ (ProviderError::Transport { .. } | ProviderError::Timeout { .. }) => {
                ResolutionError::ProviderUnreachable(err.to_string())
            }
            err @ ProviderError::Decode { .. } => ResolutionError::MalformedResponse(err.to_string()),
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
