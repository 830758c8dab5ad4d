use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Network, DNS, TLS or timeout failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    NonOkStatus { status: u16, url: String },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{provider} search failed: {reason}")]
    Search {
        provider: &'static str,
        reason: String,
    },
}

impl ScraperError {
    /// HTTP status of a non-2xx response, if this error carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ScraperError::NonOkStatus { status, .. } => Some(*status),
            ScraperError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// `true` for transport-level failures where no HTTP response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ScraperError::Http(_))
    }
}
