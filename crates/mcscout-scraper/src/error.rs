use thiserror::Error;

/// Transport-level failures raised by [`crate::PageFetcher`].
///
/// None of these are fatal to a scan: the acquisition loop reports them as
/// an error status for the current identifier and moves on.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScraperError {
    /// Whether the failure was a request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScraperError::Http(e) if e.is_timeout())
    }
}

/// Reasons [`crate::SessionManager::start_session`] refuses to start a scan.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a scan is already in progress")]
    AlreadyActive,

    #[error("invalid scan request: {0}")]
    InvalidRequest(#[from] mcscout_core::CoreError),

    #[error("could not prepare HTTP client: {0}")]
    Client(#[from] ScraperError),
}
