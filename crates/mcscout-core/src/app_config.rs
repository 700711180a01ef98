use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings shared by the CLI and the server.
///
/// The snapshot and SMS endpoints are configurable so tests (and mirrors)
/// can point the scraper at a local server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Form-POST endpoint of the carrier snapshot lookup.
    pub snapshot_url: String,
    /// Origin sent as `Origin`/`Referer` on snapshot lookups.
    pub snapshot_origin: String,
    /// Origin used to absolutize relative SMS result links.
    pub sms_origin: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Wait after every identifier, whatever its outcome.
    pub pacing_delay_ms: u64,
    /// Wait before each of the two enrichment fetches.
    pub politeness_delay_ms: u64,
}
