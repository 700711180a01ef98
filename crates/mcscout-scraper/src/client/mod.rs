//! HTTP client for the carrier snapshot and SMS registration pages.

mod origin;

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};

use crate::error::ScraperError;

pub use origin::{extract_origin, join_origin, resolve_link};

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// Issues browser-like requests against the lookup service.
///
/// One `PageFetcher` is built per scan session. The underlying client keeps a
/// cookie jar, so any session cookie the service hands out on the first
/// lookup is replayed on every later request of the same scan.
///
/// Every request is bounded by the configured timeout. Connection errors,
/// timeouts, and non-2xx statuses all surface as [`ScraperError`]; nothing
/// panics past this boundary.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a fetcher with the given timeout (applied to both connect and
    /// the whole request) and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        default_headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );
        default_headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );

        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .cookie_store(true)
            .gzip(true)
            .user_agent(user_agent)
            .default_headers(default_headers)
            .build()?;
        Ok(Self { client })
    }

    /// Sends one request and returns the page body.
    ///
    /// `form` is sent URL-encoded as the request body when present. `headers`
    /// are added on top of the browser defaults.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` does not parse.
    /// - [`ScraperError::Http`]: DNS, TLS, connection, or timeout failure.
    /// - [`ScraperError::UnexpectedStatus`]: any non-2xx response.
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        form: Option<&[(&str, String)]>,
        headers: &[(HeaderName, String)],
    ) -> Result<Page, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let mut request = self.client.request(method.clone(), parsed);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(form) = form {
            request = request.form(form);
        }

        tracing::debug!(%method, url, "fetching page");
        let response = request.send().await?;
        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        Ok(Page {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }

    /// GET `url` with a `Referer` header.
    ///
    /// # Errors
    ///
    /// See [`PageFetcher::fetch`].
    pub async fn get(&self, url: &str, referer: &str) -> Result<Page, ScraperError> {
        self.fetch(
            Method::GET,
            url,
            None,
            &[(header::REFERER, referer.to_owned())],
        )
        .await
    }

    /// Form-POST to `url`, sending `Origin`/`Referer` the way the service's
    /// own search form does.
    ///
    /// # Errors
    ///
    /// See [`PageFetcher::fetch`].
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        origin: &str,
        referer: &str,
    ) -> Result<Page, ScraperError> {
        self.fetch(
            Method::POST,
            url,
            Some(form),
            &[
                (header::ORIGIN, origin.to_owned()),
                (header::REFERER, referer.to_owned()),
            ],
        )
        .await
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
