//! Shared HTTP session for a download run.
//!
//! One blocking client per run, carrying a browser-like user agent and
//! accept header. HistData serves a different page to clients that look
//! like scripts.

use crate::source::FetchError;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use std::time::Duration;

pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36";

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Timeout for listing pages.
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for archive downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// A reusable HTTP client with fixed headers and per-call timeouts.
///
/// Not meant to be shared between concurrent runs.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    listing_timeout: Duration,
    download_timeout: Duration,
}

impl Session {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(LISTING_TIMEOUT, DOWNLOAD_TIMEOUT)
    }

    pub fn with_timeouts(
        listing_timeout: Duration,
        download_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            listing_timeout,
            download_timeout,
        })
    }

    /// GET a page and return its body, failing on any non-success status.
    pub fn get_page(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .timeout(self.listing_timeout)
            .send()?
            .error_for_status()?
            .text()
    }

    /// POST a form payload with a `Referer`, returning the unread response.
    ///
    /// The body is left unconsumed so the caller can stream it to disk.
    pub fn post_form(
        &self,
        url: &str,
        payload: &[(String, String)],
        referer: &str,
    ) -> Result<Response, reqwest::Error> {
        self.client
            .post(url)
            .header(REFERER, referer)
            .form(payload)
            .timeout(self.download_timeout)
            .send()?
            .error_for_status()
    }
}
