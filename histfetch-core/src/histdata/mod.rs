//! HistData.com archive source.
//!
//! Fetches one monthly ASCII tick archive per request: GET the listing
//! page for the period, resolve the download form (or the anchor
//! fallback), POST it, and stream the zip to disk. There are no retries.

pub mod catalog;
pub mod disposition;
pub mod page;

use crate::period::Period;
use crate::session::Session;
use crate::source::{ArchiveSource, FetchError};
use reqwest::blocking::Response;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use catalog::{fetch_catalog, parse_catalog, CatalogError, InstrumentInfo};
pub use page::{resolve_download, DownloadAction};

/// Default address of the HistData free download section.
pub const HISTDATA_BASE: &str = "https://www.histdata.com/download-free-forex-historical-data";

/// Listing page for one symbol and month.
///
/// The month is not zero-padded and the symbol is lower-cased, matching
/// the site's own links.
pub fn listing_url(base: &str, symbol: &str, period: Period) -> String {
    format!(
        "{base}?/ascii/tick-data-quotes/{}/{}/{}",
        symbol.to_lowercase(),
        period.year,
        period.month
    )
}

/// Archive source backed by the HistData website.
pub struct HistDataSource {
    session: Session,
    base_url: String,
}

impl HistDataSource {
    pub fn new(session: Session) -> Self {
        Self::with_base_url(session, HISTDATA_BASE)
    }

    pub fn with_base_url(session: Session, base_url: impl Into<String>) -> Self {
        Self {
            session,
            base_url: base_url.into(),
        }
    }
}

impl ArchiveSource for HistDataSource {
    fn name(&self) -> &str {
        "histdata"
    }

    fn fetch(&self, symbol: &str, period: Period, dest: &Path) -> Result<PathBuf, FetchError> {
        let page_url = listing_url(&self.base_url, symbol, period);
        debug!(url = %page_url, "fetching listing page");

        let html = self
            .session
            .get_page(&page_url)
            .map_err(|e| FetchError::Listing {
                url: page_url.clone(),
                reason: e.to_string(),
            })?;

        let action = resolve_download(&html, &page_url)?;
        debug!(url = %action.url, fields = action.payload.len(), "submitting download");

        let response = self
            .session
            .post_form(action.url.as_str(), &action.payload, &page_url)
            .map_err(|e| FetchError::Download(e.to_string()))?;

        let content_type = header_value(&response, CONTENT_TYPE).to_ascii_lowercase();
        let disposition = header_value(&response, CONTENT_DISPOSITION);
        if !disposition::is_archive_response(&content_type, &disposition) {
            return Err(FetchError::UnexpectedResponse {
                content_type,
                disposition,
            });
        }

        let file_name = disposition::filename(&disposition)
            .and_then(|n| disposition::safe_file_name(&n))
            .or_else(|| {
                action
                    .fallback_name
                    .as_deref()
                    .and_then(disposition::safe_file_name)
            })
            .ok_or(FetchError::NoFilename)?;

        let path = dest.join(&file_name);
        let size = stream_to_file(response, &path)?;
        info!(
            "Saved {} ({:.2} MB)",
            file_name,
            size as f64 / (1024.0 * 1024.0)
        );
        Ok(path)
    }
}

fn header_value(response: &Response, name: reqwest::header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Copy the response body into `path`, removing the file if the copy fails.
fn stream_to_file(mut response: Response, path: &Path) -> Result<u64, FetchError> {
    let mut file = File::create(path)?;
    match std::io::copy(&mut response, &mut file) {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(file);
            let _ = std::fs::remove_file(path);
            Err(FetchError::Download(format!("body stream interrupted: {e}")))
        }
    }
}
