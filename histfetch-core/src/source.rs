//! Archive source trait and the structured reasons a fetch can come up empty.
//!
//! `ArchiveSource` abstracts over where monthly archives come from so the
//! orchestrator can run against the real HistData site or a stub in tests.
//! A fetch never raises: an `Err` here means "no archive for this period"
//! and is logged and skipped by the caller.

use crate::period::Period;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a period produced no archive.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("listing page {url} failed: {reason}")]
    Listing { url: String, reason: String },

    #[error("page parse error: {0}")]
    Parse(String),

    #[error("no download form or archive link found on {url}")]
    NoDownloadLink { url: String },

    #[error("archive download failed: {0}")]
    Download(String),

    #[error("unexpected response (content-type {content_type:?}, disposition {disposition:?})")]
    UnexpectedResponse {
        content_type: String,
        disposition: String,
    },

    #[error("could not determine an archive filename")]
    NoFilename,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can produce one archive file per period.
pub trait ArchiveSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the archive for `symbol` in `period` into `dest`.
    ///
    /// On success the returned path exists inside `dest`. On failure
    /// nothing is left behind in `dest`.
    fn fetch(&self, symbol: &str, period: Period, dest: &Path) -> Result<PathBuf, FetchError>;
}
