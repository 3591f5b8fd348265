//! Download orchestrator: walk the months, fetch, extract, move on.

use crate::config::Settings;
use crate::extract::{ExtractError, Unpack, ZipExtractor};
use crate::histdata::HistDataSource;
use crate::period::{month_range, Period};
use crate::session::Session;
use crate::source::{ArchiveSource, FetchError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Fetch and extract every month from `start` through `end` into `dest`.
///
/// Months are processed one at a time. A month that fails at any step is
/// logged, recorded in the report and skipped; nothing here aborts the run.
pub fn download_histdata(
    source: &dyn ArchiveSource,
    unpacker: &dyn Unpack,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    dest: &Path,
) -> RunReport {
    info!(
        "Downloading {} {} to {} into {}",
        symbol,
        start.format("%Y-%m"),
        end.format("%Y-%m"),
        dest.display()
    );

    let mut periods = Vec::new();
    for period in month_range(&start, &end) {
        let status = process_period(source, unpacker, symbol, period, dest);
        periods.push(PeriodReport { period, status });
    }

    let report = RunReport {
        symbol: symbol.to_string(),
        periods,
    };
    info!(
        extracted = report.extracted_count(),
        skipped = report.failed_count(),
        "Completed {}",
        symbol
    );
    report
}

fn process_period(
    source: &dyn ArchiveSource,
    unpacker: &dyn Unpack,
    symbol: &str,
    period: Period,
    dest: &Path,
) -> PeriodStatus {
    let archive = match source.fetch(symbol, period, dest) {
        Ok(path) => path,
        Err(e) => {
            error!(
                source = source.name(),
                "Download failed for {} {} - {}", symbol, period, e
            );
            return PeriodStatus::Skipped {
                reason: e.to_string(),
            };
        }
    };

    let archive_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match unpacker.unpack(&archive, dest) {
        Ok(files) => PeriodStatus::Extracted {
            archive: archive_name,
            files,
        },
        Err(e @ ExtractError::Corrupt { .. }) => {
            error!("Bad archive {} - {}", archive_name, e);
            PeriodStatus::Corrupt {
                archive: archive_name,
                reason: e.to_string(),
            }
        }
        Err(e @ ExtractError::Io(_)) => {
            error!("Could not extract {} - {}", archive_name, e);
            PeriodStatus::Failed {
                archive: archive_name,
                reason: e.to_string(),
            }
        }
    }
}

/// What happened to one month.
///
/// `Corrupt` means the archive itself was unreadable; `Failed` is a local
/// I/O error while unpacking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PeriodStatus {
    Extracted { archive: String, files: Vec<PathBuf> },
    Skipped { reason: String },
    Corrupt { archive: String, reason: String },
    Failed { archive: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: Period,
    #[serde(flatten)]
    pub status: PeriodStatus,
}

/// Per-month outcome of a download run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub symbol: String,
    pub periods: Vec<PeriodReport>,
}

impl RunReport {
    pub fn extracted_count(&self) -> usize {
        self.periods
            .iter()
            .filter(|p| matches!(p.status, PeriodStatus::Extracted { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.periods.len() - self.extracted_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }

    /// Months that produced no data, in order.
    pub fn missing_periods(&self) -> Vec<Period> {
        self.periods
            .iter()
            .filter(|p| !matches!(p.status, PeriodStatus::Extracted { .. }))
            .map(|p| p.period)
            .collect()
    }
}

/// HistData source plus zip extractor sharing one session for a run.
pub struct Downloader {
    source: HistDataSource,
    extractor: ZipExtractor,
}

impl Downloader {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let session = Session::new()?;
        Ok(Self {
            source: HistDataSource::with_base_url(session, settings.histdata_base.clone()),
            extractor: ZipExtractor,
        })
    }

    pub fn run(&self, symbol: &str, start: NaiveDate, end: NaiveDate, dest: &Path) -> RunReport {
        download_histdata(&self.source, &self.extractor, symbol, start, end, dest)
    }
}
