//! histfetch core: monthly HistData tick archive downloader.
//!
//! This crate contains the whole download pipeline:
//! - Month ranges (`period`)
//! - The shared HTTP session (`session`)
//! - HistData listing resolution, archive fetch and instrument catalog (`histdata`)
//! - Zip extraction with unconditional cleanup (`extract`)
//! - The staging directory guard (`staging`)
//! - The per-month orchestrator and its report (`download`)
//! - Settings and logging setup (`config`, `logging`)

pub mod config;
pub mod download;
pub mod extract;
pub mod histdata;
pub mod logging;
pub mod period;
pub mod session;
pub mod source;
pub mod staging;

pub use config::Settings;
pub use download::{download_histdata, Downloader, PeriodReport, PeriodStatus, RunReport};
pub use extract::{ExtractError, Unpack, ZipExtractor};
pub use histdata::{HistDataSource, InstrumentInfo, HISTDATA_BASE};
pub use period::{month_range, MonthRange, Period};
pub use session::Session;
pub use source::{ArchiveSource, FetchError};
pub use staging::{ensure_staging_dir, Confirm, StagingError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the value types handed between steps are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Period>();
        require_sync::<Period>();
        require_send::<MonthRange>();
        require_sync::<MonthRange>();
        require_send::<RunReport>();
        require_sync::<RunReport>();
        require_send::<Settings>();
        require_sync::<Settings>();
        require_send::<Session>();
        require_sync::<Session>();
        require_send::<FetchError>();
        require_sync::<FetchError>();
    }
}
