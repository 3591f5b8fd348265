//! Tracing subscriber setup.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Crates whose events are shown at the configured level.
const CRATES: &[&str] = &["histfetch_core", "histfetch"];

/// Filter used when `RUST_LOG` is not set: the configured level for our
/// crates, warnings for everything else.
pub fn default_filter(level: Level) -> EnvFilter {
    let level = level.to_string().to_ascii_lowercase();
    let directives: Vec<String> = std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|c| format!("{c}={level}")))
        .collect();
    EnvFilter::new(directives.join(","))
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `level` when set. Calling this when a subscriber
/// is already installed is a no-op.
pub fn init(level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
