//! Environment-driven settings.
//!
//! Values come from the process environment, after an optional `.env`
//! file in the working directory has been loaded.

use crate::histdata::HISTDATA_BASE;
use std::path::PathBuf;
use tracing::Level;

/// Runtime settings for a download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base data directory (`DATA_DIR`).
    pub data_dir: PathBuf,
    /// Log verbosity (`LOG_LEVEL`).
    pub log_level: Level,
    /// Listing base address (`HISTDATA_BASE_URL`).
    pub histdata_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_level: Level::INFO,
            histdata_base: HISTDATA_BASE.to_string(),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            data_dir: non_empty("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_level: non_empty("LOG_LEVEL")
                .map(|v| parse_level(&v))
                .unwrap_or(defaults.log_level),
            histdata_base: non_empty("HISTDATA_BASE_URL").unwrap_or(defaults.histdata_base),
        }
    }

    /// Staging directory for archives and extracted files.
    pub fn tmp_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }
}

/// Parse a log level name, falling back to `INFO` for anything unknown.
///
/// `WARNING` and `CRITICAL` are accepted as aliases.
pub fn parse_level(value: &str) -> Level {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "critical" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tmp_dir(), PathBuf::from("data").join("tmp"));
    }

    #[test]
    fn overrides_from_environment() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATA_DIR", "/srv/fx"),
            ("LOG_LEVEL", "WARNING"),
            ("HISTDATA_BASE_URL", "http://mirror.test/dl"),
        ]));
        assert_eq!(settings.data_dir, PathBuf::from("/srv/fx"));
        assert_eq!(settings.tmp_dir(), PathBuf::from("/srv/fx/tmp"));
        assert_eq!(settings.log_level, Level::WARN);
        assert_eq!(settings.histdata_base, "http://mirror.test/dl");
    }

    #[test]
    fn blank_values_are_ignored() {
        let settings = Settings::from_lookup(lookup(&[("DATA_DIR", "  ")]));
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("loud"), Level::INFO);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level("critical"), Level::ERROR);
    }
}
