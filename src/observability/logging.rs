//! Structured logging.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Fallback filter when nothing else is configured.
const DEFAULT_FILTER: &str = "warn";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format string; anything other than "json" is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from config settings and the process
    /// environment.
    ///
    /// Filter precedence: `--verbose` (forces `debug`), `RUST_LOG`,
    /// the config filter (which already absorbed `TRIPLERAG_LOG`), then `warn`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let rust_log = std::env::var("RUST_LOG").ok();
        Self::resolve(settings, verbose, rust_log.as_deref())
    }

    // Logging is not up yet, so a bad directive can only be reported on stderr.
    #[allow(clippy::print_stderr)]
    fn resolve(settings: &LoggingSettings, verbose: bool, rust_log: Option<&str>) -> Self {
        let directive = if verbose {
            "debug".to_string()
        } else {
            rust_log
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .or_else(|| settings.filter.clone())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string())
        };

        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!("Invalid log filter '{directive}': {err}; using '{DEFAULT_FILTER}'");
            EnvFilter::new(DEFAULT_FILTER)
        });

        Self {
            filter,
            format: settings
                .format
                .as_deref()
                .map(LogFormat::parse)
                .unwrap_or_default(),
            file: settings.file.clone(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: EnvFilter::new(DEFAULT_FILTER),
            format: LogFormat::default(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_verbose_forces_debug() {
        let settings = LoggingSettings {
            filter: Some("error".to_string()),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::resolve(&settings, true, Some("trace"));
        assert_eq!(config.filter.to_string(), "debug");
    }

    #[test]
    fn test_rust_log_beats_config() {
        let settings = LoggingSettings {
            filter: Some("error".to_string()),
            format: Some("json".to_string()),
            file: None,
        };
        let config = LoggingConfig::resolve(&settings, false, Some("info"));
        assert_eq!(config.filter.to_string(), "info");
        assert_eq!(config.format, LogFormat::Json);

        let config = LoggingConfig::resolve(&settings, false, None);
        assert_eq!(config.filter.to_string(), "error");
    }

    #[test]
    fn test_default_filter() {
        let config = LoggingConfig::resolve(&LoggingSettings::default(), false, None);
        assert_eq!(config.filter.to_string(), DEFAULT_FILTER);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }
}
