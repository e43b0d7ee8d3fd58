//! Logging configuration.
//!
//! Supports configuration via:
//! - Environment variables (MC_LOG, RUST_LOG, MC_LOG_FORMAT)
//! - CLI flags (--log-level, --log-format)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "MC_LOG";
/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "MC_LOG_FORMAT";

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    #[value(alias = "console", alias = "pretty")]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "none", alias = "quiet")]
    Off,
}

/// `FromStr` and `Display` for the clap value enums, case-insensitive.
macro_rules! value_enum_str {
    ($ty:ty, $what:literal) => {
        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as ValueEnum>::from_str(s.trim(), true)
                    .map_err(|_| format!(concat!("unknown ", $what, ": {}"), s))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.to_possible_value() {
                    Some(v) => f.write_str(v.get_name()),
                    None => Ok(()),
                }
            }
        }
    };
}

value_enum_str!(LogFormat, "log format");
value_enum_str!(LogLevel, "log level");

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
            LogLevel::Off => tracing_subscriber::filter::LevelFilter::OFF,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Whether to include timestamps in human output.
    pub timestamps: bool,
    /// Raw RUST_LOG directives, honoured when MC_LOG and the CLI are silent.
    pub directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
            directives: None,
        }
    }
}

impl LogConfig {
    /// Create config from environment and CLI overrides.
    ///
    /// MC_LOG takes precedence over RUST_LOG; CLI flags over both.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_vars(
            std::env::var(ENV_LOG_LEVEL).ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var(ENV_LOG_FORMAT).ok(),
            cli_level,
            cli_format,
        )
    }

    fn from_vars(
        mc_log: Option<String>,
        rust_log: Option<String>,
        mc_log_format: Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let mut config = LogConfig::default();

        if let Some(level) = mc_log.and_then(|v| v.parse::<LogLevel>().ok()) {
            config.level = level;
        } else if let Some(directives) = rust_log.filter(|v| !v.trim().is_empty()) {
            config.directives = Some(directives);
        }

        if let Some(format) = mc_log_format.and_then(|v| v.parse::<LogFormat>().ok()) {
            config.format = format;
        }

        if let Some(level) = cli_level {
            config.level = level;
            config.directives = None;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self.directives = None;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Filter directives for the subscriber.
    pub fn filter_directives(&self) -> String {
        match &self.directives {
            Some(d) => d.clone(),
            None => format!("mc_core={0},mc_config={0},markov_cohort={0}", self.level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert_eq!("jsonl".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Jsonl.to_string(), "jsonl");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("quiet".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert_eq!("TRACE".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_mc_log_beats_rust_log() {
        let config = LogConfig::from_vars(
            Some("debug".into()),
            Some("trace".into()),
            None,
            None,
            None,
        );
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.directives, None);
    }

    #[test]
    fn test_rust_log_directives_pass_through() {
        let config = LogConfig::from_vars(None, Some("mc_core=trace".into()), None, None, None);
        assert_eq!(config.filter_directives(), "mc_core=trace");
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = LogConfig::from_vars(
            Some("debug".into()),
            None,
            Some("human".into()),
            Some(LogLevel::Error),
            Some(LogFormat::Jsonl),
        );
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, LogFormat::Jsonl);
        assert!(config.filter_directives().contains("mc_core=error"));
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::default()
            .with_format(LogFormat::Jsonl)
            .with_level(LogLevel::Debug)
            .with_timestamps(false);
        assert_eq!(config.format, LogFormat::Jsonl);
        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.timestamps);
    }
}
