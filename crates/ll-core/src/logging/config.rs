//! Log level and format selection.
//!
//! Sources, lowest to highest precedence: `RUST_LOG`, `LL_LOG` /
//! `LL_LOG_FORMAT`, then the `-v`/`-q`/`--log-format` flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ENV_LOG_LEVEL: &str = "LL_LOG";
pub const ENV_LOG_FORMAT: &str = "LL_LOG_FORMAT";
const ENV_RUST_LOG: &str = "RUST_LOG";

/// Shape of log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "pretty" | "console" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most verbose level let through. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Off,
    ];

    /// Level requested by `-v` repetitions and `-q`; `None` when neither
    /// was given. `-q` wins.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<Self> {
        match (quiet, verbose) {
            (true, _) => Some(LogLevel::Error),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Most verbose level named in a `RUST_LOG` style directive list.
    fn from_directives(directives: &str) -> Option<Self> {
        directives
            .split(',')
            .filter_map(|d| d.rsplit('=').next())
            .filter_map(|level| level.trim().parse::<LogLevel>().ok())
            .min()
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let canonical = match lower.as_str() {
            "warning" => "warn",
            "none" | "quiet" => "off",
            other => other,
        };
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == canonical)
            .ok_or_else(|| format!("unknown log level: {s}"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Timestamps on human lines. JSONL lines always carry `ts`.
    pub timestamps: bool,
    /// `RUST_LOG` as given, kept only when it decided `level`.
    pub directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
            directives: None,
        }
    }
}

impl LogConfig {
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        Self::from_lookup(|name: &str| std::env::var(name).ok(), level, format)
    }

    /// Resolve from `lookup` (an environment stand-in) plus flag overrides.
    pub fn from_lookup<F>(lookup: F, level: Option<LogLevel>, format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ll_log = lookup(ENV_LOG_LEVEL);
        let rust_log = match (level, &ll_log) {
            (None, None) => lookup(ENV_RUST_LOG).filter(|v| !v.trim().is_empty()),
            _ => None,
        };
        let env_level = match ll_log {
            Some(value) => value.parse().ok(),
            None => rust_log.as_deref().and_then(LogLevel::from_directives),
        };
        let env_format = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok());

        let defaults = Self::default();
        Self {
            level: level.or(env_level).unwrap_or(defaults.level),
            format: format.or(env_format).unwrap_or(defaults.format),
            timestamps: defaults.timestamps,
            directives: rust_log,
        }
    }
}
