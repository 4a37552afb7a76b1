//! Configuration resolution.
//!
//! Resolution order: CLI argument (`-` for stdin) → `LINKEDIN_LAUNCH_CONFIG`
//! → XDG config file → `LINKEDIN_*` process environment.
//!
//! A path given explicitly (CLI or environment) must exist; only the XDG
//! location is optional.

use crate::object::{ConfigObject, ObjectError};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a configuration object was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit file given on the command line.
    CliArgument,

    /// Read from standard input (`--config -`).
    Stdin,

    /// File named by `LINKEDIN_LAUNCH_CONFIG`.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// Assembled from `LINKEDIN_*` variables of this process.
    ProcessEnv,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Stdin => write!(f, "stdin"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::ProcessEnv => write!(f, "process environment"),
        }
    }
}

/// Environment variable naming a config file.
pub const ENV_CONFIG_PATH: &str = "LINKEDIN_LAUNCH_CONFIG";

/// Config file name inside the XDG directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Application name for XDG directories.
pub const APP_NAME: &str = "linkedin-launch";

/// Path argument meaning "read standard input".
pub const STDIN_PATH: &str = "-";

/// Errors loading a configuration object.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config{}: {source}", location(.path))]
    Invalid {
        path: Option<PathBuf>,
        #[source]
        source: ObjectError,
    },
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}

impl LoadError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            LoadError::Io { .. } => 60,
            LoadError::Invalid { .. } => 61,
            LoadError::NotFound { .. } => 67,
        }
    }
}

/// A loaded configuration object and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub object: ConfigObject,
    pub source: ConfigSource,
    /// File path, when the object was read from a file.
    pub path: Option<PathBuf>,
}

/// Inputs to resolution, separated from the process so tests can
/// substitute each one.
pub struct Resolver<'a> {
    cli_path: Option<&'a Path>,
    env_path: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    env_lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
    stdin: Box<dyn FnMut() -> std::io::Result<String> + 'a>,
}

impl<'a> Resolver<'a> {
    /// Resolver reading from the real process environment.
    pub fn from_process(cli_path: Option<&'a Path>) -> Self {
        Self {
            cli_path,
            env_path: std::env::var_os(ENV_CONFIG_PATH)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            config_dir: xdg_config_dir(),
            env_lookup: Box::new(|name: &str| std::env::var(name).ok()),
            stdin: Box::new(|| {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }),
        }
    }

    pub fn with_env_path(mut self, path: Option<PathBuf>) -> Self {
        self.env_path = path;
        self
    }

    pub fn with_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config_dir = dir;
        self
    }

    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        self.env_lookup = Box::new(lookup);
        self
    }

    pub fn with_stdin(mut self, read: impl FnMut() -> std::io::Result<String> + 'a) -> Self {
        self.stdin = Box::new(read);
        self
    }

    /// Load the first configuration source present.
    pub fn resolve(mut self) -> Result<ResolvedConfig, LoadError> {
        if let Some(path) = self.cli_path {
            if path.as_os_str() == STDIN_PATH {
                let text = (self.stdin)().map_err(|source| LoadError::Io {
                    path: PathBuf::from(STDIN_PATH),
                    source,
                })?;
                let object = parse_object(&text, None)?;
                return Ok(found(object, ConfigSource::Stdin, None));
            }
            let object = load_config_file(path)?;
            return Ok(found(
                object,
                ConfigSource::CliArgument,
                Some(path.to_path_buf()),
            ));
        }

        if let Some(path) = self.env_path.take() {
            let object = load_config_file(&path)?;
            return Ok(found(object, ConfigSource::Environment, Some(path)));
        }

        if let Some(dir) = &self.config_dir {
            let path = dir.join(CONFIG_FILENAME);
            if path.is_file() {
                let object = load_config_file(&path)?;
                return Ok(found(object, ConfigSource::XdgConfig, Some(path)));
            }
        }

        let object = ConfigObject::from_env_lookup(&*self.env_lookup);
        Ok(found(object, ConfigSource::ProcessEnv, None))
    }
}

fn found(object: ConfigObject, source: ConfigSource, path: Option<PathBuf>) -> ResolvedConfig {
    tracing::debug!(
        source = %source,
        path = ?path,
        keys = object.len(),
        "configuration resolved"
    );
    ResolvedConfig {
        object,
        source,
        path,
    }
}

fn parse_object(text: &str, path: Option<&Path>) -> Result<ConfigObject, LoadError> {
    ConfigObject::from_json_str(text).map_err(|source| LoadError::Invalid {
        path: path.map(Path::to_path_buf),
        source,
    })
}

/// Resolve the configuration object using the standard order.
pub fn resolve_config(cli_path: Option<&Path>) -> Result<ResolvedConfig, LoadError> {
    Resolver::from_process(cli_path).resolve()
}

/// Read and parse a JSON config file.
pub fn load_config_file(path: &Path) -> Result<ConfigObject, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_object(&text, Some(path))
}

/// Read and parse a JSON config document from any reader.
pub fn load_config_reader<R: Read>(mut reader: R) -> Result<ConfigObject, LoadError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| LoadError::Io {
            path: PathBuf::from(STDIN_PATH),
            source,
        })?;
    parse_object(&text, None)
}

/// The XDG config directory for linkedin-launch.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
