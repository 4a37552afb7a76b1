//! Process exit codes for `linkedin-launch`.
//!
//! - 0: success
//! - 10-19: problems the caller can fix (configuration, arguments)
//! - 20-29: internal or system failures
//!
//! After a successful spawn `run` exits with the server's own status
//! instead; see [`crate::forwarded_exit_code`].

use crate::launch::LaunchError;
use ll_config::{LoadError, ValidationError};

/// Stable contract for hosts and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Clean = 0,

    // --- caller-fixable (10-19) ---
    /// A required credential is missing or empty.
    ConfigInvalid = 10,
    /// No usable configuration object: unreadable file, bad JSON, non-string value.
    ConfigLoadError = 11,
    ArgsError = 12,

    // --- internal (20-29) ---
    /// Writing the command's output failed.
    IoError = 21,
    /// The server could not be started or waited on.
    SpawnError = 22,
}

impl ExitCode {
    pub const ALL: [ExitCode; 6] = [
        ExitCode::Clean,
        ExitCode::ConfigInvalid,
        ExitCode::ConfigLoadError,
        ExitCode::ArgsError,
        ExitCode::IoError,
        ExitCode::SpawnError,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    pub fn is_user_error(self) -> bool {
        matches!(self.as_i32(), 10..=19)
    }

    pub fn is_internal_error(self) -> bool {
        matches!(self.as_i32(), 20..=29)
    }

    /// Name used in the `error.code` key of JSON error payloads.
    pub fn code_name(self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ConfigInvalid => "ERR_CONFIG_INVALID",
            ExitCode::ConfigLoadError => "ERR_CONFIG_LOAD",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::IoError => "ERR_IO",
            ExitCode::SpawnError => "ERR_SPAWN",
        }
    }
}

impl From<&ValidationError> for ExitCode {
    fn from(_: &ValidationError) -> Self {
        ExitCode::ConfigInvalid
    }
}

impl From<&LoadError> for ExitCode {
    fn from(_: &LoadError) -> Self {
        ExitCode::ConfigLoadError
    }
}

impl From<&LaunchError> for ExitCode {
    fn from(_: &LaunchError) -> Self {
        ExitCode::SpawnError
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_codes_are_stable() {
        let codes: Vec<i32> = ExitCode::ALL.iter().map(|c| c.as_i32()).collect();
        assert_eq!(codes, vec![0, 10, 11, 12, 21, 22]);
    }

    #[test]
    fn test_every_code_in_one_band() {
        for code in ExitCode::ALL {
            let bands = [code.is_success(), code.is_user_error(), code.is_internal_error()];
            assert_eq!(bands.iter().filter(|b| **b).count(), 1, "{code}");
        }
    }

    #[test]
    fn test_error_mapping() {
        let missing = ValidationError::MissingField("linkedinAccessToken".to_string());
        assert_eq!(ExitCode::from(&missing), ExitCode::ConfigInvalid);

        let absent = LoadError::NotFound {
            path: PathBuf::from("/nonexistent/config.json"),
        };
        assert_eq!(ExitCode::from(&absent), ExitCode::ConfigLoadError);

        let spawn = LaunchError::Spawn {
            command: "python".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(ExitCode::from(&spawn), ExitCode::SpawnError);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::ConfigInvalid.to_string(), "ERR_CONFIG_INVALID (10)");
        assert_eq!(i32::from(ExitCode::SpawnError), 22);
    }
}
