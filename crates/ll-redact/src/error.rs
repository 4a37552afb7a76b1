//! Redaction errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedactError>;

#[derive(Error, Debug)]
pub enum RedactError {
    /// The OS random source could not seed the fingerprint key.
    #[error("cannot seed fingerprint key: {0}")]
    KeySeed(String),
}

impl RedactError {
    /// Stable code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            RedactError::KeySeed(_) => 80,
        }
    }
}
