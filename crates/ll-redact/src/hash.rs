//! Keyed fingerprints.
//!
//! A fingerprint is a truncated HMAC-SHA256 of the value under a per-process
//! key. Equal values give equal fingerprints within one run, so a reader can
//! tell that two log lines carry the same token without learning it.

use crate::error::{RedactError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Digest bytes kept in a fingerprint.
pub const FINGERPRINT_BYTES: usize = 8;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct HashKey {
    id: String,
    secret: [u8; 32],
}

impl HashKey {
    /// Fresh key from the OS random source.
    pub fn random(id: impl Into<String>) -> Result<Self> {
        let mut secret = [0u8; 32];
        getrandom::getrandom(&mut secret).map_err(|e| RedactError::KeySeed(e.to_string()))?;
        Ok(Self {
            id: id.into(),
            secret,
        })
    }

    /// Key with fixed bytes, for reproducible output.
    pub fn fixed(secret: [u8; 32], id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret,
        }
    }

    /// `[HASH:<id>:<16 hex chars>]` for `value`.
    pub fn fingerprint(&self, value: &str) -> String {
        match HmacSha256::new_from_slice(&self.secret) {
            Ok(mut mac) => {
                mac.update(value.as_bytes());
                let digest = mac.finalize().into_bytes();
                format!("[HASH:{}:{}]", self.id, hex::encode(&digest[..FINGERPRINT_BYTES]))
            }
            Err(_) => crate::REDACTED.to_string(),
        }
    }
}

impl std::fmt::Debug for HashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashKey")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
