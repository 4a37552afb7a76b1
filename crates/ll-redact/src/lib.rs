//! Redaction for linkedin-launch.
//!
//! Credential values handed to the launcher must never reach a log line or a
//! human-facing payload. Every output surface goes through one [`Redactor`]:
//!
//! - values are classified ([`FieldClass`]) and each class has a fixed
//!   [`Action`]; credentials are always removed, names pass through;
//! - credentials loaded at runtime are registered and cut out of any text;
//! - free text is scanned for token shapes and random-looking strings
//!   ([`SecretDetector`]); matches are removed or replaced by a keyed
//!   fingerprint ([`HashKey`]).
//!
//! ```no_run
//! use ll_redact::{FieldClass, Redactor};
//!
//! let redactor = Redactor::new().unwrap();
//! redactor.register_secret("AQVx-refresh-token");
//!
//! let out = redactor.redact("refresh failed for AQVx-refresh-token", FieldClass::Text);
//! assert!(!out.text.contains("AQVx-refresh-token"));
//! ```

pub mod class;
pub mod detect;
pub mod engine;
pub mod error;
pub mod hash;

pub use class::{Action, FieldClass};
pub use detect::{SecretDetector, SecretKind};
pub use engine::{Redacted, Redactor, MIN_KNOWN_SECRET_LEN, REDACTED};
pub use error::{RedactError, Result};
pub use hash::HashKey;
