//! The redactor every output surface goes through.
//!
//! Order of operations for one value:
//! 1. classes whose action is `redact` are replaced outright;
//! 2. registered secrets are cut out of the text;
//! 3. `inspect` runs detection on what is left;
//! 4. the resulting action is applied.

use crate::detect::SecretDetector;
use crate::error::Result;
use crate::hash::HashKey;
use crate::{Action, FieldClass};
use serde::Serialize;
use std::sync::RwLock;

/// Placeholder for removed values.
pub const REDACTED: &str = "[REDACTED]";

/// Registered secrets shorter than this are not scrubbed from free text;
/// replacing two-letter substrings would mangle every message.
pub const MIN_KNOWN_SECRET_LEN: usize = 8;

/// Outcome of redacting one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redacted {
    pub text: String,
    /// Action that produced `text`.
    pub action: Action,
    pub modified: bool,
}

impl Redacted {
    fn kept(text: String) -> Self {
        Self {
            text,
            action: Action::Keep,
            modified: false,
        }
    }

    fn removed() -> Self {
        Self {
            text: REDACTED.to_string(),
            action: Action::Redact,
            modified: true,
        }
    }
}

pub struct Redactor {
    key: HashKey,
    detector: SecretDetector,
    known: RwLock<Vec<String>>,
}

impl Redactor {
    /// Redactor with a random fingerprint key.
    pub fn new() -> Result<Self> {
        Ok(Self::with_key(HashKey::random("k1")?))
    }

    pub fn with_key(key: HashKey) -> Self {
        Self {
            key,
            detector: SecretDetector::new(),
            known: RwLock::new(Vec::new()),
        }
    }

    /// Scrub `secret` from everything redacted from now on.
    pub fn register_secret(&self, secret: &str) {
        if secret.len() < MIN_KNOWN_SECRET_LEN {
            return;
        }
        let mut known = self.known.write().unwrap_or_else(|e| e.into_inner());
        if known.iter().all(|s| s != secret) {
            known.push(secret.to_string());
            // longest first, so a secret containing another goes whole
            known.sort_by_key(|s| std::cmp::Reverse(s.len()));
        }
    }

    pub fn known_secret_count(&self) -> usize {
        self.known.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn redact(&self, value: &str, class: FieldClass) -> Redacted {
        let action = class.default_action();
        if action == Action::Redact {
            return Redacted::removed();
        }

        let scrubbed = self.scrub(value);
        let had_known = scrubbed.is_some();
        let text = scrubbed.unwrap_or_else(|| value.to_string());

        let action = match action {
            Action::Inspect => self.inspect(&text),
            other => other,
        };

        let mut out = self.apply(text, action);
        out.modified |= had_known;
        out
    }

    /// Redact one argument of a command line, with the argument before it as
    /// context.
    pub fn redact_arg(&self, arg: &str, previous: Option<&str>) -> Redacted {
        match self.detector.scan_arg(arg, previous) {
            Some(kind) => self.apply(arg.to_string(), kind.action()),
            None => self.redact(arg, FieldClass::Arg),
        }
    }

    /// `program` and its arguments joined by spaces, each argument redacted.
    pub fn redact_command<S: AsRef<str>>(&self, program: &str, args: &[S]) -> String {
        let mut line = self.redact(program, FieldClass::Command).text;
        let mut previous: Option<&str> = None;
        for arg in args {
            let arg = arg.as_ref();
            line.push(' ');
            line.push_str(&self.redact_arg(arg, previous).text);
            previous = Some(arg);
        }
        line
    }

    /// `text` with registered secrets cut out and nothing else touched.
    pub fn scrub_known(&self, text: &str) -> String {
        self.scrub(text).unwrap_or_else(|| text.to_string())
    }

    /// `None` when no registered secret occurs in `value`.
    fn scrub(&self, value: &str) -> Option<String> {
        let known = self.known.read().unwrap_or_else(|e| e.into_inner());
        let mut text: Option<String> = None;
        for secret in known.iter() {
            let current = text.as_deref().unwrap_or(value);
            if current.contains(secret.as_str()) {
                text = Some(current.replace(secret.as_str(), REDACTED));
            }
        }
        text
    }

    fn inspect(&self, text: &str) -> Action {
        self.detector
            .scan(text)
            .map_or(Action::Keep, |kind| kind.action())
    }

    fn apply(&self, text: String, action: Action) -> Redacted {
        match action {
            Action::Keep => Redacted::kept(text),
            Action::Redact => Redacted::removed(),
            // an unresolved inspect is treated as hash
            Action::Hash | Action::Inspect => Redacted {
                text: self.key.fingerprint(&text),
                action: Action::Hash,
                modified: true,
            },
        }
    }
}

impl std::fmt::Debug for Redactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redactor")
            .field("key", &self.key)
            .field("known_secrets", &self.known_secret_count())
            .finish()
    }
}
