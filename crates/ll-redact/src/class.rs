//! What a value is, and what to do with it.

use serde::{Deserialize, Serialize};

/// Kind of value handed to the redactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// A configured credential, or the environment value carrying it.
    Credential,
    /// Config key such as `linkedinClientId`.
    ConfigKey,
    /// Program of the launched server.
    Command,
    /// One argument of the launched server.
    Arg,
    /// Environment variable name such as `LINKEDIN_CLIENT_ID`.
    EnvName,
    /// Config file location.
    Path,
    Pid,
    /// Log messages, error strings and anything else unstructured.
    Text,
}

impl FieldClass {
    /// What the redactor does with values of this class.
    pub fn default_action(self) -> Action {
        match self {
            FieldClass::Credential => Action::Redact,
            FieldClass::Arg | FieldClass::Text => Action::Inspect,
            FieldClass::ConfigKey
            | FieldClass::Command
            | FieldClass::EnvName
            | FieldClass::Path
            | FieldClass::Pid => Action::Keep,
        }
    }

    /// Class of a structured log field, judged by its name.
    pub fn for_log_field(name: &str) -> Self {
        match name {
            "command" | "cmd" | "program" => FieldClass::Command,
            "arg" | "args" => FieldClass::Arg,
            "field" | "fields" | "key" => FieldClass::ConfigKey,
            "env" | "env_var" | "env_names" => FieldClass::EnvName,
            "path" | "file" | "dir" => FieldClass::Path,
            "pid" => FieldClass::Pid,
            "value" | "secret" | "token" | "credential" => FieldClass::Credential,
            _ => FieldClass::Text,
        }
    }
}

/// Treatment of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Pass through unchanged.
    Keep,
    /// Replace with [`crate::REDACTED`].
    #[default]
    Redact,
    /// Replace with a keyed fingerprint, `[HASH:<key id>:<hex>]`.
    Hash,
    /// Run secret detection and act on the result.
    Inspect,
}
