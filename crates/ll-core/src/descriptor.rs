//! Launch descriptor construction.
//!
//! A [`LaunchDescriptor`] says how to start the LinkedIn MCP server: the
//! program, its arguments and the environment carrying the credentials.
//! Building one is pure; nothing here touches the process table.

use ll_config::{get_schema, validate, ConfigObject, ValidatedConfig, ValidationError};
use ll_redact::REDACTED;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Program that runs the server.
pub const SERVER_COMMAND: &str = "python";

/// Interface the server binds.
pub const BIND_HOST: &str = "0.0.0.0";

/// Port the server listens on, as passed on its command line.
pub const BIND_PORT: &str = "8000";

/// Arguments passed to [`SERVER_COMMAND`].
pub const SERVER_ARGS: [&str; 7] = [
    "-m",
    "uvicorn",
    "main:app",
    "--host",
    BIND_HOST,
    "--port",
    BIND_PORT,
];

/// How to start the server process.
///
/// Only [`build`] produces one. `env` is ordered by variable name so two
/// descriptors built from the same configuration compare and serialize
/// identically.
///
/// ```compile_fail
/// let descriptor = ll_core::LaunchDescriptor {
///     command: "python".to_string(),
///     args: Vec::new(),
///     env: Default::default(),
/// };
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct LaunchDescriptor {
    /// Program to execute.
    command: String,
    /// Arguments in order. Never contains configuration values.
    args: Vec<String>,
    /// Environment variables added to the child's environment.
    env: BTreeMap<String, String>,
}

impl LaunchDescriptor {
    #[cfg(test)]
    pub(crate) fn from_parts(command: &str, args: &[&str], env: &[(&str, &str)]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Copy with every environment value replaced by a placeholder.
    pub fn redacted(&self) -> LaunchDescriptor {
        LaunchDescriptor {
            command: self.command.clone(),
            args: self.args.clone(),
            env: self
                .env
                .keys()
                .map(|k| (k.clone(), REDACTED.to_string()))
                .collect(),
        }
    }

    /// Environment variable names in order.
    pub fn env_names(&self) -> impl Iterator<Item = &str> {
        self.env.keys().map(String::as_str)
    }

    /// Command line as a single display string.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Debug for LaunchDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchDescriptor")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("env", &self.redacted().env)
            .finish()
    }
}

/// Build the launch descriptor for a validated configuration.
///
/// Every schema field with an environment binding contributes one variable,
/// bound verbatim to its configured value.
pub fn build(validated: &ValidatedConfig<'_>) -> LaunchDescriptor {
    let config = validated.config();
    let env = validated
        .schema()
        .env_bindings()
        .filter_map(|(field, var)| {
            config
                .get(field.name())
                .map(|value| (var.to_string(), value.to_string()))
        })
        .collect();

    LaunchDescriptor {
        command: SERVER_COMMAND.to_string(),
        args: SERVER_ARGS.iter().map(|a| a.to_string()).collect(),
        env,
    }
}

/// Validate `config` against the launcher schema and build its descriptor.
pub fn prepare(config: &ConfigObject) -> Result<LaunchDescriptor, ValidationError> {
    let validated = validate(config, get_schema())?;
    Ok(build(&validated))
}
