//! Payloads printed by the CLI and the formats they render in.
//!
//! Reports carry field names, sources and paths. They never carry
//! configuration values.

use crate::exit_codes::ExitCode;
use clap::ValueEnum;
use ll_config::{missing_fields, ConfigSchema, ConfigSource, ResolvedConfig, CONFIG_SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Markdown for humans
    Md,
    /// One line
    Summary,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Json => "json",
            OutputFormat::Md => "md",
            OutputFormat::Summary => "summary",
        })
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Valid,
    Invalid,
}

/// Result of `linkedin-launch validate`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub schema_version: &'static str,
    pub generated_at: String,
    pub status: ReportStatus,
    pub source: String,
    pub path: Option<String>,
    /// Every missing or empty required field, in schema order.
    pub missing_fields: Vec<String>,
    #[serde(skip)]
    source_kind: ConfigSource,
}

impl ValidationReport {
    pub fn new(resolved: &ResolvedConfig, schema: &ConfigSchema) -> Self {
        let missing: Vec<String> = missing_fields(&resolved.object, schema)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            generated_at: now(),
            status: if missing.is_empty() {
                ReportStatus::Valid
            } else {
                ReportStatus::Invalid
            },
            source: resolved.source.to_string(),
            path: resolved.path.as_ref().map(|p| p.display().to_string()),
            missing_fields: missing,
            source_kind: resolved.source,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == ReportStatus::Valid
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_valid() {
            ExitCode::Clean
        } else {
            ExitCode::ConfigInvalid
        }
    }

    fn origin(&self) -> String {
        match (&self.path, self.source_kind) {
            (Some(path), _) => format!("{} ({})", self.source, path),
            (None, ConfigSource::ProcessEnv) => format!("{} (LINKEDIN_*)", self.source),
            (None, _) => self.source.clone(),
        }
    }

    pub fn write(&self, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
        match format {
            OutputFormat::Json => write_json(out, self),
            OutputFormat::Summary if self.is_valid() => writeln!(out, "valid ({})", self.source),
            OutputFormat::Summary => writeln!(
                out,
                "invalid ({}): missing {}",
                self.source,
                self.missing_fields.join(", ")
            ),
            OutputFormat::Md => {
                writeln!(out, "# Configuration check")?;
                writeln!(out)?;
                writeln!(out, "- Source: {}", self.origin())?;
                let status = if self.is_valid() { "valid" } else { "invalid" };
                writeln!(out, "- Status: {status}")?;
                for name in &self.missing_fields {
                    writeln!(out, "- Missing: `{name}`")?;
                }
                Ok(())
            }
        }
    }
}

/// Failure report written to stderr.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub schema_version: &'static str,
    pub generated_at: String,
    pub status: &'static str,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub exit_code: i32,
    pub message: String,
}

impl ErrorReport {
    pub fn new(exit_code: ExitCode, message: impl Into<String>) -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            generated_at: now(),
            status: "error",
            error: ErrorDetail {
                code: exit_code.code_name(),
                exit_code: exit_code.as_i32(),
                message: message.into(),
            },
        }
    }

    pub fn write(&self, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
        match format {
            OutputFormat::Json => write_json(out, self),
            OutputFormat::Summary => writeln!(out, "error: {}", self.error.message),
            OutputFormat::Md => writeln!(out, "# Error\n\n{}", self.error.message),
        }
    }
}
