//! Event vocabulary and per-run correlation.
//!
//! Event names double as tracing targets, so the JSONL layer can copy them
//! into the `event` key without a lookup.

use serde::{Deserialize, Serialize};

/// Phase of one invocation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    /// Locating and parsing the configuration object.
    Config,
    Validate,
    /// Producing the launch descriptor.
    Build,
    /// Spawning and waiting on the server.
    Launch,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Config => "config",
            Stage::Validate => "validate",
            Stage::Build => "build",
            Stage::Launch => "launch",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";
    pub const CONFIG_VALIDATED: &str = "config.validated";
    pub const CONFIG_MISSING_FIELD: &str = "config.missing_field";

    pub const DESCRIPTOR_BUILT: &str = "descriptor.built";

    pub const LAUNCH_SPAWNED: &str = "launch.spawned";
    pub const LAUNCH_EXITED: &str = "launch.exited";
    pub const LAUNCH_FAILED: &str = "launch.failed";

    pub const OUTPUT_FAILED: &str = "output.failed";
}

/// Ids stamped on every event of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub run_id: String,
    pub host_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            host_id: host_id.into(),
        }
    }

    /// Fresh run id on this machine's host id.
    pub fn for_this_run() -> Self {
        Self::new(new_run_id(), host_id())
    }
}

/// `run-` followed by 12 hex chars of a v4 uuid.
pub fn new_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}

/// `host-` followed by 8 hex chars of `/etc/machine-id`, or of a random uuid
/// where there is none.
pub fn host_id() -> String {
    let from_machine = std::fs::read_to_string("/etc/machine-id")
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| id.len() >= 8 && id.is_ascii());
    let source = from_machine.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    format!("host-{}", &source[..8])
}
