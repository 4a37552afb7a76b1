//! Spawning the server described by a [`LaunchDescriptor`].
//!
//! The child inherits the parent environment with the descriptor's variables
//! layered on top. stderr is always inherited so server diagnostics reach
//! the host.

use crate::descriptor::LaunchDescriptor;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use thiserror::Error;

/// Errors starting or waiting on the server process.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait on pid {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}

/// How the child's stdin and stdout are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// The child talks to the host over the launcher's own streams.
    #[default]
    Inherit,
    /// The caller receives pipe handles for stdin and stdout.
    Piped,
}

impl StdioMode {
    fn stdio(self) -> Stdio {
        match self {
            StdioMode::Inherit => Stdio::inherit(),
            StdioMode::Piped => Stdio::piped(),
        }
    }
}

/// Starts the server process for a descriptor. Consumed by [`Launcher::spawn`].
#[derive(Debug)]
pub struct Launcher {
    descriptor: LaunchDescriptor,
    stdio: StdioMode,
}

impl Launcher {
    pub fn new(descriptor: LaunchDescriptor) -> Self {
        Self {
            descriptor,
            stdio: StdioMode::default(),
        }
    }

    pub fn stdio(mut self, mode: StdioMode) -> Self {
        self.stdio = mode;
        self
    }

    pub fn descriptor(&self) -> &LaunchDescriptor {
        &self.descriptor
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.descriptor.command());
        cmd.args(self.descriptor.args())
            .envs(self.descriptor.env())
            .stdin(self.stdio.stdio())
            .stdout(self.stdio.stdio())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Spawn the server.
    pub fn spawn(self) -> Result<LaunchedChild, LaunchError> {
        let child = self.command().spawn().map_err(|source| LaunchError::Spawn {
            command: self.descriptor.command().to_string(),
            source,
        })?;

        tracing::debug!(
            pid = child.id(),
            command = %crate::logging::redactor()
                .redact_command(self.descriptor.command(), self.descriptor.args()),
            env_names = ?self.descriptor.env_names().collect::<Vec<_>>(),
            "server process spawned"
        );

        Ok(LaunchedChild { child })
    }
}

/// A running server process.
#[derive(Debug)]
pub struct LaunchedChild {
    child: Child,
}

impl LaunchedChild {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// The child's stdin in [`StdioMode::Piped`]; `None` otherwise or once taken.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// The child's stdout in [`StdioMode::Piped`]; `None` otherwise or once taken.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Block until the server exits.
    pub fn wait(&mut self) -> Result<ExitStatus, LaunchError> {
        let pid = self.child.id();
        self.child
            .wait()
            .map_err(|source| LaunchError::Wait { pid, source })
    }
}

/// Process exit code to forward for a child's status.
///
/// A child killed by a signal maps to `128 + signal`, as shells report it.
pub fn forwarded_exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
