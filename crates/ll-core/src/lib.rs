//! linkedin-launch core library.
//!
//! Turns a validated LinkedIn credential configuration into a
//! [`LaunchDescriptor`] for the LinkedIn MCP server and starts it.
//!
//! ```no_run
//! use ll_config::ConfigObject;
//! use ll_core::{prepare, Launcher};
//!
//! let config = ConfigObject::from_pairs([
//!     ("linkedinClientId", "cid"),
//!     ("linkedinClientSecret", "csec"),
//!     ("linkedinAccessToken", "at"),
//!     ("linkedinRefreshToken", "rt"),
//! ]);
//! let descriptor = prepare(&config).unwrap();
//! let mut child = Launcher::new(descriptor).spawn().unwrap();
//! child.wait().unwrap();
//! ```

pub mod descriptor;
pub mod exit_codes;
pub mod launch;
pub mod logging;
pub mod output;
pub mod schema;

pub use descriptor::{build, prepare, LaunchDescriptor};
pub use exit_codes::ExitCode;
pub use launch::{forwarded_exit_code, LaunchError, LaunchedChild, Launcher, StdioMode};
pub use output::{ErrorReport, OutputFormat, ValidationReport};
