//! Structured logging for linkedin-launch.
//!
//! Two output shapes on stderr: human lines from `tracing_subscriber::fmt`
//! for interactive use, and JSONL ([`JsonlLayer`]) for hosts that collect
//! launcher diagnostics. JSONL runs every field through the redactor by
//! class; human lines only have registered secrets cut out
//! ([`ScrubbingWriter`]). stdout is never written by logging; it belongs to
//! command payloads and, under `run`, to the server's stdio.
//!
//! ```ignore
//! use ll_core::log_event;
//! use ll_core::logging::{event_names, init_logging, LogConfig, LogContext, Stage};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let ctx = LogContext::for_this_run();
//! log_event!(ctx, INFO, event_names::CONFIG_LOADED, Stage::Config, "configuration loaded", keys = 4);
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, host_id, new_run_id, LogContext, Stage};
pub use layer::JsonlLayer;

use ll_redact::{HashKey, Redactor};
use std::io::{self, IsTerminal, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static REDACTOR: OnceLock<Redactor> = OnceLock::new();

/// Process-wide redactor behind the JSONL layer.
pub fn redactor() -> &'static Redactor {
    REDACTOR.get_or_init(|| {
        // Without OS randomness fingerprints fall back to a fixed key.
        Redactor::new().unwrap_or_else(|_| Redactor::with_key(HashKey::fixed([0u8; 32], "k0")))
    })
}

/// Scrub these values from every log line written from now on.
pub fn register_secrets<'a>(values: impl IntoIterator<Item = &'a str>) {
    let redactor = redactor();
    values
        .into_iter()
        .for_each(|value| redactor.register_secret(value));
}

/// Filter for the launcher's crates at `config.level`. Raw `RUST_LOG`
/// directives are used only when they are what decided the level.
fn filter_for(config: &LogConfig) -> EnvFilter {
    let level = config.level;
    config
        .directives
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(format!("ll_core={level},ll_config={level},{level}")))
}

/// `MakeWriter` cutting registered secrets out of each formatted line.
#[derive(Debug, Clone, Copy)]
pub struct ScrubbingWriter<M = fn() -> io::Stderr> {
    inner: M,
}

impl ScrubbingWriter {
    pub fn stderr() -> Self {
        Self::new(io::stderr)
    }
}

impl<M> ScrubbingWriter<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for ScrubbingWriter<M> {
    type Writer = Scrubbed<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        Scrubbed(self.inner.make_writer())
    }
}

pub struct Scrubbed<W>(W);

impl<W: Write> Write for Scrubbed<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = String::from_utf8_lossy(buf);
        self.0.write_all(redactor().scrub_known(&line).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_logging(config: &LogConfig) -> bool {
    let registry = tracing_subscriber::registry().with(filter_for(config));

    let installed = match (config.format, config.timestamps) {
        (LogFormat::Jsonl, _) => registry.with(JsonlLayer::stderr()).try_init(),
        (LogFormat::Human, timestamps) => {
            let human = fmt::layer()
                .with_writer(ScrubbingWriter::stderr())
                .with_target(false)
                .with_ansi(io::stderr().is_terminal());
            if timestamps {
                registry.with(human).try_init()
            } else {
                registry.with(human.without_time()).try_init()
            }
        }
    };
    installed.is_ok()
}

/// Emit a tracing event stamped with a [`LogContext`] and [`Stage`].
///
/// The level is one of `TRACE`, `DEBUG`, `INFO`, `WARN`, `ERROR`. Extra
/// `key = value` fields follow the message.
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::LAUNCH_SPAWNED, Stage::Launch, "server started", pid = 1234);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, $level:ident, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        ::tracing::event!(
            target: $event,
            ::tracing::Level::$level,
            run_id = %$ctx.run_id,
            host_id = %$ctx.host_id,
            stage = %$stage,
            message = $msg,
            $($key = $val,)*
        )
    };
}
