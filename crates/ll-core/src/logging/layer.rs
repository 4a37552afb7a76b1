//! JSONL tracing layer.
//!
//! One JSON object per event, written to stderr:
//!
//! ```text
//! {"ts":"...","level":"info","event":"config.loaded","run_id":"run-...","host_id":"host-...",
//!  "stage":"config","message":"configuration loaded","fields":{"source":"CLI argument","keys":4}}
//! ```
//!
//! `run_id`, `host_id` and `stage` are lifted out of `fields`, from the event
//! itself or else from the nearest enclosing span that carries them. Every
//! string passes through the process redactor before it is written.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use ll_redact::{FieldClass, Redactor};
use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::redactor;

/// Correlation keys found on an event or span.
#[derive(Debug, Clone, Default)]
struct Correlation {
    run_id: Option<String>,
    host_id: Option<String>,
    stage: Option<String>,
}

impl Correlation {
    /// Store `value` if `key` is a correlation key. Returns whether it was.
    fn absorb(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "run_id" => &mut self.run_id,
            "host_id" => &mut self.host_id,
            "stage" => &mut self.stage,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Fill gaps from an enclosing span.
    fn inherit(&mut self, outer: &Correlation) {
        for (mine, theirs) in [
            (&mut self.run_id, &outer.run_id),
            (&mut self.host_id, &outer.host_id),
            (&mut self.stage, &outer.stage),
        ] {
            if mine.is_none() {
                mine.clone_from(theirs);
            }
        }
    }

    fn write_into(self, line: &mut Map<String, Value>) {
        for (key, value) in [
            ("run_id", self.run_id),
            ("host_id", self.host_id),
            ("stage", self.stage),
        ] {
            if let Some(value) = value {
                line.insert(key.to_string(), Value::String(value));
            }
        }
    }
}

struct SpanVisitor(Correlation);

impl Visit for SpanVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.absorb(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.absorb(field.name(), format!("{value:?}"));
    }
}

struct EventVisitor<'r> {
    redactor: &'r Redactor,
    correlation: Correlation,
    message: Option<String>,
    fields: Map<String, Value>,
}

impl<'r> EventVisitor<'r> {
    fn new(redactor: &'r Redactor) -> Self {
        Self {
            redactor,
            correlation: Correlation::default(),
            message: None,
            fields: Map::new(),
        }
    }

    fn text(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = Some(self.redactor.redact(&value, FieldClass::Text).text);
            return;
        }
        if self.correlation.absorb(name, value.clone()) {
            return;
        }
        let class = FieldClass::for_log_field(name);
        let redacted = self.redactor.redact(&value, class).text;
        self.fields.insert(name.to_string(), Value::String(redacted));
    }

    fn plain(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for EventVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.text(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.text(field.name(), format!("{value:?}"));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.plain(field, json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.plain(field, json!(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.plain(field, json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.plain(field, json!(value));
    }
}

/// Tracing layer writing redacted JSON lines to `W`.
pub struct JsonlLayer<W = io::Stderr> {
    out: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = SpanVisitor(Correlation::default());
        attrs.record(&mut visitor);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.0);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = EventVisitor::new(redactor());
        event.record(&mut visitor);

        let EventVisitor {
            mut correlation,
            message,
            fields,
            ..
        } = visitor;
        for span in ctx.event_scope(event).into_iter().flatten() {
            if let Some(outer) = span.extensions().get::<Correlation>() {
                correlation.inherit(outer);
            }
        }

        let mut line = Map::new();
        line.insert(
            "ts".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        line.insert(
            "level".to_string(),
            json!(meta.level().as_str().to_ascii_lowercase()),
        );
        line.insert("event".to_string(), json!(meta.target()));
        correlation.write_into(&mut line);
        if let Some(message) = message {
            line.insert("message".to_string(), Value::String(message));
        }
        if !fields.is_empty() {
            line.insert("fields".to_string(), Value::Object(fields));
        }

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writeln!(out, "{}", Value::Object(line));
    }
}
