//! In-memory log capture for tests.
//!
//! [`capture`] installs a thread-local subscriber that records every event
//! with its level, message and fields, so tests can assert on what the
//! pipeline logged without parsing formatted output.
//!
//! # Example
//!
//! ```
//! use roster_telemetry::capture::capture;
//! use tracing::Level;
//!
//! let (logs, _guard) = capture();
//! tracing::warn!(reason = "invalid_token", "Invalid token: nope");
//!
//! let warnings = logs.at(Level::WARN);
//! assert_eq!(warnings[0].message, "Invalid token: nope");
//! assert_eq!(warnings[0].field("reason"), Some("invalid_token"));
//! ```
//!
//! The subscriber is scoped to the current thread, so use it with a
//! current-thread runtime (the `#[tokio::test]` default).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Formatted message.
    pub message: String,
    /// Every other field, rendered with `Debug` (strings unquoted).
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Returns the rendered value of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Shared handle to the captured events; also the recording [`Layer`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedLogs {
    /// Returns all events recorded so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the events recorded at `level`.
    #[must_use]
    pub fn at(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Returns the events whose `name` field equals `value`.
    #[must_use]
    pub fn with_field(&self, name: &str, value: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.field(name) == Some(value))
            .collect()
    }

    /// Discards everything recorded so far.
    pub fn clear(&self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
                fields: visitor.fields,
            });
    }
}

/// Installs a capturing subscriber for the current thread.
///
/// Capture stops when the returned guard is dropped.
#[must_use]
pub fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
