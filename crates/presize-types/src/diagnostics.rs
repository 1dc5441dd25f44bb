//! Diagnostic event sinks.
//!
//! The catalog normalizer and the size engine report what they decided
//! through an [`EventSink`] handed to them at construction. Nothing in the
//! estimation path writes to process-wide state, so tests can capture the
//! events with a [`MemorySink`].

use std::sync::{Mutex, PoisonError};

use derive_more::{Display, From};

/// A single field value attached to a diagnostic event.
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum FieldValue {
    /// Text.
    #[display("{_0}")]
    Str(String),
    /// Unsigned integer.
    #[display("{_0}")]
    U64(u64),
    /// Floating point number.
    #[display("{_0}")]
    F64(f64),
    /// Flag.
    #[display("{_0}")]
    Bool(bool),
    /// Field not reported.
    #[display("none")]
    #[from(ignore)]
    Missing,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::U64(u64::from(value))
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        Self::U64(value as u64)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Receives diagnostic events.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Records an event with its fields.
    fn record(&self, event: &str, fields: &[(&str, FieldValue)]);
}

/// Events logged at warn level by [`TracingSink`].
const WARN_EVENTS: &[&str] = &["undeterminable", "descriptor_unusable", "fetch_failed"];

/// Forwards events to `tracing` under the `presize` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &str, fields: &[(&str, FieldValue)]) {
        let rendered = render_fields(fields);
        if WARN_EVENTS.contains(&event) {
            tracing::warn!(target: "presize", event, "{rendered}");
        } else {
            tracing::debug!(target: "presize", event, "{rendered}");
        }
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &str, _fields: &[(&str, FieldValue)]) {}
}

/// An event captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Event name.
    pub name: String,
    /// Fields in the order they were recorded.
    pub fields: Vec<(String, FieldValue)>,
}

impl RecordedEvent {
    /// Returns the value of a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the names of recorded events in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|event| event.name.clone())
            .collect()
    }

    /// Returns the first event with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|event| event.name == name)
            .cloned()
    }

    /// Returns how many events with the given name were recorded.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| event.name == name)
            .count()
    }

    /// Removes every recorded event.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &str, fields: &[(&str, FieldValue)]) {
        let recorded = RecordedEvent {
            name: event.to_string(),
            fields: fields
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
    }
}

/// Renders fields as `key=value` pairs separated by spaces.
fn render_fields(fields: &[(&str, FieldValue)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
