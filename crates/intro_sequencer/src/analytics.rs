// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session analytics and the error log.
//!
//! Everything here is append-only and observational: recording never fails
//! and never feeds back into sequencing decisions.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Ordered event payload
pub type Payload = IndexMap<String, serde_json::Value>;

/// Build a payload from `(key, value)` pairs
pub fn payload<'a, I>(fields: I) -> Payload
where
    I: IntoIterator<Item = (&'a str, serde_json::Value)>,
{
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(millis(*value))
}

/// Whole milliseconds in `value`, saturating
pub fn millis(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}

/// A page becoming visible
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Page index
    pub page_index: usize,
    /// When the page was shown (session time)
    #[serde(rename = "timestamp_ms", serialize_with = "serialize_millis")]
    pub timestamp: Duration,
    /// How long it stayed current; zero until known
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

/// A named analytics event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceEvent {
    /// Event name
    pub name: String,
    /// When it was recorded (session time)
    #[serde(rename = "timestamp_ms", serialize_with = "serialize_millis")]
    pub timestamp: Duration,
    /// Event data
    pub payload: Payload,
}

/// A captured runtime fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// Fault message
    pub message: String,
    /// `file:line` where it was reported, if known
    pub location: Option<String>,
    /// Wall-clock time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl ErrorRecord {
    /// Create a record stamped with the current wall-clock time
    pub fn new(message: impl Into<String>, location: Option<String>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(millis)
            .unwrap_or_default();
        Self {
            message: message.into(),
            location,
            timestamp_ms,
        }
    }
}

/// Shared append-only error log
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    records: Arc<Mutex<Vec<ErrorRecord>>>,
}

impl ErrorLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&self, record: ErrorRecord) {
        self.records.lock().push(record);
    }

    /// Snapshot of all records
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.records.lock().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// A `tracing_subscriber::Layer` that appends every ERROR event to an
/// [`ErrorLog`].
pub struct ErrorCapture {
    log: ErrorLog,
}

impl ErrorCapture {
    /// Create a capture layer writing into `log`
    pub fn new(log: ErrorLog) -> Self {
        Self { log }
    }
}

impl<S> tracing_subscriber::Layer<S> for ErrorCapture
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let meta = event.metadata();
        if *meta.level() != tracing::Level::ERROR {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let location = match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => Some(format!("{file}:{line}")),
            (Some(file), None) => Some(file.to_string()),
            _ => None,
        };
        self.log.push(ErrorRecord::new(visitor.message, location));
    }
}

/// Visitor that flattens the fields of a tracing event into one line.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn append(&mut self, name: &str, value: String) {
        if name == "message" {
            if self.message.is_empty() {
                self.message = value;
            } else {
                self.message = format!("{value}, {}", self.message);
            }
        } else if self.message.is_empty() {
            self.message = format!("{name} = {value}");
        } else {
            self.message.push_str(&format!(", {name} = {value}"));
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.append(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.append(field.name(), value.to_string());
    }
}

/// Append-only recorder of page views and events
#[derive(Debug)]
pub struct AnalyticsRecorder {
    session_id: Uuid,
    enabled: bool,
    events: Vec<SequenceEvent>,
    page_views: Vec<PageView>,
    interactions: u32,
    errors: ErrorLog,
}

impl AnalyticsRecorder {
    /// Create a recorder; when `enabled` is false events are dropped
    pub fn new(enabled: bool) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            enabled,
            events: Vec::new(),
            page_views: Vec::new(),
            interactions: 0,
            errors: ErrorLog::new(),
        }
    }

    /// Share an existing error log instead of a private one
    pub fn with_error_log(mut self, errors: ErrorLog) -> Self {
        self.errors = errors;
        self
    }

    /// Session identifier
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Append an event stamped `at`
    pub fn record(&mut self, name: &str, payload: Payload, at: Duration) {
        if !self.enabled {
            return;
        }

        tracing::info!(
            target: "intro_sequencer::analytics",
            event = name,
            at_ms = millis(at),
            payload = %serde_json::Value::Object(payload.clone().into_iter().collect()),
            "Analytics event"
        );
        self.events.push(SequenceEvent {
            name: name.to_string(),
            timestamp: at,
            payload,
        });
    }

    /// Record that `page_index` became visible at `at`.
    ///
    /// The previous view's duration is filled in from this timestamp.
    pub fn page_view(&mut self, page_index: usize, at: Duration) {
        self.close_page_view(at);
        self.page_views.push(PageView {
            page_index,
            timestamp: at,
            duration: Duration::ZERO,
        });
    }

    /// Fill in the duration of the last open page view
    pub fn close_page_view(&mut self, at: Duration) {
        if let Some(last) = self.page_views.last_mut() {
            if last.duration.is_zero() {
                last.duration = at.saturating_sub(last.timestamp);
            }
        }
    }

    /// Count a user interaction
    pub fn interaction(&mut self) {
        self.interactions += 1;
    }

    /// Number of counted interactions
    pub fn interactions(&self) -> u32 {
        self.interactions
    }

    /// Recorded events
    pub fn events(&self) -> &[SequenceEvent] {
        &self.events
    }

    /// Events named `name`
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SequenceEvent> {
        self.events.iter().filter(move |event| event.name == name)
    }

    /// Recorded page views
    pub fn page_views(&self) -> &[PageView] {
        &self.page_views
    }

    /// The shared error log
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Snapshot of the whole session at `now`
    pub fn report(&self, now: Duration) -> SessionReport {
        SessionReport {
            session_id: self.session_id,
            duration: now,
            interactions: self.interactions,
            page_views: self.page_views.clone(),
            events: self.events.clone(),
            errors: self.errors.records(),
        }
    }
}

/// Serializable summary of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Session identifier
    pub session_id: Uuid,
    /// Session length
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Counted interactions
    pub interactions: u32,
    /// Page views in order
    pub page_views: Vec<PageView>,
    /// Events in order
    pub events: Vec<SequenceEvent>,
    /// Captured faults
    pub errors: Vec<ErrorRecord>,
}

impl SessionReport {
    /// Render as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_record_appends_in_order() {
        let mut analytics = AnalyticsRecorder::new(true);
        analytics.record("intro_started", Payload::new(), ms(0));
        analytics.record("page_view", payload([("page", json!(0))]), ms(800));

        let names: Vec<_> = analytics.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["intro_started", "page_view"]);
        assert_eq!(analytics.events()[1].payload["page"], json!(0));
        assert_eq!(analytics.events()[1].timestamp, ms(800));
    }

    #[test]
    fn test_disabled_recorder_drops_events() {
        let mut analytics = AnalyticsRecorder::new(false);
        analytics.record("intro_started", Payload::new(), ms(0));
        analytics.page_view(0, ms(10));

        assert!(analytics.events().is_empty());
        assert_eq!(analytics.page_views().len(), 1);
    }

    #[test]
    fn test_page_view_durations_backfilled() {
        let mut analytics = AnalyticsRecorder::new(true);
        analytics.page_view(0, ms(800));
        analytics.page_view(1, ms(3300));
        analytics.close_page_view(ms(5000));

        let views = analytics.page_views();
        assert_eq!(views[0].duration, ms(2500));
        assert_eq!(views[1].duration, ms(1700));
    }

    #[test]
    fn test_report_serializes_millis() {
        let mut analytics = AnalyticsRecorder::new(true);
        analytics.interaction();
        analytics.page_view(0, ms(800));
        analytics.record("page_view", payload([("page", json!(0))]), ms(800));

        let report = analytics.report(ms(1500));
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["duration_ms"], json!(1500));
        assert_eq!(value["interactions"], json!(1));
        assert_eq!(value["page_views"][0]["timestamp_ms"], json!(800));
        assert_eq!(value["events"][0]["payload"]["page"], json!(0));
    }

    #[test]
    fn test_error_capture_layer() {
        let log = ErrorLog::new();
        let subscriber = tracing_subscriber::registry().with(ErrorCapture::new(log.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("not captured");
            tracing::error!(step = 3, "effect dispatch panicked");
        });

        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "effect dispatch panicked, step = 3");
        assert!(records[0].location.as_deref().unwrap().contains("analytics.rs"));
    }
}
