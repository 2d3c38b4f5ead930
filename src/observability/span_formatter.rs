//! Flat JSON line format for finished spans.
//!
//! One span becomes one self-contained JSON object:
//!
//! ```json
//! {"service":"folio","trace_id":"…","span_id":"…","parent_span_id":null,
//!  "name":"add","start":"2024-05-01T10:00:00.000Z","duration_us":1830,
//!  "attributes":{"title":"X","file":"img.png"},"events":[…],"status":"unset"}
//! ```
//!
//! `tracing` events inside a span arrive as span events and keep their fields
//! as attributes, so log lines end up next to the operation that emitted them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Serialize)]
struct SpanRecord<'a> {
    service: &'a str,
    trace_id: String,
    span_id: String,
    parent_span_id: Option<String>,
    name: &'a str,
    start: String,
    duration_us: u128,
    attributes: BTreeMap<String, JsonValue>,
    events: Vec<EventRecord<'a>>,
    status: Cow<'a, str>,
}

#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    name: &'a str,
    at: String,
    attributes: BTreeMap<String, JsonValue>,
}

/// Serializes spans for a given service name.
#[derive(Debug, Clone)]
pub struct SpanFormatter {
    service: String,
}

impl SpanFormatter {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    /// Formats one span as a single JSON line (no trailing newline).
    pub fn format_span(&self, span: &SpanData) -> serde_json::Result<String> {
        let duration_us = span
            .end_time
            .duration_since(span.start_time)
            .map_or(0, |d| d.as_micros());

        let parent_span_id =
            (span.parent_span_id != SpanId::INVALID).then(|| format!("{:016x}", span.parent_span_id));

        let record = SpanRecord {
            service: &self.service,
            trace_id: format!("{:032x}", span.span_context.trace_id()),
            span_id: format!("{:016x}", span.span_context.span_id()),
            parent_span_id,
            name: &span.name,
            start: timestamp(span.start_time),
            duration_us,
            attributes: attributes(&span.attributes),
            events: span
                .events
                .iter()
                .map(|event| EventRecord {
                    name: &event.name,
                    at: timestamp(event.timestamp),
                    attributes: attributes(&event.attributes),
                })
                .collect(),
            status: match &span.status {
                Status::Unset => Cow::Borrowed("unset"),
                Status::Ok => Cow::Borrowed("ok"),
                Status::Error { description } => Cow::Owned(format!("error: {description}")),
            },
        };

        serde_json::to_string(&record)
    }
}

fn timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn attributes(pairs: &[KeyValue]) -> BTreeMap<String, JsonValue> {
    pairs
        .iter()
        .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
        .collect()
}

fn attribute_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::I64(i) => JsonValue::from(*i),
        Value::F64(f) => JsonValue::from(*f),
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Array(array) => JsonValue::String(array.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_values_keep_json_types() {
        let attrs = attributes(&[
            KeyValue::new("project_id", "abc"),
            KeyValue::new("count", 3_i64),
            KeyValue::new("with_image", true),
        ]);

        assert_eq!(attrs["project_id"], JsonValue::String("abc".into()));
        assert_eq!(attrs["count"], JsonValue::from(3));
        assert_eq!(attrs["with_image"], JsonValue::Bool(true));
        assert_eq!(attribute_value(&Value::F64(1.5)), JsonValue::from(1.5));
    }

    #[test]
    fn timestamps_are_rfc3339_utc() {
        let formatted = timestamp(SystemTime::UNIX_EPOCH);
        assert_eq!(formatted, "1970-01-01T00:00:00.000Z");
    }
}
