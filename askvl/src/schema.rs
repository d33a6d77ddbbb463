//! Event-report schema descriptor.
//!
//! Describes a reply of the form
//! `{"events": [{"event_code": .., "detected": .., "explanation": ..}]}`.
//! The default request does not send it; it is only attached when schema
//! mode is requested explicitly.

use serde_json::{Value, json};

use crate::chat::ResponseFormat;

/// Name under which the schema is sent.
pub const EVENT_REPORT_SCHEMA_NAME: &str = "event_report";

/// JSON Schema for an event report.
#[must_use]
pub fn event_report_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "events": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "event_code": {"type": "string"},
                        "detected": {"type": "boolean"},
                        "explanation": {"type": "string"}
                    },
                    "required": ["event_code", "detected", "explanation"]
                }
            }
        },
        "required": ["events"]
    })
}

/// Schema-constrained response format for an event report.
#[must_use]
pub fn event_report_format() -> ResponseFormat {
    ResponseFormat::json_schema(EVENT_REPORT_SCHEMA_NAME, event_report_schema())
}
