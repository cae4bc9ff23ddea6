//! Events flowing into and out of the agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SummaryError};

/// A JSON payload with the time it was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub payload: Map<String, Value>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create an event stamped with the current time.
    pub fn new(payload: Map<String, Value>) -> Self {
        Self {
            payload,
            created_at: Utc::now(),
        }
    }

    /// Build an event from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(payload) => Ok(Self::new(payload)),
            other => Err(SummaryError::InvalidEvent(format!(
                "payload must be a JSON object, found {other}"
            ))),
        }
    }

    /// Parse one line of a JSON-lines stream. Each line is a payload object.
    pub fn from_json_line(line: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_payload_lines() {
        let event = Event::from_json_line(r#"{"data": "Text.", "id": 7}"#).unwrap();
        assert_eq!(event.payload["data"], "Text.");
        assert_eq!(event.payload["id"], 7);
    }

    #[test]
    fn rejects_non_object_payloads() {
        for line in ["[1, 2]", "\"text\"", "3"] {
            let err = Event::from_json_line(line).unwrap_err();
            assert!(matches!(err, SummaryError::InvalidEvent(_)), "{line}: {err}");
        }
    }

    #[test]
    fn malformed_lines_are_json_errors() {
        let err = Event::from_json_line("not json").unwrap_err();
        assert!(matches!(err, SummaryError::Json(_)));
    }

    #[test]
    fn envelope_round_trips_with_timestamp() {
        let event = Event::from_value(json!({"summary": "Short."})).unwrap();
        let encoded = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn envelope_without_timestamp_gets_one() {
        let decoded: Event = serde_json::from_str(r#"{"payload": {"a": 1}}"#).unwrap();
        assert_eq!(decoded.payload["a"], 1);
    }
}
