//! Analysis Event Logger
//!
//! Session lifecycle events (submit, completion, failure, stale discard, reset)
//! written through `tracing` on the `analysis_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Submitted {
        seq: u64,
        mime_type: String,
        payload_len: usize,
    },
    Completed {
        seq: u64,
        is_plant: bool,
        condition: String,
        confidence: f64,
    },
    Failed {
        seq: u64,
        error_msg: String,
    },
    /// A completion arrived after a newer submit or reset.
    Discarded {
        seq: u64,
        latest: u64,
    },
    Reset {
        seq: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

pub struct SessionEventLogger;

impl SessionEventLogger {
    /// Build the redacted entry that `log_event` writes.
    pub fn entry(session_id: Uuid, mut event: SessionEvent) -> EventLogEntry {
        if let SessionEvent::Failed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        EventLogEntry {
            session_id,
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(session_id: Uuid, event: SessionEvent) {
        let entry = Self::entry(session_id, event);
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "analysis_events", event = %json, "Analysis event"),
            Err(_) => info!(target: "analysis_events", event = ?entry, "Analysis event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_redacted() {
        let entry = SessionEventLogger::entry(
            Uuid::new_v4(),
            SessionEvent::Failed {
                seq: 3,
                error_msg: "transport error for ?key=abc123".into(),
            },
        );
        let SessionEvent::Failed { error_msg, .. } = &entry.event else {
            panic!("expected failure event");
        };
        assert!(!error_msg.contains("abc123"));
    }

    #[test]
    fn serializes_with_type_tag() {
        let entry = SessionEventLogger::entry(Uuid::nil(), SessionEvent::Reset { seq: 7 });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "reset");
        assert_eq!(json["event"]["seq"], 7);
    }
}
