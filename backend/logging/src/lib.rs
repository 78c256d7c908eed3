//! Telemetry and structured logging components for CropGuard.
//!
//! Handles log redaction, console and rolling NDJSON output, and analysis
//! lifecycle event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, SessionEvent, SessionEventLogger};
pub use logger::{init_logger, LoggerOptions};
pub use redact::redact_sensitive_data;
