//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional rolling NDJSON files,
//! and environment-based level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Where and how to log.
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit console lines as JSON instead of human-readable text.
    pub json: bool,
    /// Write to stderr. Off for full-screen terminal UIs.
    pub console: bool,
    /// Directory for daily-rotated `cropguard.log.YYYY-MM-DD` files.
    pub dir: Option<PathBuf>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            console: true,
            dir: None,
        }
    }
}

/// Initialize the global structured logger.
///
/// Console output goes to stderr so stdout stays usable for command output.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logger(options: &LoggerOptions) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.level));

    let console_layer = options.console.then(|| {
        if options.json {
            fmt::layer().json().with_writer(std::io::stderr).boxed()
        } else {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(true)
                .boxed()
        }
    });

    let file_layer = options.dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "cropguard.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
