//! Config validation with user-friendly error messages.

use crate::schema::CropGuardConfig;
use thiserror::Error;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &CropGuardConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_gemini(config, &mut report);
    validate_upload(config, &mut report);
    validate_logging(config, &mut report);
    validate_server(config, &mut report);
    report
}

fn validate_gemini(config: &CropGuardConfig, report: &mut ValidationReport) {
    let Some(gemini) = &config.gemini else { return };
    if let Some(model) = &gemini.model {
        if model.trim().is_empty() {
            report.error("gemini.model", "Model name cannot be empty");
        }
    }
    if let Some(url) = &gemini.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error("gemini.baseUrl", format!("'{url}' is not an http(s) URL"));
        } else if url.starts_with("http://") {
            report.warn("gemini.baseUrl", "Plain http sends the API key unencrypted");
        }
    }
    if gemini.timeout_secs == Some(0) {
        report.error("gemini.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_upload(config: &CropGuardConfig, report: &mut ValidationReport) {
    let Some(upload) = &config.upload else { return };
    if upload.max_bytes == Some(0) {
        report.error("upload.maxBytes", "maxBytes must be > 0");
    }
}

fn validate_logging(config: &CropGuardConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else {
        return;
    };
    // Full filter directives like "cropguard=debug,info" pass through untouched.
    if !level.contains('=') && !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown log level '{level}'"));
    }
}

fn validate_server(config: &CropGuardConfig, report: &mut ValidationReport) {
    let Some(server) = &config.server else { return };
    if let Some(port) = server.port {
        if port == 0 {
            report.error("server.port", "port must be > 0");
        } else if port < 1024 && port != 80 && port != 443 {
            report.warn(
                "server.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{GeminiConfig, LoggingConfig, ServerConfig};

    #[test]
    fn defaults_are_valid() {
        let report = validate(&apply_all_defaults(CropGuardConfig::default()));
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn rejects_bad_base_url_and_zero_timeout() {
        let cfg = CropGuardConfig {
            gemini: Some(GeminiConfig {
                base_url: Some("ftp://example".into()),
                timeout_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["gemini.baseUrl", "gemini.timeoutSecs"]);
    }

    #[test]
    fn warns_on_plain_http_and_privileged_port() {
        let cfg = CropGuardConfig {
            gemini: Some(GeminiConfig {
                base_url: Some("http://localhost:9000".into()),
                ..Default::default()
            }),
            server: Some(ServerConfig { port: Some(81), ..Default::default() }),
            logging: Some(LoggingConfig { level: Some("loud".into()), ..Default::default() }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 3);
    }
}
