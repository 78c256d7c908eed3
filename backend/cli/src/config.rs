//! Runtime wiring: turns a prepared `CropGuardConfig` into the analyzer,
//! encoder and logger options the commands run with.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use cropguard_config::{defaults, CropGuardConfig};
use cropguard_core::Analyzer;
use cropguard_logging::LoggerOptions;
use cropguard_media::{ImageEncoder, UploadPolicy};
use cropguard_understanding::{sample_diseased_tomato, GeminiAnalyzer, MockAnalyzer};

/// Build the analyzer the session will call.
pub fn build_analyzer(config: &CropGuardConfig, mock: bool) -> Result<Arc<dyn Analyzer>> {
    if mock {
        tracing::info!("Using mock analyzer");
        return Ok(Arc::new(MockAnalyzer::with_result(sample_diseased_tomato())));
    }

    let api_key = config
        .api_key()
        .context("No Gemini API key: set gemini.apiKey in config, or GEMINI_API_KEY / API_KEY")?;
    let gemini = config.gemini.clone().unwrap_or_default();

    let mut analyzer = GeminiAnalyzer::new(api_key)
        .with_model(gemini.model.unwrap_or_else(|| defaults::DEFAULT_MODEL.to_string()))
        .with_base_url(gemini.base_url.unwrap_or_else(|| defaults::DEFAULT_BASE_URL.to_string()));
    if let Some(secs) = gemini.timeout_secs {
        analyzer = analyzer.with_timeout(Duration::from_secs(secs))?;
    }

    tracing::info!(model = %analyzer.model(), "Using Gemini analyzer");
    Ok(Arc::new(analyzer))
}

pub fn build_encoder(config: &CropGuardConfig) -> ImageEncoder {
    let upload = config.upload.clone().unwrap_or_default();
    ImageEncoder::new(UploadPolicy {
        max_bytes: upload.max_bytes.unwrap_or(defaults::DEFAULT_MAX_UPLOAD_BYTES),
        enforce: upload.enforce_limit.unwrap_or(false),
    })
}

/// Logger options from config. `console` is false for the full-screen UI.
pub fn logger_options(config: &CropGuardConfig, console: bool) -> LoggerOptions {
    let logging = config.logging.clone().unwrap_or_default();
    LoggerOptions {
        level: logging
            .level
            .unwrap_or_else(|| defaults::DEFAULT_LOG_LEVEL.to_string()),
        json: logging.json.unwrap_or(false),
        console,
        dir: logging.dir.map(PathBuf::from),
    }
}

/// `bind:port` for the HTTP API; `port_override` comes from `--port`.
pub fn server_addr(config: &CropGuardConfig, port_override: Option<u16>) -> String {
    let server = config.server.clone().unwrap_or_default();
    let bind = server.bind.unwrap_or_else(|| defaults::DEFAULT_BIND.to_string());
    let port = port_override
        .or(server.port)
        .unwrap_or(defaults::DEFAULT_PORT);
    format!("{bind}:{port}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropguard_config::{ServerConfig, UploadConfig};

    #[test]
    fn encoder_policy_follows_upload_section() {
        let config = CropGuardConfig {
            upload: Some(UploadConfig {
                max_bytes: Some(1024),
                enforce_limit: Some(true),
            }),
            ..Default::default()
        };
        let policy = build_encoder(&config).policy();
        assert_eq!(policy.max_bytes, 1024);
        assert!(policy.enforce);

        let policy = build_encoder(&CropGuardConfig::default()).policy();
        assert_eq!(policy.max_bytes, defaults::DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!policy.enforce);
    }

    #[test]
    fn port_flag_overrides_config() {
        let config = CropGuardConfig {
            server: Some(ServerConfig {
                bind: Some("0.0.0.0".into()),
                port: Some(9000),
            }),
            ..Default::default()
        };
        assert_eq!(server_addr(&config, None), "0.0.0.0:9000");
        assert_eq!(server_addr(&config, Some(3000)), "0.0.0.0:3000");
        assert_eq!(server_addr(&CropGuardConfig::default(), None), "127.0.0.1:8080");
    }

    #[test]
    fn mock_needs_no_key() {
        let analyzer = build_analyzer(&CropGuardConfig::default(), true).unwrap();
        assert_eq!(analyzer.name(), "mock");
    }

    #[test]
    fn logger_defaults_to_info() {
        let opts = logger_options(&CropGuardConfig::default(), false);
        assert_eq!(opts.level, "info");
        assert!(!opts.console);
        assert!(opts.dir.is_none());
    }
}
