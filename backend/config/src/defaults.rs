//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{CropGuardConfig, GeminiConfig, LoggingConfig, ServerConfig, UploadConfig};

pub use cropguard_media::DEFAULT_MAX_UPLOAD_BYTES;
pub use cropguard_understanding::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: CropGuardConfig) -> CropGuardConfig {
    let config = apply_gemini_defaults(config);
    let config = apply_upload_defaults(config);
    let config = apply_logging_defaults(config);
    apply_server_defaults(config)
}

fn apply_gemini_defaults(mut config: CropGuardConfig) -> CropGuardConfig {
    let gemini = config.gemini.get_or_insert_with(GeminiConfig::default);
    gemini.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    gemini.base_url.get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    config
}

/// Size limit stays advisory unless the user opts in.
fn apply_upload_defaults(mut config: CropGuardConfig) -> CropGuardConfig {
    let upload = config.upload.get_or_insert_with(UploadConfig::default);
    upload.max_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    upload.enforce_limit.get_or_insert(false);
    config
}

fn apply_logging_defaults(mut config: CropGuardConfig) -> CropGuardConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

fn apply_server_defaults(mut config: CropGuardConfig) -> CropGuardConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_empty_config() {
        let cfg = apply_all_defaults(CropGuardConfig::default());
        let gemini = cfg.gemini.unwrap();
        assert_eq!(gemini.model.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(gemini.base_url.as_deref(), Some(DEFAULT_BASE_URL));
        assert!(gemini.api_key.is_none());
        assert!(gemini.timeout_secs.is_none());

        let upload = cfg.upload.unwrap();
        assert_eq!(upload.max_bytes, Some(DEFAULT_MAX_UPLOAD_BYTES));
        assert_eq!(upload.enforce_limit, Some(false));
        assert_eq!(cfg.server.unwrap().port, Some(DEFAULT_PORT));
    }

    #[test]
    fn defaults_match_encoder_and_analyzer() {
        let cfg = apply_all_defaults(CropGuardConfig::default());
        let analyzer = cropguard_understanding::GeminiAnalyzer::new("AIzaTest");
        assert_eq!(cfg.gemini.unwrap().model.as_deref(), Some(analyzer.model()));
        assert_eq!(
            cfg.upload.unwrap().max_bytes,
            Some(cropguard_media::UploadPolicy::default().max_bytes)
        );
    }

    #[test]
    fn does_not_override_user_values() {
        let cfg = CropGuardConfig {
            gemini: Some(GeminiConfig {
                model: Some("gemini-2.0-flash".into()),
                ..Default::default()
            }),
            logging: Some(LoggingConfig {
                level: Some("debug".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.gemini.unwrap().model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(cfg.logging.unwrap().level.as_deref(), Some("debug"));
    }
}
