//! `cropguard config show|init`.

use std::path::Path;

use anyhow::{Context, Result};

use cropguard_config::{
    apply_all_defaults, collect_redacted_paths, load_config, redact, write_config, CropGuardConfig,
    API_KEY_ENV_VARS,
};

use crate::terminal_output::{note_info, note_success, note_warn};

/// Print the config file as written, secrets masked.
pub async fn show(path: &Path) -> Result<()> {
    let config = load_config(path).await?;
    print!("{}", render_redacted(&config)?);
    let masked = collect_redacted_paths(&serde_json::to_value(&config)?);
    if !masked.is_empty() {
        note_info(&format!("Masked: {}", masked.join(", ")));
    }
    Ok(())
}

fn render_redacted(config: &CropGuardConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}

/// A starter config with defaults filled in. No `apiKey`: the key falls back
/// to `GEMINI_API_KEY`, then `API_KEY`, at run time.
pub fn starter_config() -> CropGuardConfig {
    apply_all_defaults(CropGuardConfig::default())
}

/// Write a starter config unless one exists (or `force`).
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        note_warn(&format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        ));
        return Ok(());
    }
    write_config(&starter_config(), path).await?;
    note_success(&format!("Wrote {}", path.display()));
    note_info(&format!(
        "Set gemini.apiKey there, or export one of {}",
        API_KEY_ENV_VARS.join(", ")
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropguard_config::{config_file_path, load_and_prepare, GeminiConfig};

    #[tokio::test]
    async fn init_writes_loadable_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        init(&path, false).await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), starter_config());

        std::fs::write(&path, "server:\n  port: 9000\n").unwrap();
        init(&path, false).await.unwrap();
        let kept = load_config(&path).await.unwrap();
        assert_eq!(kept.server.unwrap().port, Some(9000));
    }

    #[tokio::test]
    async fn starter_config_prepares_without_any_key_var() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        init(&path, false).await.unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("${"));

        let config = load_and_prepare(&path).await.unwrap();
        let only_api_key = |name: &str| (name == "API_KEY").then(|| "AIzaFromApiKey".to_string());
        assert_eq!(config.api_key_with(only_api_key).as_deref(), Some("AIzaFromApiKey"));
        assert_eq!(config.api_key_with(|_| None), None);

        let analyzer = crate::config::build_analyzer(&config, true).unwrap();
        assert_eq!(analyzer.name(), "mock");
    }

    #[test]
    fn rendered_config_masks_key() {
        let config = CropGuardConfig {
            gemini: Some(GeminiConfig {
                api_key: Some("AIzaSyRealSecret".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let out = render_redacted(&config).unwrap();
        assert!(out.contains("AIza***"));
        assert!(!out.contains("RealSecret"));
    }
}
