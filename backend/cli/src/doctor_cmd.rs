//! CLI Doctor Command
//!
//! Checks that a config file loads and that a Gemini API key can be found.

use std::path::Path;

use anyhow::Result;

use cropguard_config::{
    collect_referenced_vars, load_config, resolve_env_vars, validate, CropGuardConfig,
    API_KEY_ENV_VARS,
};

use crate::terminal_output::{note_error, note_success, note_warn};

/// Executes the full doctor diagnosis. Returns whether every check passed.
pub async fn run(config_path: &Path) -> Result<bool> {
    println!("\n🔍 Running CropGuard Doctor...\n");

    let config = check_config(config_path).await;
    let is_ok = match &config {
        Some(config) => check_api_key(config),
        None => false,
    };

    println!();
    if is_ok {
        note_success("All checks passed! CropGuard is ready.");
    } else {
        note_error("Some checks failed! Please fix the errors above.");
    }
    Ok(is_ok)
}

async fn check_config(path: &Path) -> Option<CropGuardConfig> {
    println!("Checking Config ({}):", path.display());
    if !path.exists() {
        println!("  🟡 No config file (defaults apply)");
    }

    let raw = match load_config(path).await {
        Ok(raw) => raw,
        Err(e) => {
            println!("  🔴 {e:#}");
            return None;
        }
    };

    let value = match serde_json::to_value(&raw) {
        Ok(value) => value,
        Err(e) => {
            println!("  🔴 {e}");
            return None;
        }
    };
    for var in unset_env_refs(&value, |name| std::env::var(name).ok()) {
        println!("  🔴 ${{{var}}} is referenced but not set");
    }

    let resolved = resolve_env_vars(&value)
        .and_then(|v| Ok(serde_json::from_value::<CropGuardConfig>(v)?));
    let config = match resolved {
        Ok(config) => config,
        Err(e) => {
            println!("  🔴 {e:#}");
            return None;
        }
    };

    let report = validate(&config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        println!("  🔴 {}: {}", error.path, error.message);
    }
    if !report.is_valid() {
        return None;
    }

    println!("  🟢 Config is valid");
    Some(config)
}

/// `${VAR}` references in the config whose variable is unset or empty.
fn unset_env_refs(value: &serde_json::Value, env: impl Fn(&str) -> Option<String>) -> Vec<String> {
    collect_referenced_vars(value)
        .into_iter()
        .filter(|var| env(var).map_or(true, |v| v.is_empty()))
        .collect()
}

fn check_api_key(config: &CropGuardConfig) -> bool {
    println!("Checking Gemini API Key:");

    let from_config = config
        .gemini
        .as_ref()
        .and_then(|g| g.api_key.as_deref())
        .is_some_and(|k| !k.is_empty());
    if from_config {
        println!("  🟢 gemini.apiKey is set in config");
        return true;
    }

    for var in API_KEY_ENV_VARS {
        if std::env::var(var).is_ok_and(|v| !v.is_empty()) {
            println!("  🟢 {var} is set");
            return true;
        }
    }

    println!(
        "  🔴 No API key (set gemini.apiKey or one of {})",
        API_KEY_ENV_VARS.join(", ")
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropguard_config::config_file_path;

    #[tokio::test]
    async fn invalid_config_fails_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "server:\n  port: 0\n").unwrap();
        assert!(check_config(&path).await.is_none());
    }

    #[test]
    fn reports_only_unset_references() {
        let value = serde_json::json!({
            "gemini": { "apiKey": "${GEMINI_API_KEY}", "baseUrl": "${PROXY_URL}" }
        });
        let env = |name: &str| (name == "PROXY_URL").then(|| "http://proxy".to_string());
        assert_eq!(unset_env_refs(&value, env), vec!["GEMINI_API_KEY".to_string()]);
    }

    #[tokio::test]
    async fn config_key_passes_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "gemini:\n  apiKey: AIzaTestKey\n").unwrap();
        let config = check_config(&path).await.unwrap();
        assert!(check_api_key(&config));
    }
}
