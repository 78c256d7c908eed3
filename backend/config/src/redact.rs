//! Config redaction: safe-to-print config snapshots with secrets masked.

use serde_json::Value;

const SENSITIVE_KEYS: &[&str] = &["apiKey", "api_key", "token", "secret", "password"];

/// Replace sensitive string fields with a short hint (`AIza***`).
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        // Unresolved `${VAR}` references are not secrets.
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() && !s.starts_with("${") => {
            let hint: String = s.chars().take(4).collect();
            if s.chars().count() > 4 {
                Value::String(format!("{hint}***"))
            } else {
                Value::String("***".to_string())
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Dotted paths of every field `redact` would mask.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    fn visit(value: &Value, key: &str, path: &str, out: &mut Vec<String>) {
        match value {
            Value::String(s) if is_sensitive_key(key) && !s.is_empty() && !s.starts_with("${") => {
                out.push(path.to_string())
            }
            Value::Object(map) => {
                for (k, v) in map {
                    let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                    visit(v, k, &child, out);
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    visit(value, "", "", &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_key_with_hint() {
        let v = json!({"gemini": {"apiKey": "AIzaSyExampleKey", "model": "gemini-2.5-flash"}});
        let r = redact(&v);
        assert_eq!(r["gemini"]["apiKey"], "AIza***");
        assert_eq!(r["gemini"]["model"], "gemini-2.5-flash");
    }

    #[test]
    fn keeps_env_references_visible() {
        let v = json!({"gemini": {"apiKey": "${GEMINI_API_KEY}"}});
        assert_eq!(redact(&v), v);
        assert!(collect_redacted_paths(&v).is_empty());
    }

    #[test]
    fn short_secret_fully_masked() {
        let v = json!({"password": "abc"});
        assert_eq!(redact(&v)["password"], "***");
        assert_eq!(collect_redacted_paths(&v), vec!["password".to_string()]);
    }
}
