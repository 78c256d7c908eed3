use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured diagnosis returned by the remote vision model.
///
/// Every field is required on the wire. A payload missing any of them fails to
/// decode rather than producing a partially populated result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_plant: bool,
    pub plant_name: String,
    /// Disease or pest name, or the healthy marker (`健康`).
    pub condition: String,
    /// Nominally 0-100. Stored exactly as received.
    pub confidence: f64,
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
}

/// Display bucket for the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl AnalysisResult {
    /// Whether the condition names a healthy plant (Chinese or English marker).
    pub fn is_healthy(&self) -> bool {
        self.condition.contains("健康") || self.condition.to_lowercase().contains("healthy")
    }

    /// Confidence rounded and clamped to `0..=100` for display.
    pub fn confidence_percent(&self) -> u8 {
        if !self.confidence.is_finite() {
            return 0;
        }
        self.confidence.clamp(0.0, 100.0).round() as u8
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        if self.confidence > 80.0 {
            ConfidenceTier::High
        } else if self.confidence > 50.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Phase of the single analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Idle,
    /// Never entered; the pre-analysis phase is `Idle`.
    Uploading,
    Analyzing,
    Success,
    Error,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalysisStatus::Idle => "idle",
            AnalysisStatus::Uploading => "uploading",
            AnalysisStatus::Analyzing => "analyzing",
            AnalysisStatus::Success => "success",
            AnalysisStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// The session's UI-facing state tuple.
///
/// `result` is present iff `status` is `Success`; `error` is present iff
/// `status` is `Error`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisState {
    pub status: AnalysisStatus,
    pub image_uri: Option<String>,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl AnalysisState {
    /// The initial `{idle, None, None, None}` tuple.
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn is_initial(&self) -> bool {
        *self == Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tomato() -> AnalysisResult {
        AnalysisResult {
            is_plant: true,
            plant_name: "番茄".into(),
            condition: "早期枯萎病".into(),
            confidence: 92.0,
            description: "...".into(),
            symptoms: vec!["叶片黄化".into()],
            treatment: vec!["喷施杀菌剂".into()],
            prevention: vec!["轮作".into()],
        }
    }

    #[test]
    fn decodes_camel_case_payload() {
        let raw = r#"{"isPlant":true,"plantName":"番茄","condition":"早期枯萎病","confidence":92,
            "description":"...","symptoms":["叶片黄化"],"treatment":["喷施杀菌剂"],"prevention":["轮作"]}"#;
        let parsed: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, tomato());
    }

    #[test]
    fn missing_field_is_rejected() {
        let raw = r#"{"isPlant":true,"plantName":"番茄","condition":"x","description":"",
            "symptoms":[],"treatment":[],"prevention":[]}"#;
        let err = serde_json::from_str::<AnalysisResult>(raw).unwrap_err();
        assert!(err.to_string().contains("confidence"));
    }

    #[test]
    fn healthy_marker_detection() {
        let mut r = tomato();
        assert!(!r.is_healthy());
        r.condition = "健康".into();
        assert!(r.is_healthy());
        r.condition = "Healthy".into();
        assert!(r.is_healthy());
    }

    #[test]
    fn out_of_range_confidence_is_clamped_for_display() {
        let mut r = tomato();
        r.confidence = 140.0;
        assert_eq!(r.confidence_percent(), 100);
        r.confidence = -3.5;
        assert_eq!(r.confidence_percent(), 0);
        r.confidence = 49.6;
        assert_eq!(r.confidence_percent(), 50);
        r.confidence = f64::NAN;
        assert_eq!(r.confidence_percent(), 0);
    }

    #[test]
    fn confidence_tiers() {
        let mut r = tomato();
        assert_eq!(r.confidence_tier(), ConfidenceTier::High);
        r.confidence = 80.0;
        assert_eq!(r.confidence_tier(), ConfidenceTier::Medium);
        r.confidence = 50.0;
        assert_eq!(r.confidence_tier(), ConfidenceTier::Low);
    }

    #[test]
    fn initial_state_serializes_with_nulls() {
        let json = serde_json::to_value(AnalysisState::initial()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "idle", "imageUri": null, "result": null, "error": null})
        );
    }
}
