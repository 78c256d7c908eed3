//! View model: which panels a surface shows for a given state.
//!
//! Every surface (terminal card, TUI, HTTP) renders from `Screen`, so the
//! visibility rules live in one place and stay a pure function of state.

use serde::Serialize;

use cropguard_core::{AnalysisResult, AnalysisState, AnalysisStatus, ConfidenceTier};

/// User-facing copy shared by the surfaces.
pub mod text {
    pub const APP_TITLE: &str = "作物卫士 (CropGuard AI)";
    pub const HISTORY_LABEL: &str = "历史记录";
    pub const HERO_TITLE: &str = "守护您的丰收";
    pub const HERO_SUBTITLE: &str =
        "利用 AI 即时识别植物病虫害。几秒钟内获得准确的诊断和专业的治疗建议，助您科学种植。";
    pub const UPLOAD_TITLE: &str = "上传作物图片";
    pub const UPLOAD_HINT: &str = "拖拽图片到此处，或点击下方按钮选择受影响的植物照片";
    pub const UPLOAD_BUTTON: &str = "选择照片";
    pub const MAX_SIZE_HINT: &str = "最大 10MB";
    pub const LOADING_TITLE: &str = "正在分析作物...";
    pub const ERROR_TITLE: &str = "分析失败";
    pub const RETRY_LABEL: &str = "重试";
    pub const NOT_A_PLANT_TITLE: &str = "未能识别为植物";
    pub const NOT_A_PLANT_BODY: &str =
        "上传的图片似乎不是农作物或植物。请上传清晰的植物叶片、茎或果实照片，以便准确识别。";
    pub const CONFIDENCE_LABEL: &str = "置信度";
    pub const SYMPTOMS_TITLE: &str = "识别到的症状";
    pub const TREATMENT_TITLE: &str = "建议治疗方案";
    pub const PREVENTION_TITLE: &str = "预防措施";
    pub const ANALYZE_ANOTHER: &str = "识别另一张照片";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPanel {
    /// Disabled while a call is in flight.
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBanner {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisCard {
    pub image_uri: Option<String>,
    pub result: AnalysisResult,
    pub healthy: bool,
    pub confidence_percent: u8,
    pub confidence_tier: ConfidenceTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    Diagnosis(DiagnosisCard),
    /// A successful result for an image that is not a plant. Not an error.
    NotAPlant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub status: AnalysisStatus,
    pub hero: bool,
    pub upload: Option<UploadPanel>,
    pub loading: bool,
    pub error_banner: Option<ErrorBanner>,
    pub outcome: Option<Outcome>,
}

impl Screen {
    pub fn from_state(state: &AnalysisState) -> Self {
        let status = state.status;
        let upload = match status {
            AnalysisStatus::Idle | AnalysisStatus::Uploading | AnalysisStatus::Error => {
                Some(UploadPanel { enabled: true })
            }
            AnalysisStatus::Analyzing => Some(UploadPanel { enabled: false }),
            AnalysisStatus::Success => None,
        };
        let error_banner = match (status, &state.error) {
            (AnalysisStatus::Error, Some(message)) => Some(ErrorBanner {
                message: message.clone(),
            }),
            _ => None,
        };
        let outcome = match (status, &state.result) {
            (AnalysisStatus::Success, Some(result)) if result.is_plant => {
                Some(Outcome::Diagnosis(DiagnosisCard {
                    image_uri: state.image_uri.clone(),
                    result: result.clone(),
                    healthy: result.is_healthy(),
                    confidence_percent: result.confidence_percent(),
                    confidence_tier: result.confidence_tier(),
                }))
            }
            (AnalysisStatus::Success, Some(_)) => Some(Outcome::NotAPlant),
            _ => None,
        };

        Self {
            status,
            hero: status == AnalysisStatus::Idle,
            upload,
            loading: status == AnalysisStatus::Analyzing,
            error_banner,
            outcome,
        }
    }
}
