use thiserror::Error;

use crate::types::AnalysisStatus;

/// Shown for every analysis failure, whatever the underlying cause.
pub const ANALYSIS_FAILED_MESSAGE: &str = "图片分析失败，请重试。";

/// Fallback when a failure carries no user-facing message.
pub const GENERIC_FAILURE_MESSAGE: &str = "出错了，请稍后重试。";

/// Shown when a non-image file is selected.
pub const NOT_AN_IMAGE_MESSAGE: &str = "请上传图片文件。";

/// Failure of a single analysis call.
///
/// The variants keep the technical detail for logs; `user_message` is the only
/// thing that should reach session state.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("undecodable response envelope: {0}")]
    Envelope(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("malformed JSON in model output: {0}")]
    MalformedJson(String),

    #[error("model output violates the response schema: {0}")]
    SchemaViolation(String),

    /// A failure with nothing to tell the user.
    #[error("analysis failed")]
    Unspecified,
}

impl AnalysisError {
    /// Translated message for the UI, if this failure has one.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            AnalysisError::Unspecified => None,
            _ => Some(ANALYSIS_FAILED_MESSAGE),
        }
    }

    /// Classify a `serde_json` decode failure of the model output.
    pub fn from_decode(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => AnalysisError::SchemaViolation(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => {
                AnalysisError::MalformedJson(err.to_string())
            }
        }
    }
}

/// Rejection at the image encoder boundary. Never enters session state.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("not an image: content type '{0}'")]
    NotAnImage(String),

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Alert text for the user.
    pub fn user_message(&self) -> String {
        match self {
            EncodeError::NotAnImage(_) => NOT_AN_IMAGE_MESSAGE.to_string(),
            EncodeError::TooLarge { limit, .. } => {
                format!("图片过大，最大 {}MB。", limit / (1024 * 1024))
            }
            EncodeError::Io(e) => format!("无法读取图片：{e}"),
        }
    }
}

/// Misuse of the session state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: AnalysisStatus,
    },

    #[error("no image retained to retry")]
    NothingToRetry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_technical_failure_translates_to_one_message() {
        let errors = [
            AnalysisError::Transport("connection refused".into()),
            AnalysisError::Api { status: 500, body: "boom".into() },
            AnalysisError::EmptyResponse,
            AnalysisError::MalformedJson("eof".into()),
            AnalysisError::SchemaViolation("missing field".into()),
        ];
        for e in errors {
            assert_eq!(e.user_message(), Some(ANALYSIS_FAILED_MESSAGE));
        }
        assert_eq!(AnalysisError::Unspecified.user_message(), None);
    }

    #[test]
    fn classifies_decode_errors() {
        let syntax = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(AnalysisError::from_decode(syntax), AnalysisError::MalformedJson(_)));

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Needs {
            confidence: f64,
        }
        let data = serde_json::from_str::<Needs>("{}").unwrap_err();
        assert!(matches!(AnalysisError::from_decode(data), AnalysisError::SchemaViolation(_)));
    }

    #[test]
    fn not_an_image_alert() {
        let e = EncodeError::NotAnImage("text/plain".into());
        assert_eq!(e.user_message(), NOT_AN_IMAGE_MESSAGE);
    }
}
