pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    AnalysisError, EncodeError, SessionError, ANALYSIS_FAILED_MESSAGE, GENERIC_FAILURE_MESSAGE,
    NOT_AN_IMAGE_MESSAGE,
};
pub use traits::Analyzer;
pub use types::{AnalysisResult, AnalysisState, AnalysisStatus, ConfidenceTier};
