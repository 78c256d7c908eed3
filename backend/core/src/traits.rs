use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::types::AnalysisResult;

/// A remote (or canned) model that diagnoses a crop image.
///
/// Implementations are constructed explicitly and injected into the session
/// controller; there is no process-wide client.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Provider name for logs (e.g. "gemini", "mock").
    fn name(&self) -> &str;

    /// Analyze a base64 image. `image_data` may carry a `data:...;base64,`
    /// prefix. Single-shot: no retry, no streaming.
    async fn analyze(&self, image_data: &str, mime_type: &str)
        -> Result<AnalysisResult, AnalysisError>;
}
