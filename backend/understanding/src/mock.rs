use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use cropguard_core::{AnalysisError, AnalysisResult, Analyzer};

use crate::vision::decode_analysis;

/// What a `MockAnalyzer` answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Result(AnalysisResult),
    /// Raw model text, decoded through the same path as a live response.
    RawText(Option<String>),
    Error(AnalysisError),
}

/// An analyzer that returns canned replies.
pub struct MockAnalyzer {
    reply: MockReply,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_result(result: AnalysisResult) -> Self {
        Self::new(MockReply::Result(result))
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(MockReply::RawText(Some(text.into())))
    }

    pub fn failing(error: AnalysisError) -> Self {
        Self::new(MockReply::Error(error))
    }

    /// Hold every reply until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, _image_data: &str, _mime_type: &str) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reply {
            MockReply::Result(result) => Ok(result.clone()),
            MockReply::RawText(text) => decode_analysis(text.as_deref()),
            MockReply::Error(e) => Err(e.clone()),
        }
    }
}

/// A diseased tomato leaf, as the live model would describe it.
pub fn sample_diseased_tomato() -> AnalysisResult {
    AnalysisResult {
        is_plant: true,
        plant_name: "番茄".to_string(),
        condition: "早期枯萎病".to_string(),
        confidence: 92.0,
        description: "由链格孢菌引起的真菌性病害，叶片出现同心轮纹状褐色病斑。".to_string(),
        symptoms: vec!["叶片黄化".to_string(), "下部叶片出现褐色同心轮纹斑".to_string()],
        treatment: vec!["摘除并销毁病叶".to_string(), "喷施杀菌剂".to_string()],
        prevention: vec!["轮作".to_string(), "避免叶面长时间潮湿".to_string()],
    }
}

/// What the model returns for a photo that is not a plant.
pub fn sample_not_a_plant() -> AnalysisResult {
    AnalysisResult {
        is_plant: false,
        plant_name: String::new(),
        condition: String::new(),
        confidence: 0.0,
        description: String::new(),
        symptoms: Vec::new(),
        treatment: Vec::new(),
        prevention: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_canned_result() {
        let mock = MockAnalyzer::with_result(sample_diseased_tomato());
        let result = mock.analyze("QUJD", "image/jpeg").await.unwrap();
        assert_eq!(result, sample_diseased_tomato());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn raw_text_goes_through_decoder() {
        let mock = MockAnalyzer::with_text("not json");
        let err = mock.analyze("QUJD", "image/jpeg").await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedJson(_)));

        let empty = MockAnalyzer::new(MockReply::RawText(None));
        assert!(matches!(
            empty.analyze("QUJD", "image/jpeg").await,
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn gate_holds_reply() {
        let gate = Arc::new(Notify::new());
        let mock = Arc::new(MockAnalyzer::with_result(sample_not_a_plant()).gated(gate.clone()));
        let task = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.analyze("QUJD", "image/png").await })
        };
        tokio::task::yield_now().await;
        assert!(!task.is_finished());
        gate.notify_one();
        assert!(!task.await.unwrap().unwrap().is_plant);
    }
}
