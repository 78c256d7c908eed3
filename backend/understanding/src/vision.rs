//! Crop diagnosis through the Gemini `generateContent` endpoint with a
//! declared response schema.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use cropguard_core::{AnalysisError, AnalysisResult, Analyzer};
use cropguard_logging::redact_sensitive_data;
use cropguard_media::strip_data_uri_prefix;

use crate::prompt::{response_schema, DIAGNOSIS_PROMPT, RESPONSE_MIME_TYPE};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini-backed analyzer. Construct one and inject it; nothing here is global.
pub struct GeminiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAnalyzer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound each call. Without this the transport default applies.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn request(&self, image_data: &str, mime_type: &str) -> Result<AnalysisResult, AnalysisError> {
        let body = GenerateContentRequest::diagnosis(strip_data_uri_prefix(image_data), mime_type);

        debug!(model = %self.model, mime_type, "Sending diagnosis request to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Envelope(e.to_string()))?;

        decode_analysis(envelope.text().as_deref())
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, image_data: &str, mime_type: &str) -> Result<AnalysisResult, AnalysisError> {
        info!(model = %self.model, "Analyzing crop image via Gemini");
        let outcome = self.request(image_data, mime_type).await;
        match &outcome {
            Ok(result) => info!(
                is_plant = result.is_plant,
                condition = %result.condition,
                confidence = result.confidence,
                "Gemini diagnosis received"
            ),
            Err(e) => error!(
                model = %self.model,
                error = %redact_sensitive_data(&e.to_string()),
                "Gemini analysis error"
            ),
        }
        outcome
    }
}

/// Decode the model's text output into a result.
///
/// Missing or blank text, malformed JSON, and schema violations are all
/// failures; there is no partial result.
pub fn decode_analysis(text: Option<&str>) -> Result<AnalysisResult, AnalysisError> {
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(AnalysisError::EmptyResponse),
    };
    serde_json::from_str(text).map_err(AnalysisError::from_decode)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn diagnosis(payload: &str, mime_type: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: payload.to_string(),
                        },
                    },
                    Part::Text {
                        text: DIAGNOSIS_PROMPT.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::json;

    const TOMATO: &str = r#"{"isPlant":true,"plantName":"番茄","condition":"早期枯萎病","confidence":92,"description":"...","symptoms":["叶片黄化"],"treatment":["喷施杀菌剂"],"prevention":["轮作"]}"#;

    #[derive(Clone, Default)]
    struct Captured {
        calls: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    }

    #[derive(Clone)]
    struct Fake {
        status: StatusCode,
        reply: Value,
        captured: Captured,
    }

    async fn handle(
        State(fake): State<Fake>,
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        fake.captured.calls.lock().unwrap().push((call, key, body));
        (fake.status, Json(fake.reply))
    }

    async fn spawn_fake(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let fake = Fake { status, reply, captured: captured.clone() };
        let app = Router::new().route("/models/:call", post(handle)).with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    fn text_reply(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[tokio::test]
    async fn sends_schema_constrained_request() {
        let (url, captured) = spawn_fake(StatusCode::OK, text_reply(TOMATO)).await;
        let analyzer = GeminiAnalyzer::new("test-key").with_base_url(url);

        let result = analyzer
            .analyze("data:image/jpeg;base64,QUJD", "image/jpeg")
            .await
            .unwrap();
        assert_eq!(result.plant_name, "番茄");
        assert_eq!(result.confidence, 92.0);

        let calls = captured.calls.lock().unwrap();
        let (call, key, body) = &calls[0];
        assert_eq!(call, "gemini-2.5-flash:generateContent");
        assert_eq!(key.as_deref(), Some("test-key"));

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["data"], "QUJD");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["text"], DIAGNOSIS_PROMPT);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], response_schema());
    }

    #[tokio::test]
    async fn bare_payload_is_sent_unchanged() {
        let (url, captured) = spawn_fake(StatusCode::OK, text_reply(TOMATO)).await;
        let analyzer = GeminiAnalyzer::new("k").with_base_url(url).with_model("gemini-test");
        analyzer.analyze("QUJD", "image/png").await.unwrap();

        let calls = captured.calls.lock().unwrap();
        assert_eq!(calls[0].0, "gemini-test:generateContent");
        assert_eq!(calls[0].2["contents"][0]["parts"][0]["inlineData"]["data"], "QUJD");
    }

    #[tokio::test]
    async fn joins_split_text_parts() {
        let (head, tail) = TOMATO.split_at(20);
        let reply = json!({ "candidates": [{ "content": { "parts": [{ "text": head }, { "text": tail }] } }] });
        let (url, _) = spawn_fake(StatusCode::OK, reply).await;
        let result = GeminiAnalyzer::new("k").with_base_url(url).analyze("QUJD", "image/png").await;
        assert!(result.unwrap().is_plant);
    }

    #[tokio::test]
    async fn empty_candidates_is_empty_response() {
        let (url, _) = spawn_fake(StatusCode::OK, json!({ "candidates": [] })).await;
        let err = GeminiAnalyzer::new("k")
            .with_base_url(url)
            .analyze("QUJD", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn http_error_status_is_api_error() {
        let (url, _) = spawn_fake(StatusCode::FORBIDDEN, json!({ "error": { "message": "bad key" } })).await;
        let err = GeminiAnalyzer::new("k")
            .with_base_url(url)
            .analyze("QUJD", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Api { status: 403, .. }));
        assert!(err.user_message().is_some());
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = GeminiAnalyzer::new("k")
            .with_base_url(format!("http://{addr}"))
            .analyze("QUJD", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
    }

    #[test]
    fn decode_rejects_blank_text() {
        assert!(matches!(decode_analysis(None), Err(AnalysisError::EmptyResponse)));
        assert!(matches!(decode_analysis(Some("  ")), Err(AnalysisError::EmptyResponse)));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        assert!(matches!(
            decode_analysis(Some("{\"isPlant\": tru")),
            Err(AnalysisError::MalformedJson(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_confidence() {
        let without = r#"{"isPlant":true,"plantName":"番茄","condition":"x","description":"","symptoms":[],"treatment":[],"prevention":[]}"#;
        assert!(matches!(
            decode_analysis(Some(without)),
            Err(AnalysisError::SchemaViolation(_))
        ));
    }

    #[test]
    fn decode_accepts_out_of_range_confidence() {
        let odd = TOMATO.replace("92", "-12.5");
        assert_eq!(decode_analysis(Some(&odd)).unwrap().confidence, -12.5);
    }
}
