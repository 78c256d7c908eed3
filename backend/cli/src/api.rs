use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::wrappers::WatchStream;

use cropguard_core::{EncodeError, SessionError, NOT_AN_IMAGE_MESSAGE};
use cropguard_media::{is_image, ImageEncoder, ImageSource};
use cropguard_session::{Screen, SessionController};

/// Shared application state for API handlers.
pub struct AppState {
    pub controller: SessionController,
    pub encoder: ImageEncoder,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Base64 inflates JSON bodies by a third.
    let body_limit = usize::try_from(state.encoder.policy().max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(2);
    Router::new()
        .route("/api/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/view", get(get_view))
        .route("/api/events", get(events))
        .route("/api/analyze", post(analyze))
        .route("/api/retry", post(retry))
        .route("/api/reset", post(reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Handler failure rendered as `{ "error": ... }`.
struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<EncodeError> for ApiError {
    fn from(e: EncodeError) -> Self {
        let status = match &e {
            EncodeError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            EncodeError::NotAnImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            EncodeError::Io(_) => StatusCode::BAD_REQUEST,
        };
        ApiError(status, e.user_message())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError(StatusCode::CONFLICT, e.to_string())
    }
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cropguard",
        "version": env!("CARGO_PKG_VERSION"),
        "session": state.controller.session_id(),
        "sequence": state.controller.sequence(),
    }))
}

async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.snapshot())
}

async fn get_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(Screen::from_state(&state.controller.snapshot()))
}

/// Server-sent stream of whole-state snapshots, starting with the current one.
async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.controller.subscribe()).map(|snapshot| {
        let event = Event::default()
            .event("state")
            .json_data(&snapshot)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Ok::<_, Infallible>(event)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody {
    data_uri: String,
    mime_type: String,
}

/// Start an analysis from a multipart `file` upload or a JSON data URI.
async fn analyze(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let (data_uri, mime_type) = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.body_text()))?;
        let image = state.encoder.encode(read_file_field(multipart).await?).await?;
        (image.data_uri, image.mime_type)
    } else {
        let Json(body) = Json::<AnalyzeBody>::from_request(request, &state)
            .await
            .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.body_text()))?;
        if !is_image(&body.mime_type) {
            return Err(ApiError(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                NOT_AN_IMAGE_MESSAGE.to_string(),
            ));
        }
        (body.data_uri, body.mime_type)
    };

    let pending = state.controller.submit(data_uri, mime_type)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "seq": pending.seq(), "state": state.controller.snapshot() })),
    ))
}

async fn read_file_field(mut multipart: Multipart) -> Result<ImageSource, ApiError> {
    let bad_request = |msg: String| ApiError(StatusCode::BAD_REQUEST, msg);
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
        return Ok(ImageSource::Camera { bytes, mime_type });
    }
    Err(bad_request("missing `file` field".to_string()))
}

async fn retry(State(state): State<Arc<AppState>>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let pending = state.controller.retry()?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "seq": pending.seq(), "state": state.controller.snapshot() })),
    ))
}

async fn reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.controller.reset();
    Json(state.controller.snapshot())
}
