//! The session state machine: `idle → analyzing → success | error`, with
//! `reset` back to `idle` from anywhere.
//!
//! Each submit takes a new sequence number. A completion is applied only if
//! its number is still the latest; anything older is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};
use uuid::Uuid;

use cropguard_core::{
    AnalysisError, AnalysisResult, AnalysisState, AnalysisStatus, Analyzer, SessionError,
    GENERIC_FAILURE_MESSAGE,
};
use cropguard_logging::{SessionEvent, SessionEventLogger};
use cropguard_media::{mime_from_data_uri, strip_data_uri_prefix};

/// Used by `retry` when the retained image carries no MIME header.
const FALLBACK_RETRY_MIME: &str = "image/jpeg";

/// What happened to a finished analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was written to state, leaving it in this status.
    Applied(AnalysisStatus),
    /// A newer submit or a reset superseded the call.
    Discarded,
}

/// Handle to an in-flight analysis started by `submit`.
#[derive(Debug)]
pub struct PendingAnalysis {
    seq: u64,
    handle: JoinHandle<Completion>,
}

impl PendingAnalysis {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wait for the call to finish and learn whether it was applied.
    pub async fn wait(self) -> Result<Completion, JoinError> {
        self.handle.await
    }
}

struct Inner {
    session_id: Uuid,
    analyzer: Arc<dyn Analyzer>,
    state: watch::Sender<AnalysisState>,
    seq: AtomicU64,
}

/// Owns the session's `AnalysisState` and the one current analysis call.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        let (state, _) = watch::channel(AnalysisState::initial());
        let session_id = Uuid::new_v4();
        info!(session = %session_id, analyzer = analyzer.name(), "Session started");
        Self {
            inner: Arc::new(Inner {
                session_id,
                analyzer,
                state,
                seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Latest request sequence number.
    pub fn sequence(&self) -> u64 {
        self.inner.seq.load(Ordering::SeqCst)
    }

    /// A consistent copy of the whole state.
    pub fn snapshot(&self) -> AnalysisState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every state change as a whole snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.inner.state.subscribe()
    }

    /// Start analyzing `image_uri`. Valid from `idle` or `error`.
    ///
    /// Must be called within a Tokio runtime; the call runs on a spawned task.
    pub fn submit(
        &self,
        image_uri: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Result<PendingAnalysis, SessionError> {
        let image_uri = image_uri.into();
        let mime_type = mime_type.into();

        let mut accepted = None;
        let mut status = AnalysisStatus::Idle;
        self.inner.state.send_if_modified(|state| {
            status = state.status;
            if !matches!(
                status,
                AnalysisStatus::Idle | AnalysisStatus::Uploading | AnalysisStatus::Error
            ) {
                return false;
            }
            accepted = Some(self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1);
            *state = AnalysisState {
                status: AnalysisStatus::Analyzing,
                image_uri: Some(image_uri.clone()),
                result: None,
                error: None,
            };
            true
        });
        let seq = accepted.ok_or(SessionError::InvalidTransition {
            action: "submit",
            status,
        })?;

        SessionEventLogger::log_event(
            self.inner.session_id,
            SessionEvent::Submitted {
                seq,
                mime_type: mime_type.clone(),
                payload_len: strip_data_uri_prefix(&image_uri).len(),
            },
        );

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let outcome = inner.analyzer.analyze(&image_uri, &mime_type).await;
            inner.complete(seq, outcome)
        });

        Ok(PendingAnalysis { seq, handle })
    }

    /// Resubmit the retained image after a failure.
    pub fn retry(&self) -> Result<PendingAnalysis, SessionError> {
        let snapshot = self.snapshot();
        if snapshot.status != AnalysisStatus::Error {
            return Err(SessionError::InvalidTransition {
                action: "retry",
                status: snapshot.status,
            });
        }
        let image_uri = snapshot.image_uri.ok_or(SessionError::NothingToRetry)?;
        let mime_type = mime_from_data_uri(&image_uri)
            .unwrap_or(FALLBACK_RETRY_MIME)
            .to_string();
        self.submit(image_uri, mime_type)
    }

    /// Return to `{idle, None, None, None}`. Any pending call becomes stale.
    pub fn reset(&self) {
        let mut seq = 0;
        let changed = self.inner.state.send_if_modified(|state| {
            seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
            if state.is_initial() {
                return false;
            }
            *state = AnalysisState::initial();
            true
        });
        debug!(seq, changed, "Session reset");
        SessionEventLogger::log_event(self.inner.session_id, SessionEvent::Reset { seq });
    }
}

impl Inner {
    fn complete(&self, seq: u64, outcome: Result<AnalysisResult, AnalysisError>) -> Completion {
        let mut latest = seq;
        let mut applied = None;
        self.state.send_if_modified(|state| {
            latest = self.seq.load(Ordering::SeqCst);
            if latest != seq || state.status != AnalysisStatus::Analyzing {
                return false;
            }
            match &outcome {
                Ok(result) => {
                    state.status = AnalysisStatus::Success;
                    state.result = Some(result.clone());
                    state.error = None;
                }
                Err(e) => {
                    state.status = AnalysisStatus::Error;
                    state.result = None;
                    state.error = Some(e.user_message().unwrap_or(GENERIC_FAILURE_MESSAGE).to_string());
                }
            }
            applied = Some(state.status);
            true
        });

        let event = match (applied, &outcome) {
            (None, _) => SessionEvent::Discarded { seq, latest },
            (Some(_), Ok(result)) => SessionEvent::Completed {
                seq,
                is_plant: result.is_plant,
                condition: result.condition.clone(),
                confidence: result.confidence,
            },
            (Some(_), Err(e)) => SessionEvent::Failed {
                seq,
                error_msg: e.to_string(),
            },
        };
        SessionEventLogger::log_event(self.session_id, event);

        applied.map_or(Completion::Discarded, Completion::Applied)
    }
}
