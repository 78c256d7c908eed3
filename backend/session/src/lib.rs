//! Single-session analysis state machine for CropGuard, plus the view model
//! every presentation surface renders from.

pub mod controller;
pub mod view;

pub use controller::{Completion, PendingAnalysis, SessionController};
pub use view::{text, DiagnosisCard, ErrorBanner, Outcome, Screen, UploadPanel};
