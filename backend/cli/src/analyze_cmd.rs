//! One-shot analysis: encode, run the session to completion, print.

use std::path::PathBuf;

use anyhow::{bail, Result};
use bytes::Bytes;
use tokio::io::AsyncReadExt;

use cropguard_core::{AnalysisState, AnalysisStatus};
use cropguard_media::{ImageEncoder, ImageSource};
use cropguard_session::{Completion, Screen, SessionController};

use crate::terminal_output::{note_error, render_screen, supports_color};

pub struct AnalyzeArgs {
    pub path: Option<PathBuf>,
    pub stdin: bool,
    pub mime: Option<String>,
    pub json: bool,
}

/// Runs one analysis. Returns the final state; the caller decides the exit code.
pub async fn run(
    args: AnalyzeArgs,
    controller: &SessionController,
    encoder: &ImageEncoder,
) -> Result<AnalysisState> {
    let source = match (args.stdin, args.path) {
        (true, _) => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            ImageSource::Camera {
                bytes: Bytes::from(buf),
                mime_type: args.mime,
            }
        }
        (false, Some(path)) => ImageSource::Picker(path),
        (false, None) => bail!("Pass an image path or --stdin"),
    };

    let state = match encoder.encode(source).await {
        Ok(image) => {
            let pending = controller.submit(image.data_uri, image.mime_type)?;
            if let Completion::Discarded = pending.wait().await? {
                tracing::warn!("Analysis result was superseded");
            }
            controller.snapshot()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Image rejected");
            note_error(&e.user_message());
            // With --json the untouched state is still printed.
            let state = controller.snapshot();
            if !args.json {
                return Ok(state);
            }
            state
        }
    };

    print!("{}", render_output(&state, args.json, supports_color())?);
    Ok(state)
}

/// The final state as pretty JSON, or as the terminal card.
fn render_output(state: &AnalysisState, json: bool, color: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(state)?))
    } else {
        Ok(render_screen(&Screen::from_state(state), color))
    }
}

/// Whether the command should exit non-zero for this final state.
pub fn is_failure(state: &AnalysisState) -> bool {
    state.status != AnalysisStatus::Success
}
