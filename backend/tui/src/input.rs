//! Keyboard and Paste Input Handler
//!
//! Turns crossterm events into edits of `TuiApp` and, when the user asks for
//! something, an `Intent` for the session.

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use cropguard_core::AnalysisStatus;
use cropguard_media::ImageSource;

use crate::app::TuiApp;

/// A request from the user that the runner forwards to the session.
#[derive(Debug)]
pub enum Intent {
    Submit(ImageSource),
    Retry,
    Reset,
    Quit,
}

/// Handle one terminal event.
pub fn handle_event(event: Event, app: &mut TuiApp) -> Option<Intent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(key, app),
        // Dragging a file onto the terminal pastes its path.
        Event::Paste(text) if accepts_upload(app) => {
            let path = text.trim().to_string();
            if path.is_empty() {
                return None;
            }
            app.input = path.clone();
            app.alert = None;
            Some(Intent::Submit(ImageSource::Dropped(PathBuf::from(path))))
        }
        _ => None,
    }
}

fn accepts_upload(app: &TuiApp) -> bool {
    matches!(app.state.status, AnalysisStatus::Idle | AnalysisStatus::Error)
}

pub fn handle_key_event(key: KeyEvent, app: &mut TuiApp) -> Option<Intent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            Some(Intent::Quit)
        }
        KeyCode::Char('r') if ctrl => {
            (app.state.status == AnalysisStatus::Error).then_some(Intent::Retry)
        }
        KeyCode::Tab => {
            app.toggle_tab();
            None
        }
        KeyCode::Esc => {
            app.alert = None;
            if app.state.status == AnalysisStatus::Idle {
                app.should_quit = true;
                Some(Intent::Quit)
            } else {
                app.input.clear();
                Some(Intent::Reset)
            }
        }
        KeyCode::Enter if app.state.status == AnalysisStatus::Success => {
            app.input.clear();
            Some(Intent::Reset)
        }
        KeyCode::Enter if accepts_upload(app) => {
            let path = app.input.trim();
            if path.is_empty() {
                return None;
            }
            app.alert = None;
            Some(Intent::Submit(ImageSource::Picker(PathBuf::from(path))))
        }
        KeyCode::Backspace if accepts_upload(app) => {
            app.input.pop();
            None
        }
        KeyCode::Char(c) if accepts_upload(app) && !ctrl => {
            app.input.push(c);
            None
        }
        _ => None,
    }
}
