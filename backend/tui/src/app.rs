//! TUI App State
//!
//! Everything the terminal UI draws from: the latest session snapshot plus
//! purely local bits (path being typed, alert line, active tab).

use cropguard_core::AnalysisState;
use cropguard_session::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Diagnose,
    /// Placeholder; nothing is persisted.
    History,
}

#[derive(Debug, Default)]
pub struct TuiApp {
    pub input: String,
    pub state: AnalysisState,
    /// Encoder rejections and other notices. Never part of session state.
    pub alert: Option<String>,
    pub tab: Tab,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a newer one from the session.
    pub fn apply_state(&mut self, state: AnalysisState) {
        self.state = state;
    }

    pub fn screen(&self) -> Screen {
        Screen::from_state(&self.state)
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Diagnose => Tab::History,
            Tab::History => Tab::Diagnose,
        };
    }
}
