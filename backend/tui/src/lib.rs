//! Terminal user interface for CropGuard.
//!
//! Exposes the ratatui pieces and the event loop behind `cropguard ui`.

pub mod app;
pub mod input;
pub mod render;
pub mod runner;

pub use app::{Tab, TuiApp};
pub use input::{handle_event, handle_key_event, Intent};
pub use render::{body_lines, draw_ui};
pub use runner::run;
