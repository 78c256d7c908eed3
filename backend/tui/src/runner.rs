//! Terminal Loop
//!
//! Owns the terminal for `cropguard ui`: raw mode, alternate screen and
//! bracketed paste (so drag-and-drop arrives as a path). Redraws whenever a
//! key arrives or the session publishes a new snapshot.

use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};

use cropguard_media::ImageEncoder;
use cropguard_session::SessionController;

use crate::app::TuiApp;
use crate::input::{handle_event, Intent};
use crate::render::draw_ui;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Run the interactive UI until the user quits.
pub async fn run(controller: SessionController, encoder: ImageEncoder) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, controller, encoder).await;
    restore_terminal(&mut terminal)?;
    outcome
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Term,
    controller: SessionController,
    encoder: ImageEncoder,
) -> Result<()> {
    let mut app = TuiApp::new();
    let mut updates = controller.subscribe();
    app.apply_state(updates.borrow_and_update().clone());
    let mut events = EventStream::new();

    loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                app.apply_state(updates.borrow_and_update().clone());
            }
            event = events.next() => {
                let Some(event) = event else { break };
                if let Some(intent) = handle_event(event?, &mut app) {
                    dispatch(intent, &mut app, &controller, &encoder).await;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

async fn dispatch(
    intent: Intent,
    app: &mut TuiApp,
    controller: &SessionController,
    encoder: &ImageEncoder,
) {
    match intent {
        Intent::Submit(source) => match encoder.encode(source).await {
            Ok(image) => {
                if let Err(e) = controller.submit(image.data_uri, image.mime_type) {
                    tracing::debug!(error = %e, "Submit ignored");
                }
            }
            Err(e) => app.alert = Some(e.user_message()),
        },
        Intent::Retry => {
            if let Err(e) = controller.retry() {
                tracing::debug!(error = %e, "Retry ignored");
            }
        }
        Intent::Reset => controller.reset(),
        Intent::Quit => app.should_quit = true,
    }
}
