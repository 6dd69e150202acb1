//! Terminal User Interface
//!
//! Full-screen wizard built on ratatui and crossterm.

pub mod app;
pub mod events;
pub mod matrix_editor;
pub mod step_indicator;
pub mod wizard;
pub mod wizard_render;

pub use app::App;
pub use events::{EventHandler, TuiEvent};
pub use wizard::{AnalysisState, Wizard, WizardAction, WizardStep};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

/// Run the wizard until the user quits. The terminal is restored on every
/// exit path, including errors from the event loop.
pub async fn run(mut app: App) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let result = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(mut terminal) => {
            let loop_result = event_loop(&mut terminal, &mut app).await;
            let _ = terminal.show_cursor();
            loop_result
        }
        Err(e) => Err(e).context("Failed to create terminal"),
    };

    restore_terminal();
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    EventHandler::start_terminal_listener(app.event_sender());
    tracing::info!("Wizard started");

    loop {
        terminal
            .draw(|f| wizard_render::render_wizard(f, app))
            .context("Failed to draw frame")?;

        let Some(event) = app.next_event().await else {
            tracing::warn!("Event channel closed");
            break;
        };
        app.handle_event(event).await?;

        // Drain whatever queued up while we were drawing
        while let Some(event) = app.try_next_event() {
            app.handle_event(event).await?;
        }

        if app.should_quit {
            break;
        }
    }

    tracing::info!("Wizard closed");
    Ok(())
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        tracing::warn!("Failed to disable raw mode: {}", e);
    }
    if let Err(e) = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen) {
        tracing::warn!("Failed to leave alternate screen: {}", e);
    }
}
