//! TUI Application State
//!
//! Owns the wizard and the event channel, and turns wizard actions into
//! background analysis requests.

use super::events::{keys, EventHandler, TuiEvent};
use super::wizard::{FetchRequest, Wizard, WizardAction};
use crate::analysis::Analyzer;
use anyhow::Result;
use std::sync::Arc;

/// Main application state
pub struct App {
    pub wizard: Wizard,
    pub should_quit: bool,
    /// Advances on every tick; drives the loading spinner
    pub animation_frame: usize,

    analyzer: Arc<dyn Analyzer>,
    event_handler: EventHandler,
}

impl App {
    pub fn new(wizard: Wizard, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            wizard,
            should_quit: false,
            animation_frame: 0,
            analyzer,
            event_handler: EventHandler::new(),
        }
    }

    /// Get event sender
    pub fn event_sender(&self) -> tokio::sync::mpsc::UnboundedSender<TuiEvent> {
        self.event_handler.sender()
    }

    /// Receive next event
    pub async fn next_event(&mut self) -> Option<TuiEvent> {
        self.event_handler.next().await
    }

    /// Next already-queued event, without waiting
    pub fn try_next_event(&mut self) -> Option<TuiEvent> {
        self.event_handler.try_next()
    }

    /// Handle an event
    pub async fn handle_event(&mut self, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => {
                if keys::is_quit(&key_event) {
                    self.should_quit = true;
                    return Ok(());
                }
                let action = self.wizard.handle_key(key_event);
                self.dispatch(action);
            }
            TuiEvent::Paste(text) => {
                self.wizard.handle_paste(&text);
            }
            TuiEvent::AnalysisFinished {
                generation,
                outcome,
            } => {
                self.wizard.apply_analysis(generation, outcome);
            }
            TuiEvent::Tick => {
                self.animation_frame = self.animation_frame.wrapping_add(1);
            }
            TuiEvent::Resize(_, _) => {
                // Handled by the render loop
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, action: WizardAction) {
        match action {
            WizardAction::Fetch(request) => self.spawn_fetch(request),
            WizardAction::None => {}
        }
    }

    /// Run the analysis in the background; the result comes back as an event
    fn spawn_fetch(&self, request: FetchRequest) {
        let analyzer = Arc::clone(&self.analyzer);
        let tx = self.event_handler.sender();

        tracing::info!(
            "Requesting analysis from {} (generation {})",
            analyzer.endpoint(),
            request.generation
        );

        tokio::spawn(async move {
            let outcome = analyzer
                .analyze(&request.payload)
                .await
                .map_err(|e| format!("[{}] {}", e.code().as_str(), e));

            if tx
                .send(TuiEvent::AnalysisFinished {
                    generation: request.generation,
                    outcome,
                })
                .is_err()
            {
                tracing::debug!("App closed before analysis finished");
            }
        });
    }
}
