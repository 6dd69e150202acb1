//! TUI Event System
//!
//! Handles user input and application events for the terminal interface.

use crate::analysis::AnalysisResponse;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

/// Events that can occur in the TUI
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// User pressed a key
    Key(KeyEvent),

    /// User pasted text (bracketed paste)
    Paste(String),

    /// Terminal was resized
    Resize(u16, u16),

    /// Tick event for animations/updates
    Tick,

    /// A backend request finished. Errors arrive pre-rendered so the event
    /// stays `Clone`.
    AnalysisFinished {
        generation: u64,
        outcome: Result<AnalysisResponse, String>,
    },
}

/// Event handler for the TUI
pub struct EventHandler {
    /// Event sender
    tx: mpsc::UnboundedSender<TuiEvent>,

    /// Event receiver
    rx: mpsc::UnboundedReceiver<TuiEvent>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Get a sender for sending events
    pub fn sender(&self) -> mpsc::UnboundedSender<TuiEvent> {
        self.tx.clone()
    }

    /// Receive the next event (blocks until available)
    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.rx.recv().await
    }

    /// Try to receive the next event without blocking
    pub fn try_next(&mut self) -> Option<TuiEvent> {
        self.rx.try_recv().ok()
    }

    /// Start listening for terminal events
    ///
    /// Uses crossterm's async EventStream so pending backend requests keep
    /// running while the UI waits for input.
    pub fn start_terminal_listener(tx: mpsc::UnboundedSender<TuiEvent>) {
        use crossterm::event::EventStream;
        use futures::StreamExt;

        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let tick_interval = std::time::Duration::from_millis(100);

            loop {
                // Race: next terminal event vs tick timer
                let event = tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(event)) => Some(event),
                            Some(Err(e)) => {
                                tracing::warn!("Terminal event error: {}", e);
                                None
                            }
                            None => break, // Stream closed
                        }
                    }
                    _ = tokio::time::sleep(tick_interval) => None,
                };

                if let Some(event) = event {
                    let should_break = match event {
                        crossterm::event::Event::Key(key) => {
                            // Only process key press events to avoid duplicates
                            if key.kind == crossterm::event::KeyEventKind::Press {
                                tx.send(TuiEvent::Key(key)).is_err()
                            } else {
                                false
                            }
                        }
                        crossterm::event::Event::Resize(w, h) => {
                            tx.send(TuiEvent::Resize(w, h)).is_err()
                        }
                        crossterm::event::Event::Paste(text) => {
                            tx.send(TuiEvent::Paste(text)).is_err()
                        }
                        _ => false,
                    };
                    if should_break {
                        break;
                    }
                }

                if tx.send(TuiEvent::Tick).is_err() {
                    break;
                }
            }
        });
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to check if a key event matches
pub fn key_matches(event: &KeyEvent, code: KeyCode, modifiers: KeyModifiers) -> bool {
    event.code == code && event.modifiers == modifiers
}

/// Common key bindings
pub mod keys {
    use super::*;

    /// Ctrl+C - Quit
    pub fn is_quit(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    /// Ctrl+R - Start over from any step
    pub fn is_reset(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('r'), KeyModifiers::CONTROL)
    }

    /// Enter - Select/Confirm
    pub fn is_enter(event: &KeyEvent) -> bool {
        event.code == KeyCode::Enter && event.modifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_handler_creation() {
        let handler = EventHandler::new();
        let sender = handler.sender();
        assert!(sender.send(TuiEvent::Tick).is_ok());
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let mut handler = EventHandler::new();
        let sender = handler.sender();
        sender.send(TuiEvent::Paste("1 2".to_string())).unwrap();
        sender
            .send(TuiEvent::AnalysisFinished {
                generation: 3,
                outcome: Err("boom".to_string()),
            })
            .unwrap();

        assert!(matches!(handler.next().await, Some(TuiEvent::Paste(t)) if t == "1 2"));
        assert!(matches!(
            handler.next().await,
            Some(TuiEvent::AnalysisFinished { generation: 3, .. })
        ));
        assert!(handler.try_next().is_none());
    }

    #[test]
    fn test_key_matches() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(key_matches(&event, KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!key_matches(&event, KeyCode::Char('c'), KeyModifiers::empty()));
    }

    #[test]
    fn test_quit_key() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(keys::is_quit(&event));

        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::empty());
        assert!(!keys::is_quit(&event));
    }

    #[test]
    fn test_reset_and_enter_keys() {
        assert!(keys::is_reset(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)));
        assert!(!keys::is_reset(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::empty())));
        assert!(keys::is_enter(&KeyEvent::new(KeyCode::Enter, KeyModifiers::empty())));
        assert!(!keys::is_enter(&KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)));
    }
}
