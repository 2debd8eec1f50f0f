use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, warn};

use crate::core::action::Action;

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    ForceQuit, // Ctrl+C, raw mode swallows SIGINT
    Up,
    Down,
    Submit,
    Escape,
    Tab,
    Backspace,
    InputChar(char),
    Resize,
}

impl TuiEvent {
    /// The core action for this event. Resize only needs a redraw.
    pub fn to_action(&self) -> Option<Action> {
        match self {
            TuiEvent::ForceQuit => Some(Action::Interrupt),
            TuiEvent::Up => Some(Action::Up),
            TuiEvent::Down => Some(Action::Down),
            TuiEvent::Submit => Some(Action::Confirm),
            TuiEvent::Escape => Some(Action::Back),
            TuiEvent::Tab => Some(Action::Skip),
            TuiEvent::Backspace => Some(Action::Backspace),
            TuiEvent::InputChar(c) => Some(Action::Type(*c)),
            TuiEvent::Resize => None,
        }
    }
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Event poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(event) => translate(event),
        Err(e) => {
            warn!("Event read failed: {}", e);
            None
        }
    }
}

pub fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) => translate_key(key_event),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn translate_key(key_event: KeyEvent) -> Option<TuiEvent> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }
    debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code, key_event.modifiers
    );
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Char('c') if ctrl => Some(TuiEvent::ForceQuit),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::Tab => Some(TuiEvent::Tab),
        KeyCode::Up => Some(TuiEvent::Up),
        KeyCode::Down => Some(TuiEvent::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_ctrl_c_is_force_quit() {
        let event = translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(event, Some(TuiEvent::ForceQuit));
        assert_eq!(event.unwrap().to_action(), Some(Action::Interrupt));
    }

    #[test]
    fn test_other_ctrl_chars_are_ignored() {
        assert_eq!(translate(key(KeyCode::Char('r'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn test_shifted_chars_are_typed() {
        assert_eq!(
            translate(key(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(TuiEvent::InputChar('X'))
        );
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            translate(key(KeyCode::Tab, KeyModifiers::NONE)).and_then(|e| e.to_action()),
            Some(Action::Skip)
        );
        assert_eq!(
            translate(key(KeyCode::Esc, KeyModifiers::NONE)).and_then(|e| e.to_action()),
            Some(Action::Back)
        );
        assert_eq!(translate(Event::Resize(80, 24)), Some(TuiEvent::Resize));
        assert_eq!(TuiEvent::Resize.to_action(), None);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(translate(Event::Key(release)), None);
    }
}
