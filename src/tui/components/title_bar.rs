//! # TitleBar Component
//!
//! Top line: application name, the active language, and the keys that
//! matter on the current screen.
//!
//! Purely presentational. Props in, one `Line` out:
//!
//! 1. **Playing**: `"DevTyper | rust | Enter check · Tab skip · Esc results"`
//! 2. **Menus**: `"DevTyper | ↑↓ choose · Enter select · Esc back"`

use crate::core::sentences::Language;
use crate::core::state::GameState;
use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar<'a> {
    pub state: &'a GameState,
    /// Shown only while a round is running.
    pub language: Option<Language>,
}

impl<'a> TitleBar<'a> {
    pub fn new(state: &'a GameState, language: Option<Language>) -> Self {
        Self { state, language }
    }

    fn key_hints(&self) -> &'static str {
        match self.state {
            GameState::ModeSelect => "↑↓ choose · Enter select · Esc quit",
            GameState::WordCountSelect => "↑↓ choose · Enter start · Esc back",
            GameState::Playing => "Enter check · Tab skip · Esc results",
            GameState::Results => "Enter play again · Esc quit",
            GameState::TaskComplete | GameState::Error(_) => "Enter/Esc/q quit",
        }
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let separator = Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![Span::styled(
            "DevTyper",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )];

        if let Some(language) = self.language {
            spans.push(separator.clone());
            spans.push(Span::styled(
                language.label(),
                Style::default().fg(Color::Cyan),
            ));
        }

        spans.push(separator);
        spans.push(Span::styled(
            self.key_hints(),
            Style::default().fg(Color::DarkGray),
        ));

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::buffer_text;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(state: &GameState, language: Option<Language>) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut title_bar = TitleBar::new(state, language);
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_title_bar_while_playing() {
        let text = render(&GameState::Playing, Some(Language::Rust));
        assert!(text.contains("DevTyper"));
        assert!(text.contains("rust"));
        assert!(text.contains("Tab skip"));
    }

    #[test]
    fn test_title_bar_in_menu_has_no_language() {
        let text = render(&GameState::ModeSelect, None);
        assert!(text.contains("DevTyper"));
        assert!(text.contains("Esc quit"));
        assert!(!text.contains("rust"));
    }

    #[test]
    fn test_title_bar_after_task() {
        let text = render(&GameState::Error("boom".to_string()), None);
        assert!(text.contains("q quit"));
    }
}
