//! # Overlays
//!
//! Centered boxes drawn over the body:
//!
//! - `ResultsView`: summary of the round that just ended
//! - `TaskOverlay`: the background command finished (or failed)

use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::core::session::Results;
use crate::tui::component::Component;
use crate::tui::components::centered_rect;
use crate::tui::components::status_bar::format_elapsed;

pub struct ResultsView<'a> {
    pub results: &'a Results,
}

impl<'a> ResultsView<'a> {
    pub fn new(results: &'a Results) -> Self {
        Self { results }
    }
}

impl Component for ResultsView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let r = self.results;
        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let row = |name: &'static str, text: String| {
            Line::from(vec![
                Span::styled(format!("{name:<12}"), label),
                Span::styled(text, value),
            ])
        };

        let lines = vec![
            row("Language", r.language.label().to_string()),
            row("Duration", format_elapsed(r.duration)),
            row("WPM", format!("{:.1}", r.wpm)),
            row("Accuracy", format!("{:.1}%", r.accuracy)),
            row("Words", r.words_typed.to_string()),
            row("Errors", r.total_errors.to_string()),
        ];

        let overlay = centered_rect(50, 60, area);
        frame.render_widget(Clear, overlay);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Results ")
            .title_bottom(Line::from(" Enter play again  Esc quit ").centered())
            .padding(Padding::uniform(1));
        frame.render_widget(Paragraph::new(lines).block(block), overlay);
    }
}

pub struct TaskOverlay<'a> {
    /// `None` on success, the failure text otherwise.
    pub error: Option<&'a str>,
    pub elapsed: Duration,
    pub results: Option<&'a Results>,
}

impl<'a> TaskOverlay<'a> {
    pub fn new(error: Option<&'a str>, elapsed: Duration, results: Option<&'a Results>) -> Self {
        Self {
            error,
            elapsed,
            results,
        }
    }
}

impl Component for TaskOverlay<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 50, area);
        let inner_width = overlay.width.saturating_sub(4).max(1) as usize;

        let (color, title, headline) = match self.error {
            None => (
                Color::Green,
                " Done ",
                format!("Command finished in {}", format_elapsed(self.elapsed)),
            ),
            Some(_) => (
                Color::Red,
                " Error ",
                format!("Command failed after {}", format_elapsed(self.elapsed)),
            ),
        };

        let mut lines = vec![Line::styled(
            headline,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if let Some(error) = self.error {
            lines.push(Line::default());
            lines.extend(
                textwrap::wrap(error, inner_width)
                    .into_iter()
                    .map(|l| Line::raw(l.into_owned())),
            );
        }
        if let Some(results) = self.results {
            lines.push(Line::default());
            lines.push(Line::styled(
                format!(
                    "Last round: {:.1} wpm, {:.1}% accuracy",
                    results.wpm, results.accuracy
                ),
                Style::default().fg(Color::Gray),
            ));
        }

        frame.render_widget(Clear, overlay);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title)
            .title_bottom(Line::from(" Enter, Esc or q to exit ").centered())
            .padding(Padding::horizontal(1));
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block),
            overlay,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sentences::Language;
    use crate::tui::components::buffer_text;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn sample_results() -> Results {
        Results {
            language: Language::Go,
            duration: Duration::from_secs(65),
            wpm: 48.04,
            accuracy: 95.0,
            words_typed: 52,
            total_errors: 4,
        }
    }

    fn render(component: &mut dyn Component) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                component.render(f, f.area());
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_results_view() {
        let results = sample_results();
        let text = render(&mut ResultsView::new(&results));
        assert!(text.contains("Results"));
        assert!(text.contains("01:05"));
        assert!(text.contains("48.0"));
        assert!(text.contains("95.0%"));
    }

    #[test]
    fn test_task_overlay_success() {
        let results = sample_results();
        let text = render(&mut TaskOverlay::new(
            None,
            Duration::from_secs(3),
            Some(&results),
        ));
        assert!(text.contains("Command finished in 00:03"));
        assert!(text.contains("Last round: 48.0 wpm"));
    }

    #[test]
    fn test_task_overlay_error_wraps_message() {
        let text = render(&mut TaskOverlay::new(
            Some("process exited with status 2"),
            Duration::from_secs(1),
            None,
        ));
        assert!(text.contains("Error"));
        assert!(text.contains("Command failed"));
        assert!(text.contains("status 2"));
    }
}
