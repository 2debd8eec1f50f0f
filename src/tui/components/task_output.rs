//! # TaskOutput Component
//!
//! The last few lines of the background command, under the game.
//!
//! Raw pty output is full of color codes, cursor movement and progress bars
//! that redraw themselves with `\r`. Lines are cleaned before display: only
//! the last non-empty `\r` segment of a line is kept, and `strip-ansi-escapes`
//! drops escape sequences and control characters from it.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::tui::component::Component;

pub struct TaskOutput<'a> {
    pub lines: &'a [String],
}

impl<'a> TaskOutput<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines }
    }
}

impl Component for TaskOutput<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Output ")
            .padding(Padding::horizontal(1));

        let visible = area.height.saturating_sub(1) as usize;
        let cleaned: Vec<String> = self.lines.iter().map(|l| clean_line(l)).collect();
        let start = cleaned.len().saturating_sub(visible);

        let lines: Vec<Line> = if cleaned.is_empty() {
            vec![Line::styled(
                "waiting for output...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )]
        } else {
            cleaned[start..]
                .iter()
                .map(|l| Line::styled(l.clone(), Style::default().fg(Color::Gray)))
                .collect()
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// What a terminal would show for one raw output line.
pub fn clean_line(raw: &str) -> String {
    raw.split('\r')
        .map(strip_ansi)
        .filter(|segment| !segment.trim().is_empty())
        .last()
        .unwrap_or_default()
}

/// Remove escape sequences and control characters. Tabs become four spaces.
pub fn strip_ansi(input: &str) -> String {
    // The stripper drops every control byte except newline, tabs included.
    let expanded = input.replace('\t', "    ");
    let stripped = strip_ansi_escapes::strip(expanded.as_bytes());
    String::from_utf8_lossy(&stripped).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::buffer_text;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_strip_sgr_colors() {
        assert_eq!(strip_ansi("\x1b[1;32mCompiling\x1b[0m serde"), "Compiling serde");
    }

    #[test]
    fn test_strip_cursor_movement_and_titles() {
        assert_eq!(strip_ansi("\x1b[2K\x1b[1Gdone"), "done");
        assert_eq!(strip_ansi("\x1b]0;npm install\x07added 12"), "added 12");
        assert_eq!(strip_ansi("\x1b]8;;http://x\x1b\\link"), "link");
        assert_eq!(strip_ansi("\x1b(Bplain"), "plain");
    }

    #[test]
    fn test_strip_control_characters() {
        assert_eq!(strip_ansi("a\x08b\x07c\td"), "abc    d");
    }

    #[test]
    fn test_unterminated_sequence_is_dropped() {
        assert_eq!(strip_ansi("ok\x1b[38;5"), "ok");
    }

    #[test]
    fn test_clean_line_keeps_last_progress_state() {
        assert_eq!(clean_line("10%\r50%\r100%"), "100%");
        assert_eq!(clean_line("Downloading\r\x1b[2K\r"), "Downloading");
        assert_eq!(clean_line(""), "");
    }

    #[test]
    fn test_render_shows_latest_lines() {
        let lines: Vec<String> = (1..=10).map(|i| format!("line {i}")).collect();
        let backend = TestBackend::new(30, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut output = TaskOutput::new(&lines);
        terminal
            .draw(|f| {
                output.render(f, f.area());
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Output"));
        assert!(text.contains("line 10"));
        assert!(text.contains("line 8"));
        assert!(!text.contains("line 7"));
    }

    #[test]
    fn test_render_placeholder_without_output() {
        let backend = TestBackend::new(30, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut output = TaskOutput::new(&[]);
        terminal
            .draw(|f| {
                output.render(f, f.area());
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("waiting for output"));
    }
}
