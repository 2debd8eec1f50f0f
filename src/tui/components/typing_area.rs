//! # TypingArea Component
//!
//! Shows the target sentence with per-character feedback and live stats.
//!
//! ```text
//! ┌ Type this ───────────────────────────┐
//! │ let x = 5                            │   green: typed correctly
//! │                                      │   red:   typed wrong
//! │ WPM 41.8 · Accuracy 96.0% · Words 12 │   grey:  not typed yet
//! └──────────────────────────────────────┘
//! ```
//!
//! The sentence is laid out by hand rather than through `Paragraph::wrap`
//! because each character carries its own style and the cursor must land on
//! an exact cell.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::core::session::{CharState, Session};
use crate::tui::component::Component;

/// Border (2) + padding (2) consumed horizontally.
const HORIZONTAL_OVERHEAD: u16 = 4;

pub struct TypingArea<'a> {
    pub session: &'a Session,
}

impl<'a> TypingArea<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

impl Component for TypingArea<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let states = self.session.chars();
        let chars: Vec<char> = states.iter().map(|s| s.ch).collect();
        let cursor = self.session.typed_len();

        let mut lines: Vec<Line> = layout_rows(&chars, width)
            .into_iter()
            .map(|row| {
                let spans: Vec<Span> = row
                    .map(|i| {
                        let state = &states[i];
                        Span::styled(state.ch.to_string(), char_style(state, i == cursor))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        let stats = self.session.stats();
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "WPM {:.1} · Accuracy {:.1}% · Words {}",
                stats.wpm(),
                stats.accuracy(),
                stats.words_typed
            ),
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Type this ")
            .padding(Padding::horizontal(1));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn char_style(state: &CharState, is_cursor: bool) -> Style {
    if state.typed && state.correct {
        Style::default().fg(Color::Green)
    } else if state.typed {
        Style::default().fg(Color::White).bg(Color::Red)
    } else if is_cursor {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Split `chars` into rows no wider than `width` columns, breaking after a
/// space when one is available. Every character lands in exactly one row.
pub fn layout_rows(chars: &[char], width: usize) -> Vec<Range<usize>> {
    if chars.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![0..chars.len()];
    }

    let mut rows = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut cols = 0;
        let mut end = start;
        let mut last_break = None;
        while end < chars.len() {
            let w = chars[end].width().unwrap_or(0);
            if cols + w > width && end > start {
                break;
            }
            cols += w;
            if chars[end] == ' ' {
                last_break = Some(end + 1);
            }
            end += 1;
        }
        if end < chars.len()
            && let Some(at) = last_break
        {
            end = at;
        }
        rows.push(start..end);
        start = end;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::buffer_text;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_layout_breaks_after_spaces() {
        let text = chars("let mut x = 5");
        let rows = layout_rows(&text, 8);
        assert_eq!(rows, vec![0..8, 8..13]);
    }

    #[test]
    fn test_layout_breaks_long_words() {
        let text = chars("abcdefghij");
        assert_eq!(layout_rows(&text, 4), vec![0..4, 4..8, 8..10]);
    }

    #[test]
    fn test_layout_counts_wide_characters() {
        let text = chars("日本語");
        assert_eq!(layout_rows(&text, 4), vec![0..2, 2..3]);
    }

    #[test]
    fn test_layout_edge_cases() {
        assert!(layout_rows(&[], 10).is_empty());
        assert_eq!(layout_rows(&chars("abc"), 0), vec![0..3]);
    }

    #[test]
    fn test_render_colors_typed_characters() {
        let mut session = Session::new("let x = 5".to_string());
        for ch in "lez".chars() {
            session.type_char(ch);
        }

        let backend = TestBackend::new(40, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut area = TypingArea::new(&session);
        terminal
            .draw(|f| {
                area.render(f, f.area());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        // Content starts after the border and one column of padding.
        assert_eq!(buffer[(2, 1)].symbol(), "l");
        assert_eq!(buffer[(2, 1)].fg, Color::Green);
        assert_eq!(buffer[(4, 1)].symbol(), "t");
        assert_eq!(buffer[(4, 1)].bg, Color::Red);
        assert!(buffer[(5, 1)].modifier.contains(Modifier::UNDERLINED));
        assert_eq!(buffer[(6, 1)].fg, Color::DarkGray);

        let text = buffer_text(buffer);
        assert!(text.contains("Type this"));
        assert!(text.contains("Accuracy 66.7%"));
    }
}
