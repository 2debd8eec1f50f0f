//! # StatusBar Component
//!
//! Bottom line: what the background command is doing, for how long, and
//! whether it is still running.

use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::monitor::TaskState;
use crate::tui::component::Component;

pub struct StatusBar<'a> {
    pub description: &'a str,
    pub elapsed: Duration,
    pub state: TaskState,
}

impl<'a> StatusBar<'a> {
    pub fn new(description: &'a str, elapsed: Duration, state: TaskState) -> Self {
        Self {
            description,
            elapsed,
            state,
        }
    }
}

impl Component for StatusBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let color = match self.state {
            TaskState::Pending | TaskState::Running => Color::Yellow,
            TaskState::Completed => Color::Green,
            TaskState::Failed => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled("● ", Style::default().fg(color)),
            Span::styled("Background: ", Style::default().fg(Color::DarkGray)),
            Span::raw(self.description.to_string()),
            Span::styled(
                format!("  {}  ", format_elapsed(self.elapsed)),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(self.state.label(), Style::default().fg(color)),
        ]);
        frame.render_widget(line, area);
    }
}

/// `mm:ss`, or `h:mm:ss` past the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
