//! # TUI Components
//!
//! All UI components for the terminal interface. Each one receives its data
//! as props (struct fields, mostly borrowed from `App` or the task snapshot)
//! and renders through the [`Component`](crate::tui::component::Component)
//! trait.
//!
//! ```text
//! components/
//! ├── mod.rs          (this file, shared layout helpers)
//! ├── title_bar.rs    (top line: app, language, key hints)
//! ├── selector.rs     (language / word-count menus)
//! ├── typing_area.rs  (target sentence with per-character feedback)
//! ├── task_output.rs  (cleaned tail of the command output)
//! ├── status_bar.rs   (command description, elapsed time, state)
//! └── overlay.rs      (results and task-finished boxes)
//! ```

pub mod overlay;
pub mod selector;
pub mod status_bar;
pub mod task_output;
pub mod title_bar;
pub mod typing_area;

pub use overlay::{ResultsView, TaskOverlay};
pub use selector::Selector;
pub use status_bar::StatusBar;
pub use task_output::TaskOutput;
pub use title_bar::TitleBar;
pub use typing_area::TypingArea;

use ratatui::layout::{Constraint, Layout, Rect};

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

/// Rendered text of a test buffer, one line per row.
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width.max(1))
        .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
