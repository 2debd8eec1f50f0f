//! # Selector Component
//!
//! Centered menu used by the language and word-count screens.
//!
//! The selection index lives in core `App`; a `ListState` is rebuilt from it
//! each frame so the list widget can highlight and scroll.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding};

use crate::tui::component::Component;
use crate::tui::components::centered_rect;

pub struct Selector<'a> {
    pub title: &'a str,
    pub items: Vec<String>,
    pub selected: usize,
    pub help: &'a str,
}

impl<'a> Selector<'a> {
    pub fn new(title: &'a str, items: Vec<String>, selected: usize, help: &'a str) -> Self {
        Self {
            title,
            items,
            selected,
            help,
        }
    }
}

impl Component for Selector<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(50, 60, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(format!(" {} ", self.help)).centered())
            .padding(Padding::horizontal(1));

        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let (marker, style) = if i == self.selected {
                    (
                        "> ",
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    )
                } else {
                    ("  ", Style::default().fg(Color::Gray))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(label.clone(), style),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !self.items.is_empty() {
            list_state.select(Some(self.selected.min(self.items.len() - 1)));
        }

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, overlay, &mut list_state);
    }
}
