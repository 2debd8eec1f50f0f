//! # Application State
//!
//! Core game state for DevTyper. Domain logic only, no TUI types.
//! Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── state: GameState              // which screen is active
//! ├── sentences: SentenceSource     // practice text generator
//! ├── selected_language: usize      // cursor in the language menu
//! ├── selected_count: usize         // cursor in the word-count menu
//! ├── session: Option<Session>      // active round (Playing only)
//! ├── results: Option<Results>      // last finished round
//! ├── force_exit: bool              // end the loop when the task finishes
//! ├── task_description: String      // status line text
//! └── task_finished: bool           // completion already observed
//! ```
//!
//! State changes only happen through `update(app, action)` in action.rs.

use crate::core::config::ResolvedConfig;
use crate::core::sentences::{Language, SentenceSource};
use crate::core::session::{Results, Session};

/// Word counts offered for generic practice.
pub const WORD_COUNT_OPTIONS: [usize; 4] = [10, 25, 50, 100];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameState {
    ModeSelect,
    WordCountSelect,
    Playing,
    Results,
    TaskComplete,
    Error(String),
}

impl GameState {
    /// Overlays shown after the background task finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::TaskComplete | GameState::Error(_))
    }
}

pub struct App {
    pub state: GameState,
    pub sentences: SentenceSource,
    pub selected_language: usize,
    pub selected_count: usize,
    pub session: Option<Session>,
    pub results: Option<Results>,
    pub force_exit: bool,
    pub task_description: String,
    pub task_finished: bool,
}

impl App {
    pub fn new(sentences: SentenceSource, task_description: String) -> Self {
        Self {
            state: GameState::ModeSelect,
            sentences,
            selected_language: 0,
            selected_count: 0,
            session: None,
            results: None,
            force_exit: false,
            task_description,
            task_finished: false,
        }
    }

    /// Build the app from resolved settings. A configured default language
    /// preselects the menu entries; the caller decides whether to skip it.
    pub fn from_config(
        sentences: SentenceSource,
        config: &ResolvedConfig,
        task_description: String,
    ) -> Self {
        let mut app = Self::new(sentences, task_description);
        app.force_exit = config.force_exit;
        if let Some(language) = config.language {
            app.selected_language = Language::ALL
                .iter()
                .position(|l| *l == language)
                .unwrap_or(0);
        }
        app.selected_count = WORD_COUNT_OPTIONS
            .iter()
            .position(|n| *n == config.word_count)
            .unwrap_or(0);
        app.sentences.set_word_count(config.word_count);
        app
    }

    pub fn highlighted_language(&self) -> Language {
        Language::ALL[self.selected_language % Language::ALL.len()]
    }

    pub fn highlighted_word_count(&self) -> usize {
        WORD_COUNT_OPTIONS[self.selected_count % WORD_COUNT_OPTIONS.len()]
    }

    /// Results worth printing after the loop: the last finished round.
    pub fn final_results(&self) -> Option<Results> {
        self.results.clone()
    }
}
