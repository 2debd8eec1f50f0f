//! # Actions
//!
//! Everything that can happen in DevTyper becomes an `Action`.
//! User presses Enter? That's `Action::Confirm`.
//! Background command exits? That's `Action::TaskFinished { .. }`.
//!
//! `update()` takes the current state and an action, mutates the state and
//! returns an `Effect` for the adapter to carry out. No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! The meaning of a key depends on the active screen:
//!
//! | State           | Up/Down      | Enter           | Esc            |
//! |-----------------|--------------|-----------------|----------------|
//! | ModeSelect      | language     | choose          | quit           |
//! | WordCountSelect | word count   | start round     | back to menu   |
//! | Playing         | -            | check sentence  | show results   |
//! | Results         | -            | play again      | quit           |
//! | TaskComplete    | -            | quit            | quit           |
//! | Error           | -            | quit            | quit           |

use log::{debug, info};

use crate::core::sentences::Language;
use crate::core::session::Session;
use crate::core::state::{App, GameState, WORD_COUNT_OPTIONS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Confirm,
    Back,
    Type(char),
    Backspace,
    /// Replace the current sentence without scoring it.
    Skip,
    /// Jump straight into a round, bypassing the menus.
    Start(Language),
    /// Ctrl+C: the entry shell handles it like SIGINT.
    Interrupt,
    TaskFinished {
        error: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Interrupt,
    /// Task finished: ring the bell and keep the overlay up.
    Notify,
    /// Task finished with `force_exit`: render once more, then stop.
    FinalFrame,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?} in {:?}", action, app.state);

    match action {
        Action::Interrupt => return Effect::Interrupt,
        Action::TaskFinished { error } => return task_finished(app, error),
        Action::Start(language) => {
            start_round(app, language);
            return Effect::None;
        }
        _ => {}
    }

    match app.state {
        GameState::ModeSelect => mode_select(app, action),
        GameState::WordCountSelect => word_count_select(app, action),
        GameState::Playing => playing(app, action),
        GameState::Results => match action {
            Action::Confirm => {
                app.state = GameState::ModeSelect;
                Effect::None
            }
            Action::Back => Effect::Quit,
            _ => Effect::None,
        },
        GameState::TaskComplete | GameState::Error(_) => match action {
            Action::Confirm | Action::Back | Action::Type('q') => Effect::Quit,
            _ => Effect::None,
        },
    }
}

fn mode_select(app: &mut App, action: Action) -> Effect {
    let len = Language::ALL.len();
    match action {
        Action::Up => app.selected_language = (app.selected_language + len - 1) % len,
        Action::Down => app.selected_language = (app.selected_language + 1) % len,
        Action::Confirm => {
            let language = app.highlighted_language();
            if language.uses_word_count() {
                app.sentences.set_language(language);
                app.state = GameState::WordCountSelect;
            } else {
                start_round(app, language);
            }
        }
        Action::Back => return Effect::Quit,
        _ => {}
    }
    Effect::None
}

fn word_count_select(app: &mut App, action: Action) -> Effect {
    let len = WORD_COUNT_OPTIONS.len();
    match action {
        Action::Up => app.selected_count = (app.selected_count + len - 1) % len,
        Action::Down => app.selected_count = (app.selected_count + 1) % len,
        Action::Confirm => {
            app.sentences.set_word_count(app.highlighted_word_count());
            start_round(app, Language::Generic);
        }
        Action::Back => app.state = GameState::ModeSelect,
        _ => {}
    }
    Effect::None
}

fn playing(app: &mut App, action: Action) -> Effect {
    let Some(session) = app.session.as_mut() else {
        app.state = GameState::ModeSelect;
        return Effect::None;
    };

    match action {
        Action::Type(ch) => {
            session.type_char(ch);
        }
        Action::Backspace => {
            session.backspace();
        }
        Action::Confirm => {
            if session.confirm() {
                let next = app.sentences.generate();
                session.next_sentence(next);
            }
        }
        Action::Skip => {
            let next = app.sentences.generate();
            session.next_sentence(next);
        }
        Action::Back => {
            finish_round(app);
            app.state = GameState::Results;
        }
        _ => {}
    }
    Effect::None
}

fn start_round(app: &mut App, language: Language) {
    if let Some(index) = Language::ALL.iter().position(|l| *l == language) {
        app.selected_language = index;
    }
    app.sentences.set_language(language);
    let target = app.sentences.generate();
    info!("Starting {} round", language);
    app.session = Some(Session::new(target));
    app.state = GameState::Playing;
}

/// Close the active round, keeping its results.
fn finish_round(app: &mut App) {
    if let Some(session) = app.session.take() {
        let results = session.results(app.sentences.language());
        info!(
            "Round finished: {:.1} wpm, {:.1}% accuracy",
            results.wpm, results.accuracy
        );
        app.results = Some(results);
    }
}

fn task_finished(app: &mut App, error: Option<String>) -> Effect {
    if app.task_finished {
        return Effect::None;
    }
    app.task_finished = true;

    if app.state == GameState::Playing {
        finish_round(app);
    }
    app.state = match error {
        None => GameState::TaskComplete,
        Some(message) => GameState::Error(message),
    };

    if app.force_exit {
        Effect::FinalFrame
    } else {
        Effect::Notify
    }
}
