use std::sync::Arc;

use devtyper::core::action::{Action, Effect, update};
use devtyper::core::sentences::{Language, SentenceCatalog, SentenceSource};
use devtyper::core::session::Session;
use devtyper::core::state::{App, GameState};

fn app() -> App {
    let sentences = SentenceSource::with_seed(Arc::new(SentenceCatalog::builtin()), 7);
    App::new(sentences, "Building project".to_string())
}

fn type_str(app: &mut App, text: &str) {
    for ch in text.chars() {
        update(app, Action::Type(ch));
    }
}

fn session(app: &App) -> &Session {
    app.session.as_ref().expect("a round is active")
}

#[test]
fn test_correcting_a_typo_keeps_the_error_count() {
    let mut session = Session::new("let x = 5".to_string());
    for ch in "let y".chars() {
        session.type_char(ch);
    }
    session.backspace();
    session.backspace();
    for ch in " x = 5".chars() {
        session.type_char(ch);
    }

    assert_eq!(session.input(), "let x = 5");
    assert!(session.confirm());
    let stats = session.stats();
    assert_eq!(stats.keystrokes, 11);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.words_typed, 4);
    assert!((stats.accuracy() - 100.0 * 10.0 / 11.0).abs() < 1e-9);
}

#[test]
fn test_full_round_through_the_menus() {
    let mut app = app();
    assert_eq!(app.state, GameState::ModeSelect);

    // Go is first in the menu.
    assert_eq!(update(&mut app, Action::Confirm), Effect::None);
    assert_eq!(app.state, GameState::Playing);
    assert_eq!(app.sentences.language(), Language::Go);

    let target = session(&app).target().to_string();
    type_str(&mut app, &target);
    update(&mut app, Action::Confirm);

    let words = target.split_whitespace().count();
    assert_eq!(session(&app).stats().words_typed, words);
    assert_eq!(session(&app).stats().errors, 0);
    assert_eq!(session(&app).input(), "");

    update(&mut app, Action::Back);
    assert_eq!(app.state, GameState::Results);
    let results = app.results.as_ref().unwrap();
    assert_eq!(results.language, Language::Go);
    assert_eq!(results.words_typed, words);
    assert_eq!(results.accuracy, 100.0);

    assert_eq!(update(&mut app, Action::Confirm), Effect::None);
    assert_eq!(app.state, GameState::ModeSelect);
    assert_eq!(update(&mut app, Action::Back), Effect::Quit);
}

#[test]
fn test_mismatched_sentence_is_not_accepted() {
    let mut app = app();
    update(&mut app, Action::Start(Language::Rust));
    let target = session(&app).target().to_string();

    type_str(&mut app, "#");
    update(&mut app, Action::Confirm);
    assert_eq!(session(&app).target(), target);
    assert_eq!(session(&app).stats().words_typed, 0);
    assert_eq!(session(&app).stats().errors, 1);
}

#[test]
fn test_generic_round_uses_chosen_word_count() {
    let mut app = app();
    update(&mut app, Action::Up);
    assert_eq!(app.highlighted_language(), Language::Generic);
    update(&mut app, Action::Confirm);
    assert_eq!(app.state, GameState::WordCountSelect);

    update(&mut app, Action::Down);
    update(&mut app, Action::Confirm);
    assert_eq!(app.state, GameState::Playing);
    assert_eq!(session(&app).target().split(' ').count(), 25);
}

#[test]
fn test_task_finishing_mid_round_keeps_results() {
    let mut app = app();
    update(&mut app, Action::Start(Language::JavaScript));
    type_str(&mut app, "x");

    let effect = update(&mut app, Action::TaskFinished { error: None });
    assert_eq!(effect, Effect::Notify);
    assert_eq!(app.state, GameState::TaskComplete);
    assert!(app.session.is_none());
    assert_eq!(app.results.as_ref().unwrap().language, Language::JavaScript);

    // Observed once.
    let again = update(
        &mut app,
        Action::TaskFinished {
            error: Some("late".to_string()),
        },
    );
    assert_eq!(again, Effect::None);
    assert_eq!(app.state, GameState::TaskComplete);

    assert_eq!(update(&mut app, Action::Type('q')), Effect::Quit);
}

#[test]
fn test_force_exit_asks_for_a_final_frame() {
    let mut app = app();
    app.force_exit = true;
    let effect = update(
        &mut app,
        Action::TaskFinished {
            error: Some("command exited with status 2".to_string()),
        },
    );
    assert_eq!(effect, Effect::FinalFrame);
    assert_eq!(
        app.state,
        GameState::Error("command exited with status 2".to_string())
    );
}

#[test]
fn test_ctrl_c_interrupts_from_any_screen() {
    let mut app = app();
    assert_eq!(update(&mut app, Action::Interrupt), Effect::Interrupt);
    update(&mut app, Action::Start(Language::Go));
    assert_eq!(update(&mut app, Action::Interrupt), Effect::Interrupt);
}
