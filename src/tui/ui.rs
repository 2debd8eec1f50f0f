use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::sentences::Language;
use crate::core::state::{App, GameState, WORD_COUNT_OPTIONS};
use crate::monitor::{TaskHandle, TaskState};
use crate::tui::component::Component;
use crate::tui::components::{
    ResultsView, Selector, StatusBar, TaskOutput, TaskOverlay, TitleBar, TypingArea,
};

/// What the frame shows of the background command. Taken once per frame
/// from the `TaskHandle` so the draw itself never touches shared state.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub output: Vec<String>,
    pub elapsed: Duration,
    pub state: TaskState,
}

impl TaskView {
    pub fn snapshot(handle: &TaskHandle, lines: usize) -> Self {
        Self {
            output: handle.recent_output(lines),
            elapsed: handle.elapsed(),
            state: handle.state(),
        }
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, task: &TaskView, output_lines: usize) {
    use Constraint::{Length, Min};
    let output_height = if output_lines == 0 {
        0
    } else {
        u16::try_from(output_lines)
            .unwrap_or(u16::MAX)
            .saturating_add(1)
    };
    let layout = Layout::vertical([Length(1), Min(0), Length(output_height), Length(1)]);
    let [title_area, body_area, output_area, status_area] = layout.areas(frame.area());

    let language = (app.state == GameState::Playing).then(|| app.sentences.language());
    TitleBar::new(&app.state, language).render(frame, title_area);

    draw_body(frame, app, task, body_area);

    if output_height > 0 {
        TaskOutput::new(&task.output).render(frame, output_area);
    }
    StatusBar::new(&app.task_description, task.elapsed, task.state).render(frame, status_area);
}

fn draw_body(frame: &mut Frame, app: &App, task: &TaskView, area: Rect) {
    match &app.state {
        GameState::ModeSelect => {
            let items = Language::ALL.iter().map(|l| l.label().to_string()).collect();
            Selector::new(
                "Choose a language",
                items,
                app.selected_language,
                "Enter select  Esc quit",
            )
            .render(frame, area);
        }
        GameState::WordCountSelect => {
            let items = WORD_COUNT_OPTIONS
                .iter()
                .map(|n| format!("{n} words"))
                .collect();
            Selector::new(
                "How many words?",
                items,
                app.selected_count,
                "Enter start  Esc back",
            )
            .render(frame, area);
        }
        GameState::Playing => {
            if let Some(session) = &app.session {
                TypingArea::new(session).render(frame, area);
            }
        }
        GameState::Results => {
            if let Some(results) = &app.results {
                ResultsView::new(results).render(frame, area);
            }
        }
        GameState::TaskComplete => {
            TaskOverlay::new(None, task.elapsed, app.results.as_ref()).render(frame, area);
        }
        GameState::Error(message) => {
            TaskOverlay::new(Some(message), task.elapsed, app.results.as_ref())
                .render(frame, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use crate::tui::components::buffer_text;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn view(lines: &[&str]) -> TaskView {
        TaskView {
            output: lines.iter().map(|l| l.to_string()).collect(),
            elapsed: Duration::from_secs(12),
            state: TaskState::Running,
        }
    }

    fn render(app: &App, task: &TaskView) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                draw_ui(f, app, task, 4);
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_draw_mode_select() {
        let app = test_app();
        let text = render(&app, &view(&["\x1b[32mStep 1/3\x1b[0m"]));
        assert!(text.contains("Choose a language"));
        assert!(text.contains("javascript"));
        assert!(text.contains("Step 1/3"));
        assert!(!text.contains("\x1b"));
        assert!(text.contains("Running command"));
        assert!(text.contains("00:12"));
    }

    #[test]
    fn test_draw_playing_shows_target() {
        let mut app = test_app();
        update(&mut app, Action::Start(Language::Rust));
        let target = app.session.as_ref().unwrap().target().to_string();
        let text = render(&app, &view(&[]));
        assert!(text.contains("Type this"));
        let first_word = target.split(' ').next().unwrap();
        assert!(text.contains(first_word));
        assert!(text.contains("rust"));
    }

    #[test]
    fn test_draw_every_state() {
        let mut app = test_app();
        let task = view(&["line"]);
        render(&app, &task);

        update(&mut app, Action::Start(Language::Generic));
        update(&mut app, Action::Back);
        assert!(render(&app, &task).contains("Results"));

        update(&mut app, Action::Confirm);
        update(&mut app, Action::Confirm);
        assert!(render(&app, &task).contains("How many words?"));

        update(
            &mut app,
            Action::TaskFinished {
                error: Some("command exited with status 1".to_string()),
            },
        );
        let text = render(&app, &task);
        assert!(text.contains("Command failed"));
        assert!(text.contains("status 1"));
    }

    #[test]
    fn test_huge_output_lines_fit_the_frame() {
        let app = test_app();
        for lines in [u16::MAX as usize, usize::MAX] {
            let backend = TestBackend::new(80, 24);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal
                .draw(|f| {
                    draw_ui(f, &app, &view(&["x"]), lines);
                })
                .unwrap();
            assert_eq!(terminal.backend().buffer().area.height, 24);
        }
    }

    #[test]
    fn test_zero_output_lines_hides_panel() {
        let app = test_app();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                draw_ui(f, &app, &view(&["hidden"]), 0);
            })
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(!text.contains("hidden"));
    }
}
