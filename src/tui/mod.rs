//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Loop
//!
//! One thread, cooperative, never blocks longer than a tick:
//!
//! 1. Probe the task's completion signal (non-blocking). The first time it
//!    is seen fired, the game switches to the finished overlay and rings
//!    the bell. With `force_exit` the loop renders that frame and ends.
//! 2. Poll input for up to `tick`, then drain every pending event.
//! 3. Drain output notifications. They only mark the frame dirty; the
//!    output buffer is read at draw time.
//! 4. Redraw when something changed, and every tick while playing so the
//!    live WPM moves.
//!
//! ## Terminal restoration
//!
//! Every exit path (normal return, error, panic, signal) funnels into
//! [`restore_terminal`], which acts only once per process.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::fmt;
use std::io::{self, Stdout, stdout};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::error::TryRecvError;

use crate::core::action::{Action, Effect, update};
use crate::core::sentences::Language;
use crate::core::session::Results;
use crate::core::state::{App, GameState};
use crate::monitor::{OutputEvents, TaskHandle};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};
use crate::tui::ui::TaskView;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Set while the terminal is in raw mode on the alternate screen.
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub tick: Duration,
    pub output_lines: usize,
    /// Skip the menus and start a round in this language.
    pub start_language: Option<Language>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            output_lines: 8,
            start_language: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The player left the game; the task may still be running.
    Quit,
    /// The task finished and the game closed because of it.
    TaskFinished,
    /// Ctrl+C inside the game.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub exit: ExitReason,
    pub results: Option<Results>,
}

/// The terminal could not be driven (init, draw or input failure).
#[derive(Debug)]
pub struct SetupError(pub io::Error);

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminal error: {}", self.0)
    }
}

impl std::error::Error for SetupError {}

impl From<io::Error> for SetupError {
    fn from(e: io::Error) -> Self {
        SetupError(e)
    }
}

/// Restores the terminal on drop, whatever way `run` ends.
struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
        let guard = Self;
        execute!(stdout(), EnterAlternateScreen, Hide)?;
        install_panic_hook();
        info!("Terminal modes enabled (raw, alternate screen)");
        Ok(guard)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

/// Leave raw mode and the alternate screen. Safe to call from any thread
/// and any number of times; only the first call after setup does anything.
pub fn restore_terminal() {
    if !TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    let mut out = stdout();
    if let Err(e) = execute!(out, Clear(ClearType::All), Show, LeaveAlternateScreen) {
        warn!("Failed to reset terminal screen: {}", e);
    }
    if let Err(e) = disable_raw_mode() {
        warn!("Failed to disable raw mode: {}", e);
    }
    debug!("Terminal restored");
}

/// Run the game until the player quits or the task ends it.
///
/// `events` is borrowed so the caller can keep following the output after
/// the game closes; it is set to `None` once the channel is closed.
pub fn run(
    mut app: App,
    handle: TaskHandle,
    events: &mut Option<OutputEvents>,
    options: RunOptions,
) -> Result<GameOutcome, SetupError> {
    let _terminal_mode_guard = TerminalModeGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    if let Some(language) = options.start_language {
        update(&mut app, Action::Start(language));
    }

    let exit = event_loop(&mut terminal, &mut app, &handle, events, &options)?;
    info!("Game loop ended: {:?}", exit);

    Ok(GameOutcome {
        exit,
        results: app.final_results(),
    })
}

fn event_loop(
    terminal: &mut Term,
    app: &mut App,
    handle: &TaskHandle,
    events: &mut Option<OutputEvents>,
    options: &RunOptions,
) -> io::Result<ExitReason> {
    draw(terminal, app, handle, options)?;

    loop {
        let mut needs_redraw = false;

        // 1. Completion probe
        if !app.task_finished && handle.is_complete() {
            let error = handle.error();
            info!("Task finished (error: {:?})", error);
            let effect = update(app, Action::TaskFinished { error });
            draw(terminal, app, handle, options)?;
            ring_bell();
            if effect == Effect::FinalFrame {
                return Ok(ExitReason::TaskFinished);
            }
        }

        // 2. Input: first event waits up to a tick, the rest are drained
        let first_event = poll_event_timeout(options.tick);
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            needs_redraw = true;
            let Some(action) = event.to_action() else {
                continue;
            };
            match update(app, action) {
                Effect::Quit => {
                    return Ok(if app.task_finished {
                        ExitReason::TaskFinished
                    } else {
                        ExitReason::Quit
                    });
                }
                Effect::Interrupt => return Ok(ExitReason::Interrupted),
                Effect::None | Effect::Notify | Effect::FinalFrame => {}
            }
        }

        // 3. Output notifications (lossy, only a dirty flag)
        if let Some(rx) = events.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(_) => needs_redraw = true,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        debug!("Output channel closed");
                        *events = None;
                        break;
                    }
                }
            }
        }

        // 4. Redraw
        if needs_redraw || app.state == GameState::Playing {
            draw(terminal, app, handle, options)?;
        }
    }
}

fn draw(
    terminal: &mut Term,
    app: &App,
    handle: &TaskHandle,
    options: &RunOptions,
) -> io::Result<()> {
    let view = TaskView::snapshot(handle, options.output_lines);
    terminal.draw(|f| ui::draw_ui(f, app, &view, options.output_lines))?;
    Ok(())
}

fn ring_bell() {
    if let Err(e) = execute!(stdout(), Print('\x07')) {
        debug!("Bell failed: {}", e);
    }
}
