use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use devtyper::core::config::{self, CliOverrides, DevTyperConfig, ResolvedConfig};
use devtyper::core::sentences::{Language, SentenceCatalog, SentenceSource};
use devtyper::core::state::App;
use devtyper::monitor::{OutputChunk, OutputEvents, Task, TaskHandle, TaskOptions, detect};
use devtyper::tui::{self, ExitReason, RunOptions};

/// How long to wait for the last output after the command exits.
const CAPTURE_DRAIN: Duration = Duration::from_millis(500);
/// Output lines shown when a command fails.
const FAILURE_TAIL_LINES: usize = 20;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "devtyper",
    version,
    about = "Practice typing while your slow commands run"
)]
struct Args {
    /// Quit the game as soon as the command finishes
    #[arg(long)]
    force_exit: bool,

    /// Keep the command running after you leave the game
    #[arg(long, value_name = "BOOL")]
    keep_alive: Option<bool>,

    /// Start the game without asking
    #[arg(short = 'y', long)]
    yes: bool,

    /// Practice language; skips the language menu
    #[arg(short, long, value_enum)]
    lang: Option<Language>,

    /// Log file [default: ~/.devtyper/devtyper.log]
    #[arg(long, value_name = "PATH")]
    log_file: Option<std::path::PathBuf>,

    /// The command to run, with its arguments
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logging first, so config warnings are recorded.
    init_logging(args.log_file.as_deref());
    let resolved = load_settings(
        config::config_path().as_deref(),
        &CliOverrides {
            force_exit: args.force_exit,
            keep_alive: args.keep_alive,
            yes: args.yes,
            language: args.lang,
        },
    );
    info!("DevTyper starting: {:?}", args.command);
    info!("Config: {:?}", resolved);

    let command_line = args.command.join(" ");
    let detection = detect(&command_line);
    if let Some(hint) = detection.interactive_hint {
        eprintln!("'{command_line}' asks questions on the keyboard, which the game would swallow.");
        eprintln!("Run it without DevTyper, or use the non-interactive form:");
        eprintln!("  {hint}");
        return ExitCode::SUCCESS;
    }

    let options = TaskOptions {
        output_cap: resolved.output_cap,
        stop_grace: resolved.stop_grace,
        ..TaskOptions::default()
    }
    .with_terminal_size();
    let Some(mut task) = Task::from_argv(&args.command, options) else {
        eprintln!("devtyper: no command given");
        return ExitCode::from(2);
    };
    if let Err(e) = task.start() {
        error!("Failed to start task: {}", e);
        eprintln!("devtyper: {e}");
        return ExitCode::FAILURE;
    }
    let handle = task.handle();
    let mut events = task.take_output_events();

    spawn_signal_listener(handle.clone());

    let play = !resolved.ask_before_playing || ask_to_play().await;
    if play {
        let sentences = SentenceSource::new(Arc::new(SentenceCatalog::builtin()));
        let app = App::from_config(sentences, &resolved, detection.description.to_string());
        let run_options = RunOptions {
            tick: resolved.tick,
            output_lines: resolved.output_lines,
            start_language: resolved.language,
        };

        match tui::run(app, handle.clone(), &mut events, run_options) {
            Ok(outcome) => {
                if let Some(results) = &outcome.results {
                    println!("{results}");
                }
                match outcome.exit {
                    ExitReason::Interrupted => {
                        stop_task(&handle).await;
                        eprintln!("Interrupted");
                        return ExitCode::from(EXIT_INTERRUPTED);
                    }
                    ExitReason::Quit if !handle.is_complete() => {
                        if !continue_after_game(&handle, &resolved, &mut events).await {
                            stop_task(&handle).await;
                            println!("Stopped '{command_line}'");
                        }
                    }
                    ExitReason::Quit | ExitReason::TaskFinished => {}
                }
            }
            Err(e) => {
                tui::restore_terminal();
                warn!("Game unavailable: {}", e);
                eprintln!("devtyper: {e}; waiting for the command without the game");
                wait_headless(&handle, &mut events).await;
            }
        }
    } else {
        println!("Waiting for '{command_line}'...");
        wait_headless(&handle, &mut events).await;
    }

    report_task(&handle)
}

/// The logger accepts everything; `load_settings` lowers the global level
/// once the configured one is known.
fn init_logging(path: Option<&Path>) {
    let Some(path) = path
        .map(Path::to_path_buf)
        .or_else(config::default_log_path)
    else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&path) {
        let _ = WriteLogger::init(LevelFilter::Trace, log_config, log_file);
    }
    log::set_max_level(LevelFilter::Info);
}

/// Load the config file (defaults when missing or broken), resolve it
/// against env and CLI, and apply the configured log level.
fn load_settings(path: Option<&Path>, cli: &CliOverrides) -> ResolvedConfig {
    let loaded = match path {
        Some(path) => config::load_config_from(path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(DevTyperConfig::default())
        }
    };
    let file_config = loaded.unwrap_or_else(|e| {
        warn!("Ignoring config file, using defaults: {}", e);
        DevTyperConfig::default()
    });

    let resolved = config::resolve(&file_config, cli);
    log::set_max_level(resolved.log_level);
    resolved
}

/// `[Y/n]` prompt on the plain terminal. Enter or EOF means yes.
async fn ask_to_play() -> bool {
    let answer = tokio::task::spawn_blocking(|| {
        print!("Want to practice typing while waiting? [Y/n] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await;

    match answer {
        Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes"),
        Ok(Err(e)) => {
            warn!("Could not read answer: {}", e);
            false
        }
        Err(e) => {
            warn!("Prompt task failed: {}", e);
            false
        }
    }
}

/// After the player leaves: keep following the command or let it go.
/// Returns `false` when the command should be stopped.
async fn continue_after_game(
    handle: &TaskHandle,
    resolved: &ResolvedConfig,
    events: &mut Option<OutputEvents>,
) -> bool {
    if !resolved.keep_alive {
        return false;
    }
    println!("Still waiting for '{}'...", handle.command_line());
    // Output shown during the game is stale by now.
    if let Some(rx) = events.as_mut() {
        while rx.try_recv().is_ok() {}
    }
    wait_headless(handle, events).await;
    true
}

/// Print output as it arrives until the command finishes.
async fn wait_headless(handle: &TaskHandle, events: &mut Option<OutputEvents>) {
    let done = handle.done().clone();
    let mut waiter = tokio::task::spawn_blocking(move || done.wait());

    loop {
        let chunk = tokio::select! {
            _ = &mut waiter => break,
            chunk = next_chunk(events) => chunk,
        };
        match chunk {
            Some(bytes) => write_stdout(&bytes),
            None => *events = None,
        }
    }

    handle.wait_for_capture(CAPTURE_DRAIN);
    if let Some(rx) = events.as_mut() {
        while let Ok(bytes) = rx.try_recv() {
            write_stdout(&bytes);
        }
    }
}

async fn next_chunk(events: &mut Option<OutputEvents>) -> Option<OutputChunk> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn write_stdout(bytes: &[u8]) {
    let mut out = io::stdout().lock();
    let _ = out.write_all(bytes);
    let _ = out.flush();
}

async fn stop_task(handle: &TaskHandle) {
    let handle = handle.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || handle.stop()).await {
        warn!("Stop task failed: {}", e);
    }
}

/// Final line for the user, and the process exit code.
fn report_task(handle: &TaskHandle) -> ExitCode {
    let elapsed = handle.elapsed().as_secs();
    if !handle.is_complete() {
        if handle.stop_requested() {
            eprintln!(
                "'{}' was stopped after {}s and has not exited yet",
                handle.command_line(),
                elapsed
            );
        }
    } else if let Some(error) = handle.error() {
        handle.wait_for_capture(CAPTURE_DRAIN);
        let tail = handle.recent_output(FAILURE_TAIL_LINES);
        if !tail.is_empty() {
            eprintln!("--- last output ---");
            for line in tail {
                eprintln!("{line}");
            }
        }
        eprintln!("'{}' failed after {}s: {}", handle.command_line(), elapsed, error);
    } else {
        println!("'{}' finished in {}s", handle.command_line(), elapsed);
    }

    ExitCode::from(task_exit_code(
        handle.is_complete(),
        handle.has_error(),
        handle.stop_requested(),
    ))
}

/// 0 for a clean finish, 1 when the command failed or was stopped by us.
fn task_exit_code(complete: bool, failed: bool, stopped: bool) -> u8 {
    match (complete, failed, stopped) {
        (true, true, _) => 1,
        (true, false, _) => 0,
        (false, _, true) => 1,
        (false, _, false) => 0,
    }
}

/// SIGINT/SIGTERM: stop the command, give the terminal back, exit 130.
fn spawn_signal_listener(handle: TaskHandle) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Signal received, stopping '{}'", handle.command_line());
        if let Err(e) = tokio::task::spawn_blocking(move || handle.stop()).await {
            warn!("Stop task failed: {}", e);
        }
        tui::restore_terminal();
        eprintln!("\nInterrupted");
        std::process::exit(i32::from(EXIT_INTERRUPTED));
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
