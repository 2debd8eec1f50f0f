//! # Background Task
//!
//! Runs one external command inside a pseudo-terminal so that tools which
//! check `isatty()` keep their interactive formatting (colors, progress bars).
//!
//! ```text
//!               Task::start()
//!                    │
//!        ┌───────────┴────────────┐
//!        ▼                        ▼
//!  capture thread           wait thread
//!  read pty → buffer        child.wait()
//!        │  try_send chunk        │ drain (bounded)
//!        ▼                        ▼
//!   OutputEvents (lossy)     state + error, done.fire()
//! ```
//!
//! The entry shell owns the [`Task`]. Everything else gets a [`TaskHandle`],
//! which can observe state and request a stop but cannot start the task or
//! take its output events.

use std::fmt;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use portable_pty::{Child, ChildKiller, CommandBuilder, MasterPty, PtySize, native_pty_system};
use tokio::sync::mpsc;

use crate::monitor::completion::Completion;
use crate::monitor::output::{self, DEFAULT_OUTPUT_CAP, OutputBuffer};

/// One chunk of raw pty output, as read.
pub type OutputChunk = Vec<u8>;

/// Receiving end of the lossy output-notification channel.
///
/// Chunks are dropped when the receiver falls behind. The task's buffer is
/// the authoritative record; treat a received chunk as "something changed".
pub type OutputEvents = mpsc::Receiver<OutputChunk>;

pub const DEFAULT_STOP_GRACE: Duration = Duration::from_millis(100);
pub const DEFAULT_NOTIFY_CAPACITY: usize = 64;

/// How long the wait thread lets capture drain after the child exits.
const DRAIN_GRACE: Duration = Duration::from_millis(100);
const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Created, not yet started (or failed to start).
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskState {
    pub fn label(self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// The task could not be started. Fatal: the task never reaches `Running`.
#[derive(Debug)]
pub enum SpawnError {
    /// `start()` was already called on this task.
    AlreadyStarted,
    /// Pseudo-terminal allocation failed.
    Pty(String),
    /// The command could not be launched (not found, not executable, ...).
    Spawn { program: String, reason: String },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::AlreadyStarted => write!(f, "task was already started"),
            SpawnError::Pty(msg) => write!(f, "could not allocate a pseudo-terminal: {msg}"),
            SpawnError::Spawn { program, reason } => {
                write!(f, "could not start '{program}': {reason}")
            }
        }
    }
}

impl std::error::Error for SpawnError {}

/// Recorded on the task when it ends badly. Never crosses a thread boundary
/// as a panic or `Err`; read it through [`TaskHandle::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The child exited with a non-zero status.
    Exited(u32),
    /// Waiting on the child failed.
    Wait(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Exited(code) => write!(f, "command exited with status {code}"),
            RuntimeError::Wait(msg) => write!(f, "failed to wait for command: {msg}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone)]
pub struct TaskOptions {
    /// Maximum retained output in bytes.
    pub output_cap: usize,
    /// Time between the interrupt and the kill in `stop()`.
    pub stop_grace: Duration,
    pub cols: u16,
    pub rows: u16,
    /// Bound of the output-notification channel.
    pub notify_capacity: usize,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            output_cap: DEFAULT_OUTPUT_CAP,
            stop_grace: DEFAULT_STOP_GRACE,
            cols: 80,
            rows: 24,
            notify_capacity: DEFAULT_NOTIFY_CAPACITY,
        }
    }
}

impl TaskOptions {
    /// Size the pty like the terminal we are running in.
    pub fn with_terminal_size(mut self) -> Self {
        if let Ok((cols, rows)) = crossterm::terminal::size() {
            self.cols = cols;
            self.rows = rows;
        }
        self
    }
}

// ============================================================================
// Shared state
// ============================================================================

struct Status {
    state: TaskState,
    error: Option<RuntimeError>,
    started: Option<(DateTime<Local>, Instant)>,
    finished: Option<Instant>,
}

struct ProcessControl {
    pid: Option<u32>,
    killer: Box<dyn ChildKiller + Send + Sync>,
    // Held so the pty stays open while the child runs; dropped by `stop()`.
    _master: Box<dyn MasterPty + Send>,
}

impl ProcessControl {
    fn interrupt(&mut self) {
        #[cfg(unix)]
        self.signal_group(libc::SIGINT);
        #[cfg(not(unix))]
        self.terminate();
    }

    /// SIGKILL the whole process group. portable-pty's own killer only sends
    /// SIGHUP on unix, which a child may ignore.
    fn force_kill(&mut self) {
        #[cfg(unix)]
        self.signal_group(libc::SIGKILL);
        #[cfg(not(unix))]
        self.terminate();
    }

    #[cfg(unix)]
    fn signal_group(&mut self, signal: libc::c_int) {
        let Some(pid) = self.pid else {
            if let Err(e) = self.killer.kill() {
                warn!("Failed to terminate task: {}", e);
            }
            return;
        };
        let pid = pid as libc::pid_t;
        // The pty child leads its own session, so its pid is also its
        // process group id.
        let rc = unsafe { libc::kill(-pid, signal) };
        if rc != 0 {
            unsafe {
                libc::kill(pid, signal);
            }
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) {
        if let Err(e) = self.killer.kill() {
            warn!("Failed to terminate task: {}", e);
        }
    }
}

struct Shared {
    command_line: String,
    stop_grace: Duration,
    status: Mutex<Status>,
    output: Mutex<OutputBuffer>,
    process: Mutex<Option<ProcessControl>>,
    done: Completion,
    capture_finished: Completion,
    stop_requested: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Task (owner)
// ============================================================================

/// One spawned external command. Owned by the entry shell.
pub struct Task {
    program: String,
    args: Vec<String>,
    options: TaskOptions,
    handle: TaskHandle,
    events: Option<OutputEvents>,
    started: bool,
}

impl Task {
    pub fn new(program: impl Into<String>, args: Vec<String>, options: TaskOptions) -> Self {
        let program = program.into();
        let command_line = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        let shared = Arc::new(Shared {
            command_line,
            stop_grace: options.stop_grace,
            status: Mutex::new(Status {
                state: TaskState::Pending,
                error: None,
                started: None,
                finished: None,
            }),
            output: Mutex::new(OutputBuffer::new(options.output_cap)),
            process: Mutex::new(None),
            done: Completion::new(),
            capture_finished: Completion::new(),
            stop_requested: AtomicBool::new(false),
        });

        Self {
            program,
            args,
            options,
            handle: TaskHandle { shared },
            events: None,
            started: false,
        }
    }

    /// Build a task from an argument vector whose first element is the program.
    pub fn from_argv(argv: &[String], options: TaskOptions) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), options))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// An observe + stop capability for other parts of the program.
    pub fn handle(&self) -> TaskHandle {
        self.handle.clone()
    }

    /// The single receiver of the output-notification channel.
    ///
    /// Available once the task has started; `None` on subsequent calls.
    pub fn take_output_events(&mut self) -> Option<OutputEvents> {
        self.events.take()
    }

    /// Spawn the command on a fresh pty and launch the capture and wait
    /// threads. Must be called exactly once.
    pub fn start(&mut self) -> Result<(), SpawnError> {
        if self.started {
            return Err(SpawnError::AlreadyStarted);
        }
        self.started = true;

        let pair = native_pty_system()
            .openpty(PtySize {
                rows: self.options.rows,
                cols: self.options.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SpawnError::Pty(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&self.program);
        cmd.args(&self.args);
        cmd.env("TERM", "xterm-256color");
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        let mut child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| SpawnError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;
        // Only the child may hold the slave side, otherwise reads never see EOF.
        drop(pair.slave);

        let reader = match pair.master.try_clone_reader() {
            Ok(reader) => reader,
            Err(e) => {
                abandon(&mut child);
                return Err(SpawnError::Pty(e.to_string()));
            }
        };

        let pid = child.process_id();
        let shared = Arc::clone(&self.handle.shared);
        {
            let mut status = lock(&shared.status);
            status.state = TaskState::Running;
            status.started = Some((Local::now(), Instant::now()));
        }
        *lock(&shared.process) = Some(ProcessControl {
            pid,
            killer: child.clone_killer(),
            _master: pair.master,
        });

        let (tx, rx) = mpsc::channel(self.options.notify_capacity.max(1));
        self.events = Some(rx);

        let capture_shared = Arc::clone(&shared);
        thread::Builder::new()
            .name("devtyper-capture".to_string())
            .spawn(move || capture_output(reader, capture_shared, tx))
            .map_err(|e| SpawnError::Spawn {
                program: self.program.clone(),
                reason: format!("could not start capture thread: {e}"),
            })?;

        let wait_shared = Arc::clone(&shared);
        thread::Builder::new()
            .name("devtyper-wait".to_string())
            .spawn(move || wait_for_exit(child, wait_shared))
            .map_err(|e| SpawnError::Spawn {
                program: self.program.clone(),
                reason: format!("could not start wait thread: {e}"),
            })?;

        info!(
            "Started task '{}' (pid {:?}, pty {}x{})",
            shared.command_line, pid, self.options.cols, self.options.rows
        );
        Ok(())
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if self.started {
            self.handle.stop();
        }
    }
}

fn abandon(child: &mut Box<dyn Child + Send + Sync>) {
    if let Err(e) = child.kill() {
        warn!("Failed to kill child after setup error: {}", e);
    }
    let _ = child.wait();
}

fn capture_output(
    mut reader: Box<dyn Read + Send>,
    shared: Arc<Shared>,
    events: mpsc::Sender<OutputChunk>,
) {
    let mut buf = [0u8; READ_CHUNK];
    let mut total: u64 = 0;
    let mut skipped_events: u64 = 0;

    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("pty reached EOF");
                break;
            }
            Ok(n) => {
                lock(&shared.output).append(&buf[..n]);
                total += n as u64;
                if events.try_send(buf[..n].to_vec()).is_err() {
                    skipped_events += 1;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // Linux reports EIO once every slave handle is closed.
                debug!("pty read ended: {}", e);
                break;
            }
        }
    }

    info!(
        "Output capture finished: {} bytes read, {} notifications skipped",
        total, skipped_events
    );
    shared.capture_finished.fire();
}

fn wait_for_exit(mut child: Box<dyn Child + Send + Sync>, shared: Arc<Shared>) {
    let result = child.wait();

    if !shared.capture_finished.wait_timeout(DRAIN_GRACE) {
        debug!("Output capture still running after child exit");
    }

    let (state, error) = match result {
        Ok(status) if status.success() => (TaskState::Completed, None),
        Ok(status) => (
            TaskState::Failed,
            Some(RuntimeError::Exited(status.exit_code())),
        ),
        Err(e) => (TaskState::Failed, Some(RuntimeError::Wait(e.to_string()))),
    };

    {
        let mut status = lock(&shared.status);
        status.state = state;
        status.error = error.clone();
        status.finished = Some(Instant::now());
    }

    match error {
        None => info!("Task '{}' completed", shared.command_line),
        Some(e) => warn!("Task '{}' failed: {}", shared.command_line, e),
    }
    shared.done.fire();
}

// ============================================================================
// TaskHandle (observer)
// ============================================================================

/// Read/observe + stop-request capability for a [`Task`].
///
/// Every method is non-blocking except [`TaskHandle::stop`] (bounded by two
/// grace periods) and [`TaskHandle::wait_for_capture`] (bounded by its
/// timeout).
#[derive(Clone)]
pub struct TaskHandle {
    shared: Arc<Shared>,
}

impl TaskHandle {
    /// Program and arguments joined by spaces.
    pub fn command_line(&self) -> &str {
        &self.shared.command_line
    }

    pub fn state(&self) -> TaskState {
        lock(&self.shared.status).state
    }

    pub fn is_complete(&self) -> bool {
        self.shared.done.is_fired()
    }

    pub fn has_error(&self) -> bool {
        lock(&self.shared.status).error.is_some()
    }

    /// The recorded failure, rendered for humans.
    pub fn error(&self) -> Option<String> {
        lock(&self.shared.status)
            .error
            .as_ref()
            .map(ToString::to_string)
    }

    pub fn runtime_error(&self) -> Option<RuntimeError> {
        lock(&self.shared.status).error.clone()
    }

    /// The completion signal. Clone it to wait from another thread.
    pub fn done(&self) -> &Completion {
        &self.shared.done
    }

    /// Wall-clock start time, once started.
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        lock(&self.shared.status).started.map(|(at, _)| at)
    }

    /// Time since start, frozen once the task has finished.
    pub fn elapsed(&self) -> Duration {
        let status = lock(&self.shared.status);
        match (status.started, status.finished) {
            (Some((_, start)), Some(end)) => end.duration_since(start),
            (Some((_, start)), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Snapshot of all retained output.
    pub fn output(&self) -> String {
        let bytes = lock(&self.shared.output).as_bytes().to_vec();
        output::decode(&bytes)
    }

    /// The last `n` lines of retained output.
    pub fn recent_output(&self, n: usize) -> Vec<String> {
        let tail = lock(&self.shared.output).tail_lines(n).to_vec();
        output::last_lines(&output::decode(&tail), n)
    }

    /// Bytes discarded by truncation so far.
    pub fn dropped_output(&self) -> u64 {
        lock(&self.shared.output).dropped()
    }

    /// Wait until output capture has drained, up to `timeout`.
    pub fn wait_for_capture(&self, timeout: Duration) -> bool {
        self.shared.capture_finished.wait_timeout(timeout)
    }

    /// Whether `stop()` reached a started process.
    pub fn stop_requested(&self) -> bool {
        self.shared.stop_requested.load(Ordering::SeqCst)
    }

    /// Interrupt the task, then kill it if it is still alive after the grace
    /// period. Releases the pty. Idempotent.
    pub fn stop(&self) {
        // Taking the control is the idempotency gate: a stop before `start()`
        // finds nothing and leaves later stops armed.
        let Some(mut control) = lock(&self.shared.process).take() else {
            debug!("No running process to stop for '{}'", self.shared.command_line);
            return;
        };
        self.shared.stop_requested.store(true, Ordering::SeqCst);

        if !self.shared.done.is_fired() {
            info!("Interrupting task '{}'", self.shared.command_line);
            control.interrupt();

            if !self.shared.done.wait_timeout(self.shared.stop_grace) {
                warn!(
                    "Task '{}' still running after {:?}, killing",
                    self.shared.command_line, self.shared.stop_grace
                );
                control.force_kill();
                if !self.shared.done.wait_timeout(self.shared.stop_grace) {
                    warn!(
                        "Task '{}' did not report completion after kill",
                        self.shared.command_line
                    );
                }
            }
        }

        drop(control);
        debug!("Released pty for '{}'", self.shared.command_line);
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("command_line", &self.shared.command_line)
            .field("state", &self.state())
            .finish()
    }
}
