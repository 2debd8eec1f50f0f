//! # Background Command Monitor
//!
//! Runs the user's slow command next to the game and exposes its progress.
//!
//! - [`task`]: `Task` (owner) and `TaskHandle` (observer): pty spawn, output
//!   capture, completion wait, two-phase stop
//! - [`output`]: bounded, UTF-8-safe output buffer
//! - [`completion`]: broadcast-once done signal
//! - [`detector`]: friendly descriptions and interactive-command guard

pub mod completion;
pub mod detector;
pub mod output;
pub mod task;

pub use completion::Completion;
pub use detector::{Detection, detect};
pub use task::{
    OutputChunk, OutputEvents, RuntimeError, SpawnError, Task, TaskHandle, TaskOptions, TaskState,
};
