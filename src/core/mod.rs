//! # Core Game Logic
//!
//! This module contains DevTyper's game rules.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (ratatui)  │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct and the `GameState` screens
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`session`]: Per-round typing progress and results
//! - [`sentences`]: Practice text generation
//! - [`config`]: Settings file, env and CLI resolution

pub mod action;
pub mod config;
pub mod sentences;
pub mod session;
pub mod state;
