//! DevTyper: a typing game that keeps you busy while a slow command runs.

pub mod core;
pub mod monitor;
pub mod tui;

#[cfg(test)]
pub mod test_support;
