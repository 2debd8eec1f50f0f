//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use crate::core::sentences::{SentenceCatalog, SentenceSource};
use crate::core::state::App;

/// Seed used by every test source, so generated text is reproducible.
pub const TEST_SEED: u64 = 0xD7;

/// A sentence source over the builtin catalog with a fixed seed.
pub fn test_sentences() -> SentenceSource {
    SentenceSource::with_seed(Arc::new(SentenceCatalog::builtin()), TEST_SEED)
}

/// Creates a test App in the language menu.
pub fn test_app() -> App {
    App::new(test_sentences(), "Running command".to_string())
}
