//! # Typing Session
//!
//! The active exercise: the target sentence, what has been typed against it,
//! and the running counters for the whole round.
//!
//! ```text
//! Session
//! ├── target: "let x = 5"
//! ├── chars: [CharState; 9]   // typed / correct per position
//! ├── input: "let "           // never longer than target
//! └── stats: Stats            // keystrokes, errors, words, start time
//! ```
//!
//! Correctness is decided when a character is typed and stays fixed until
//! that same position is backspaced. Errors are counted per keystroke, so
//! fixing a typo does not erase it from the accuracy figure.

use std::fmt;
use std::time::{Duration, Instant};

use crate::core::sentences::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharState {
    pub ch: char,
    pub typed: bool,
    pub correct: bool,
}

/// Counters accumulated over every sentence of a round.
#[derive(Debug, Clone)]
pub struct Stats {
    pub started: Instant,
    pub words_typed: usize,
    pub keystrokes: usize,
    pub errors: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            words_typed: 0,
            keystrokes: 0,
            errors: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Words per minute over `elapsed`.
    pub fn wpm_over(&self, elapsed: Duration) -> f64 {
        let minutes = elapsed.as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            return 0.0;
        }
        self.words_typed as f64 / minutes
    }

    pub fn wpm(&self) -> f64 {
        self.wpm_over(self.elapsed())
    }

    /// Percentage of keystrokes that were correct; 100 before any typing.
    pub fn accuracy(&self) -> f64 {
        if self.keystrokes == 0 {
            return 100.0;
        }
        (self.keystrokes - self.errors) as f64 / self.keystrokes as f64 * 100.0
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    target: String,
    chars: Vec<CharState>,
    input: String,
    stats: Stats,
}

impl Session {
    pub fn new(target: String) -> Self {
        let mut session = Self {
            target: String::new(),
            chars: Vec::new(),
            input: String::new(),
            stats: Stats::new(),
        };
        session.next_sentence(target);
        session
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn chars(&self) -> &[CharState] {
        &self.chars
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of characters typed against the current target.
    pub fn typed_len(&self) -> usize {
        self.chars.iter().take_while(|c| c.typed).count()
    }

    /// Type one character. Ignored once the whole target has been typed.
    pub fn type_char(&mut self, ch: char) -> bool {
        let pos = self.typed_len();
        let Some(state) = self.chars.get_mut(pos) else {
            return false;
        };

        state.typed = true;
        state.correct = state.ch == ch;
        self.input.push(ch);
        self.stats.keystrokes += 1;
        if !state.correct {
            self.stats.errors += 1;
        }
        true
    }

    /// Remove the last typed character and clear its correctness.
    pub fn backspace(&mut self) -> bool {
        let pos = self.typed_len();
        if pos == 0 {
            return false;
        }
        let state = &mut self.chars[pos - 1];
        state.typed = false;
        state.correct = false;
        self.input.pop();
        true
    }

    /// Check the input against the target. On an exact match the word
    /// counter grows by the number of words in the target.
    pub fn confirm(&mut self) -> bool {
        if self.input != self.target {
            return false;
        }
        self.stats.words_typed += self.target.split_whitespace().count();
        true
    }

    /// Replace the target, keeping the round's counters.
    pub fn next_sentence(&mut self, target: String) {
        self.chars = target
            .chars()
            .map(|ch| CharState {
                ch,
                typed: false,
                correct: false,
            })
            .collect();
        self.input.clear();
        self.target = target;
    }

    pub fn results(&self, language: Language) -> Results {
        let elapsed = self.stats.elapsed();
        Results {
            language,
            duration: elapsed,
            wpm: self.stats.wpm_over(elapsed),
            accuracy: self.stats.accuracy(),
            words_typed: self.stats.words_typed,
            total_errors: self.stats.errors,
        }
    }
}

/// Summary of a finished round.
#[derive(Debug, Clone, PartialEq)]
pub struct Results {
    pub language: Language,
    pub duration: Duration,
    pub wpm: f64,
    pub accuracy: f64,
    pub words_typed: usize,
    pub total_errors: usize,
}

impl fmt::Display for Results {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "=".repeat(50);
        writeln!(f, "{border}")?;
        writeln!(f, "DevTyper Results")?;
        writeln!(f, "{border}")?;
        writeln!(f, "Language: {}", self.language.label().to_uppercase())?;
        writeln!(f, "Duration: {} seconds", self.duration.as_secs())?;
        writeln!(f, "Words per minute: {:.1}", self.wpm)?;
        writeln!(f, "Accuracy: {:.1}%", self.accuracy)?;
        writeln!(f, "Total words typed: {}", self.words_typed)?;
        writeln!(f, "Total errors: {}", self.total_errors)?;
        write!(f, "{border}")
    }
}
