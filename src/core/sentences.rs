//! # Sentence Source
//!
//! Produces practice text. Code languages fill a random template's `{}`
//! placeholders with identifiers, types and literals of that language; the
//! generic mode strings together common English words.
//!
//! The word tables live in an immutable [`SentenceCatalog`] that is built once
//! and shared by every source. A source only owns its RNG and its settings.

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WORD_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Go,
    #[value(name = "javascript", alias = "js")]
    #[serde(alias = "js")]
    JavaScript,
    Rust,
    Generic,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Go,
        Language::JavaScript,
        Language::Rust,
        Language::Generic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::JavaScript => "javascript",
            Language::Rust => "rust",
            Language::Generic => "generic",
        }
    }

    /// Whether the word-count setting affects generated text.
    pub fn uses_word_count(self) -> bool {
        matches!(self, Language::Generic)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Templates and fill-in words for one programming language.
#[derive(Debug, Clone, Default)]
pub struct LanguageTemplates {
    pub templates: Vec<String>,
    pub variables: Vec<String>,
    pub types: Vec<String>,
    pub operations: Vec<String>,
}

impl LanguageTemplates {
    fn from_static(
        templates: &[&str],
        variables: &[&str],
        types: &[&str],
        operations: &[&str],
    ) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            templates: owned(templates),
            variables: owned(variables),
            types: owned(types),
            operations: owned(operations),
        }
    }
}

/// All sentence data. Built once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct SentenceCatalog {
    pub go: LanguageTemplates,
    pub javascript: LanguageTemplates,
    pub rust: LanguageTemplates,
    pub generic_words: Vec<String>,
}

impl SentenceCatalog {
    pub fn builtin() -> Self {
        Self {
            go: LanguageTemplates::from_static(
                &[
                    "func {}() {} {",
                    "var {} {} = {}",
                    "type {} struct { {} {} }",
                    "if {} != nil { return {} }",
                    "for {} := range {} {",
                    "switch {} := {}.(type) {",
                    "map[{}]{}{{}: {}}",
                    "func ({} *{}) {}() {} {",
                ],
                &["err", "val", "data", "result", "item", "obj", "ctx"],
                &["string", "int", "bool", "error", "interface{}"],
                &["nil", "true", "false", "0", "1", "\"\""],
            ),
            javascript: LanguageTemplates::from_static(
                &[
                    "function {}({}) {",
                    "const {} = {}",
                    "let {} = {}",
                    "class {} extends {} {",
                    "if ({} === {}) {",
                    "for (let {} of {}) {",
                    "async function {}({}) {",
                    "try { {} } catch({}) {",
                ],
                &["err", "data", "result", "item", "obj", "ctx", "response"],
                &["Array", "Object", "string", "number", "boolean"],
                &["null", "undefined", "true", "false", "0", "''", "[]", "{}"],
            ),
            rust: LanguageTemplates::from_static(
                &[
                    "fn {}({}: {}) -> {} {",
                    "let mut {}: {} = {};",
                    "struct {}<{}> { {}: {} }",
                    "impl {} for {} {",
                    "match {} {",
                    "if let Some({}) = {} {",
                    "pub fn {}(&self) -> Result<{}, {}> {",
                ],
                &["err", "val", "data", "result", "item", "cfg", "ctx"],
                &["String", "i32", "bool", "Option", "Result", "Vec"],
                &["None", "Some", "Ok", "Err", "true", "false", "0", "\"\""],
            ),
            generic_words: GENERIC_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn templates(&self, language: Language) -> Option<&LanguageTemplates> {
        match language {
            Language::Go => Some(&self.go),
            Language::JavaScript => Some(&self.javascript),
            Language::Rust => Some(&self.rust),
            Language::Generic => None,
        }
    }
}

const GENERIC_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "that", "have", "with", "this", "from", "they", "say", "her",
    "she", "will", "one", "all", "would", "there", "their", "what", "out", "about", "who", "get",
    "which", "when", "make", "can", "like", "time", "just", "know", "take", "people", "into",
    "year", "good", "some", "could", "them", "see", "other", "than", "then", "now", "look",
    "only", "come", "its", "over", "think", "also", "back", "after", "use", "two", "how", "our",
    "work", "first", "well", "way", "even", "new", "want", "because", "any", "these", "give",
    "day", "most", "us", "should", "need", "much", "right", "without", "through", "own", "too",
    "here", "still", "such", "last", "great", "long", "small", "might", "around", "while",
    "those", "always", "world", "both", "life", "where", "next", "being", "keep",
];

/// Generates sentences for the current language and word-count setting.
pub struct SentenceSource {
    catalog: Arc<SentenceCatalog>,
    language: Language,
    word_count: usize,
    rng: StdRng,
}

impl SentenceSource {
    pub fn new(catalog: Arc<SentenceCatalog>) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    /// Deterministic source for tests and reproducible sessions.
    pub fn with_seed(catalog: Arc<SentenceCatalog>, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<SentenceCatalog>, rng: StdRng) -> Self {
        Self {
            catalog,
            language: Language::default(),
            word_count: DEFAULT_WORD_COUNT,
            rng,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Number of words per generic sentence. Zero selects the default.
    pub fn set_word_count(&mut self, count: usize) {
        self.word_count = if count == 0 { DEFAULT_WORD_COUNT } else { count };
    }

    pub fn generate(&mut self) -> String {
        let catalog = Arc::clone(&self.catalog);
        match catalog.templates(self.language) {
            Some(templates) => self.fill_template(templates),
            None => self.generic_sentence(),
        }
    }

    fn generic_sentence(&mut self) -> String {
        let words = &self.catalog.generic_words;
        (0..self.word_count)
            .filter_map(|_| words.choose(&mut self.rng))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fill_template(&mut self, lang: &LanguageTemplates) -> String {
        let Some(template) = lang.templates.choose(&mut self.rng) else {
            return String::new();
        };

        let mut pieces = template.split("{}");
        let mut sentence = pieces.next().unwrap_or_default().to_string();
        for piece in pieces {
            let pool = match self.rng.gen_range(0..3) {
                0 => &lang.variables,
                1 => &lang.types,
                _ => &lang.operations,
            };
            if let Some(word) = pool.choose(&mut self.rng) {
                sentence.push_str(word);
            }
            sentence.push_str(piece);
        }
        sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(seed: u64) -> SentenceSource {
        SentenceSource::with_seed(Arc::new(SentenceCatalog::builtin()), seed)
    }

    #[test]
    fn test_generic_sentence_has_requested_word_count() {
        let mut source = source(7);
        source.set_language(Language::Generic);
        source.set_word_count(25);
        let sentence = source.generate();
        assert_eq!(sentence.split_whitespace().count(), 25);
    }

    #[test]
    fn test_zero_word_count_uses_default() {
        let mut source = source(7);
        source.set_word_count(0);
        assert_eq!(source.word_count(), DEFAULT_WORD_COUNT);
    }

    #[test]
    fn test_code_sentences_fill_every_placeholder() {
        for language in [Language::Go, Language::Rust] {
            let mut source = source(42);
            source.set_language(language);
            for _ in 0..50 {
                let sentence = source.generate();
                assert!(!sentence.is_empty());
                // `{}` only survives as a literal value from the word tables.
                let stripped = sentence.replace("interface{}", "");
                assert!(!stripped.contains("{}"), "unfilled placeholder in {sentence:?}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_sentences() {
        let mut a = source(99);
        let mut b = source(99);
        a.set_language(Language::Rust);
        b.set_language(Language::Rust);
        for _ in 0..5 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_custom_catalog_is_used() {
        let catalog = SentenceCatalog {
            go: LanguageTemplates::from_static(&["x := {}"], &["a"], &["a"], &["a"]),
            ..Default::default()
        };
        let mut source = SentenceSource::with_seed(Arc::new(catalog), 1);
        assert_eq!(source.generate(), "x := a");
    }

    #[test]
    fn test_empty_catalog_yields_empty_text() {
        let mut source = SentenceSource::with_seed(Arc::new(SentenceCatalog::default()), 1);
        assert_eq!(source.generate(), "");
        source.set_language(Language::Generic);
        assert_eq!(source.generate(), "");
    }

    #[test]
    fn test_language_labels_round_trip_through_clap() {
        for language in Language::ALL {
            assert_eq!(Language::from_str(language.label(), true).unwrap(), language);
        }
        assert_eq!(Language::from_str("js", true).unwrap(), Language::JavaScript);
    }
}
