//! Somali lexical resources: function words, affixes, marker phrases, and
//! word-boundary grammar patterns.
//!
//! The lists are intentionally small — they cover the closed-class vocabulary
//! (particles, pronouns, time words, greetings) that dominates everyday Somali
//! text, not the open-class vocabulary a dictionary would.

use once_cell::sync::Lazy;
use regex::RegexSet;
use std::collections::HashSet;

/// Closed-class Somali words: focus particles, prepositions, conjunctions,
/// question markers, deictics, time-of-day words, and common greetings.
const COMMON_WORDS: &[&str] = &[
    "waa", "waxaa", "waxay", "waxuu", "waxaad", "waxaas", "ku", "ka", "la", "si", "oo", "iyo",
    "ama", "hadday", "haddii", "ma", "miyaa", "balse", "laakiin", "sidoo", "sidoo kale",
    "dhammaan", "qof", "qofka", "qofkaas", "wax", "waxa", "halkan", "halkaas", "halkii", "halka",
    "maanta", "shalay", "berri", "maalin", "habeen", "subax", "galab", "caawa", "salaan",
    "mahadsanid", "fadlan", "iga", "sidee", "tahay", "waan", "waxaan",
];

/// Stems that open many Somali word families (waxaa-, qof-, halk-, maal-, ...).
const COMMON_PREFIXES: &[&str] = &[
    "waa", "wax", "qof", "halk", "maal", "habe", "sub", "gal", "caa", "sal", "maha", "fad", "iga",
];

/// Frequent Somali word endings, including vowel-final verb inflections.
const COMMON_SUFFIXES: &[&str] = &[
    "aa", "ay", "uu", "ad", "as", "ku", "ka", "la", "si", "oo", "iyo", "ama",
];

/// Greetings and high-frequency words checked as substrings of the whole text.
const MARKER_PHRASES: &[&str] = &[
    "salaan",
    "salaan alaikum",
    "wa alaikum salaam",
    "mahadsanid",
    "fadlan",
    "waa",
    "waxaa",
    "waxay",
    "waxuu",
    "halkan",
    "halkaas",
    "maanta",
    "shalay",
    "qof",
    "qofka",
    "qofkaas",
    "wax",
    "waxa",
];

/// Grammar particles matched on word boundaries. One indicator each.
static GRAMMAR_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bwaa\b",
        r"\bwaxaa\b",
        r"\bwaxay\b",
        r"\bwaxuu\b",
        r"\bku\b",
        r"\bka\b",
        r"\bla\b",
        r"\bsi\b",
        r"\boo\b",
        r"\biyo\b",
        r"\bama\b",
        r"\bhadday\b",
        r"\bhaddii\b",
    ])
    .expect("hardcoded grammar patterns")
});

/// Fixed Somali lexicon shared by the pattern and characteristic passes.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashSet<&'static str>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            words: COMMON_WORDS.iter().copied().collect(),
        }
    }

    /// Exact membership in the closed-class word list.
    pub fn is_common_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn has_common_prefix(&self, word: &str) -> bool {
        COMMON_PREFIXES.iter().any(|p| word.starts_with(p))
    }

    pub fn has_common_suffix(&self, word: &str) -> bool {
        COMMON_SUFFIXES.iter().any(|s| word.ends_with(s))
    }

    /// Marker phrases, in check order.
    pub fn marker_phrases(&self) -> &'static [&'static str] {
        MARKER_PHRASES
    }

    /// How many grammar patterns match somewhere in `text`.
    pub fn grammar_hits(&self, text: &str) -> usize {
        GRAMMAR_PATTERNS.matches(text).iter().count()
    }

    /// Total number of grammar patterns checked.
    pub fn grammar_pattern_count(&self) -> usize {
        GRAMMAR_PATTERNS.len()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}
