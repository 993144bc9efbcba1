//! Statistical language identification backed by n-gram models.
//!
//! The backend sits behind a trait so the cascade can be exercised in tests
//! with canned verdicts, and so the whole signal can be switched off via
//! `[detector] statistical = false`.

use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};

/// First-pass language identifier. Implementations must be deterministic:
/// the same text always yields the same code.
pub trait StatisticalId: Send + Sync {
    /// Lowercase ISO 639-1 code of the identified language, or `None` when
    /// the input is too short or too ambiguous to call.
    fn classify(&self, text: &str) -> Option<String>;
}

/// Lingua-based identifier restricted to the languages this service actually
/// sees: Somali plus the scripts users most often paste by mistake.
///
/// Restricting the set keeps model memory small and sharpens the
/// Somali/non-Somali distinction; the minimum relative distance makes the
/// detector abstain on short ambiguous fragments instead of guessing.
pub struct LinguaBackend {
    detector: LanguageDetector,
}

impl LinguaBackend {
    pub fn new() -> Self {
        let detector = LanguageDetectorBuilder::from_languages(&[
            Language::Somali,
            Language::English,
            Language::Arabic,
            Language::Swahili,
            Language::Italian,
        ])
        .with_minimum_relative_distance(0.1)
        .build();

        Self { detector }
    }
}

impl Default for LinguaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticalId for LinguaBackend {
    fn classify(&self, text: &str) -> Option<String> {
        self.detector.detect_language_of(text).map(|lang| {
            let mut code = lang.iso_code_639_1().to_string();
            code.make_ascii_lowercase();
            code
        })
    }
}
