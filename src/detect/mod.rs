//! Somali language detection.
//!
//! Four signals are consulted in a fixed priority order, short-circuiting on
//! the first confident Somali verdict:
//!
//!   1. statistical n-gram identification ([`statistical`])
//!   2. lexicon pattern matching over tokens ([`pattern`])
//!   3. structural characteristic analysis ([`characteristics`])
//!   4. a remote translation-service check ([`remote`])
//!
//! A non-Somali answer from an individual signal never ends the cascade; only
//! the fall-through default does. Backend failures (model missing, remote
//! unreachable) degrade to "no signal" so detection always returns a verdict.

pub mod characteristics;
pub mod lexicon;
pub mod pattern;
pub mod remote;
pub mod statistical;

use crate::config::DetectorConfig;
use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use lexicon::Lexicon;
use remote::{HttpLangId, RemoteLangId};
use statistical::{LinguaBackend, StatisticalId};

/// Default confidence threshold for the yes/no Somali check.
pub const DEFAULT_SOMALI_THRESHOLD: f64 = 0.5;

// ─── Verdict types ────────────────────────────────────────────────────────────

/// Detected language class. The service only distinguishes Somali from
/// everything else; `Unknown` is reserved for empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lang {
    #[serde(rename = "so")]
    Somali,
    #[serde(rename = "other")]
    Other,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::Somali => "so",
            Lang::Other => "other",
            Lang::Unknown => "unknown",
        }
    }
}

/// Which signal produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    StatisticalDetector,
    PatternMatching,
    CharacterAnalysis,
    TranslationService,
    CombinedAnalysis,
    EmptyText,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::StatisticalDetector => "statistical_detector",
            Method::PatternMatching => "pattern_matching",
            Method::CharacterAnalysis => "character_analysis",
            Method::TranslationService => "translation_service",
            Method::CombinedAnalysis => "combined_analysis",
            Method::EmptyText => "empty_text",
        }
    }
}

/// A complete detection verdict. Confidence is always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub language: Lang,
    pub confidence: f64,
    pub method: Method,
}

impl Detection {
    pub fn is_somali(&self) -> bool {
        self.language == Lang::Somali
    }
}

/// Word-level diagnostics for the text analysis endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WordReport {
    pub total_words: usize,
    pub somali_words: Vec<String>,
}

// ─── Tuning ───────────────────────────────────────────────────────────────────

/// Cascade gates and scales. Defaults reproduce the shipped behavior; values
/// derived from config are clamped so confidences stay within [0, 1].
#[derive(Debug, Clone)]
pub struct Tuning {
    /// Token ratio above which pattern matching fires.
    pub pattern_gate: f64,
    /// Ceiling on the pattern-matching confidence.
    pub pattern_confidence_cap: f64,
    /// Indicator ratio above which characteristic analysis fires.
    pub characteristic_gate: f64,
    /// Multiplier turning the indicator ratio into a confidence.
    pub characteristic_scale: f64,
    /// Confidence for a statistical Somali verdict.
    pub statistical_confidence: f64,
    /// Confidence for the fall-through non-Somali verdict.
    pub other_confidence: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            pattern_gate: 0.2,
            pattern_confidence_cap: 0.8,
            characteristic_gate: 0.6,
            characteristic_scale: 0.7,
            statistical_confidence: 0.9,
            other_confidence: 0.8,
        }
    }
}

impl Tuning {
    fn from_config(cfg: &DetectorConfig) -> Self {
        Self {
            pattern_gate: cfg.pattern_gate,
            pattern_confidence_cap: cfg.pattern_confidence_cap.clamp(0.0, 1.0),
            characteristic_gate: cfg.characteristic_gate,
            characteristic_scale: cfg.characteristic_scale.clamp(0.0, 1.0),
            statistical_confidence: cfg.statistical_confidence.clamp(0.0, 1.0),
            other_confidence: cfg.other_confidence.clamp(0.0, 1.0),
        }
    }
}

// ─── Detector ─────────────────────────────────────────────────────────────────

/// The detection cascade. Construction is explicit about which backends are
/// wired in; a detector without backends still runs the lexicon passes and
/// is fully deterministic.
pub struct SomaliDetector {
    lexicon: Lexicon,
    tuning: Tuning,
    statistical: Option<Box<dyn StatisticalId>>,
    remote: Option<Box<dyn RemoteLangId>>,
}

impl SomaliDetector {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            lexicon: Lexicon::new(),
            tuning,
            statistical: None,
            remote: None,
        }
    }

    pub fn with_statistical(mut self, backend: Box<dyn StatisticalId>) -> Self {
        self.statistical = Some(backend);
        self
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteLangId>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Wire up the detector from config: lexicon always, n-gram backend when
    /// enabled, remote check when a URL is configured.
    pub fn from_config(cfg: &DetectorConfig) -> Result<Self> {
        let mut detector = Self::new(Tuning::from_config(cfg));
        if cfg.statistical {
            detector = detector.with_statistical(Box::new(LinguaBackend::new()));
        }
        if let Some(url) = &cfg.remote_url {
            let timeout = Duration::from_millis(cfg.remote_timeout_ms);
            detector = detector.with_remote(Box::new(HttpLangId::new(url.clone(), timeout)?));
        }
        info!(
            statistical = cfg.statistical,
            remote = cfg.remote_url.is_some(),
            "language detector ready"
        );
        Ok(detector)
    }

    /// Run the cascade over `text` and return the first confident verdict.
    pub async fn detect(&self, text: &str) -> Detection {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return Detection {
                language: Lang::Unknown,
                confidence: 0.0,
                method: Method::EmptyText,
            };
        }

        // Signal 1: statistical identification. Only a Somali answer ends
        // the cascade; any other language falls through to the lexicon.
        if let Some(backend) = &self.statistical {
            if let Some(code) = backend.classify(&normalized) {
                if code == "so" {
                    return Detection {
                        language: Lang::Somali,
                        confidence: self.tuning.statistical_confidence,
                        method: Method::StatisticalDetector,
                    };
                }
            }
        }

        // Signal 2: token pattern matching.
        if let Some(ratio) = pattern::somali_ratio(&self.lexicon, &normalized) {
            if ratio > self.tuning.pattern_gate {
                return Detection {
                    language: Lang::Somali,
                    confidence: ratio.min(self.tuning.pattern_confidence_cap),
                    method: Method::PatternMatching,
                };
            }
        }

        // Signal 3: structural characteristics.
        let indicator = characteristics::indicator_ratio(&self.lexicon, &normalized);
        if indicator > self.tuning.characteristic_gate {
            return Detection {
                language: Lang::Somali,
                confidence: indicator * self.tuning.characteristic_scale,
                method: Method::CharacterAnalysis,
            };
        }

        // Signal 4: remote translation-service check, best effort. The
        // service sees the text as submitted, not the normalized form.
        if let Some(remote) = &self.remote {
            if let Some(verdict) = remote.identify(text).await {
                if verdict.language == "so" {
                    return Detection {
                        language: Lang::Somali,
                        confidence: verdict.confidence.clamp(0.0, 1.0),
                        method: Method::TranslationService,
                    };
                }
            }
        }

        // Nothing claimed Somali: call it something else.
        Detection {
            language: Lang::Other,
            confidence: self.tuning.other_confidence,
            method: Method::CombinedAnalysis,
        }
    }

    /// Yes/no Somali check: the language must be Somali and the verdict
    /// confidence must reach `threshold`.
    pub async fn is_somali(&self, text: &str, threshold: f64) -> bool {
        let verdict = self.detect(text).await;
        verdict.language == Lang::Somali && verdict.confidence >= threshold
    }

    /// Exact lexicon hits per token, for the analysis endpoint.
    pub fn word_report(&self, text: &str) -> WordReport {
        let normalized = text.trim().to_lowercase();
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let somali_words = tokens
            .iter()
            .map(|token| pattern::clean_token(token))
            .filter(|word| self.lexicon.is_common_word(word))
            .collect();
        WordReport {
            total_words: tokens.len(),
            somali_words,
        }
    }

    /// Structural indicator ratio of `text`, for the analysis endpoint.
    pub fn characteristic_score(&self, text: &str) -> f64 {
        characteristics::indicator_ratio(&self.lexicon, &text.trim().to_lowercase())
    }
}
