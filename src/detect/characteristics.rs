//! Structural analysis: counts Somali indicators (marker phrases, grammar
//! particles, sentence-structure cues) and reports the fraction present.

use super::lexicon::Lexicon;

/// Fraction of Somali indicators present in `text`.
///
/// Three indicator families are polled, each contributing to both the hit
/// count and the total checked:
///   - marker phrases, matched as plain substrings
///   - grammar particles, matched on word boundaries
///   - a sentence-structure bonus worth two indicators when "waa" appears
///     together with "ku" or "ka"
///
/// Callers pass lowercased text; the phrase and structure checks are
/// substring matches and would miss uppercase forms otherwise.
pub fn indicator_ratio(lexicon: &Lexicon, text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut hits = 0usize;
    let mut checked = 0usize;

    for phrase in lexicon.marker_phrases() {
        if text.contains(phrase) {
            hits += 1;
        }
        checked += 1;
    }

    hits += lexicon.grammar_hits(text);
    checked += lexicon.grammar_pattern_count();

    // Declarative "waa" plus a locative particle is a strong structural cue.
    if text.contains("waa") && (text.contains("ku") || text.contains("ka")) {
        hits += 2;
        checked += 2;
    }

    if checked == 0 {
        return 0.0;
    }

    hits as f64 / checked as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(text: &str) -> f64 {
        indicator_ratio(&Lexicon::new(), text)
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(ratio(""), 0.0);
    }

    #[test]
    fn english_text_scores_low() {
        assert!(ratio("hello, how are you today?") < 0.1);
    }

    #[test]
    fn phrases_match_as_substrings() {
        // One marker phrase hits, no grammar pattern does: 1 / (18 + 13).
        let r = ratio("mahadsanid");
        assert!((r - 1.0 / 31.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn structure_bonus_counts_double() {
        // Marker "waa" (1) + grammar \bwaa\b and \bku\b (2) + bonus (2)
        // over 18 + 13 + 2 checked.
        let r = ratio("waa ku qoran");
        assert!((r - 5.0 / 33.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn dense_somali_clears_the_gate() {
        let text = "waa ku waa ka waxaa waxay waxuu halkan halkaas maanta \
                    shalay qof qofka qofkaas wax waxa salaan mahadsanid fadlan";
        assert!(ratio(text) > 0.6, "got {}", ratio(text));
    }
}
