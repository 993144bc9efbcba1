//! Token-level pattern matching: scores each whitespace token against an
//! ordered rule list and reports the Somali-weight ratio of the text.

use super::lexicon::Lexicon;

/// Token rules in evaluation order. The first matching rule wins; later rules
/// are not consulted, so a full word never also collects its affix weights.
const TOKEN_RULES: &[(TokenRule, f64)] = &[
    (TokenRule::CommonWord, 1.0),
    (TokenRule::CommonPrefix, 0.5),
    (TokenRule::CommonSuffix, 0.3),
];

#[derive(Debug, Clone, Copy)]
enum TokenRule {
    CommonWord,
    CommonPrefix,
    CommonSuffix,
}

impl TokenRule {
    fn matches(self, lexicon: &Lexicon, word: &str) -> bool {
        match self {
            TokenRule::CommonWord => lexicon.is_common_word(word),
            TokenRule::CommonPrefix => lexicon.has_common_prefix(word),
            TokenRule::CommonSuffix => lexicon.has_common_suffix(word),
        }
    }
}

/// Strip punctuation from a token, keeping letters, digits, and underscores.
pub(crate) fn clean_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn token_weight(lexicon: &Lexicon, word: &str) -> f64 {
    TOKEN_RULES
        .iter()
        .find(|(rule, _)| rule.matches(lexicon, word))
        .map(|(_, weight)| *weight)
        .unwrap_or(0.0)
}

/// Weighted Somali ratio of `text`: summed token weights over the token count.
///
/// Tokens that clean down to nothing still count in the denominator, so
/// punctuation-only tokens dilute the ratio rather than vanish. Returns `None`
/// for whitespace-only input, which carries no token signal at all.
pub fn somali_ratio(lexicon: &Lexicon, text: &str) -> Option<f64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let score: f64 = tokens
        .iter()
        .map(|token| token_weight(lexicon, &clean_token(token)))
        .sum();

    Some(score / tokens.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(text: &str) -> f64 {
        somali_ratio(&Lexicon::new(), text).unwrap()
    }

    #[test]
    fn whole_word_outranks_affixes() {
        // "waa" is a common word and also carries the "waa" prefix and "aa"
        // suffix; only the word rule may fire.
        assert_eq!(ratio("waa"), 1.0);
    }

    #[test]
    fn prefix_outranks_suffix() {
        // "subaxdaa" matches both the "sub" prefix and the "aa" suffix; the
        // prefix rule fires first and takes 0.5.
        assert_eq!(ratio("subaxdaa"), 0.5);
        assert_eq!(ratio("waxbarasho"), 0.5);
    }

    #[test]
    fn suffix_rule_fires_last() {
        // "gabay" is not a common word, has no common prefix, ends in "ay".
        assert_eq!(ratio("gabay"), 0.3);
    }

    #[test]
    fn punctuation_is_stripped_before_matching() {
        assert_eq!(ratio("waa!"), 1.0);
        assert_eq!(ratio("mahadsanid,"), 1.0);
    }

    #[test]
    fn empty_tokens_still_dilute() {
        // "!!" cleans to nothing but stays in the denominator.
        assert_eq!(ratio("waa !!"), 0.5);
    }

    #[test]
    fn whitespace_only_gives_no_signal() {
        assert_eq!(somali_ratio(&Lexicon::new(), "   "), None);
        assert_eq!(somali_ratio(&Lexicon::new(), ""), None);
    }

    #[test]
    fn all_somali_greeting_scores_full() {
        // salaan + sidee + tahay are all common words.
        assert_eq!(ratio("salaan, sidee tahay?"), 1.0);
    }

    #[test]
    fn english_text_scores_low() {
        let r = ratio("the quick brown fox jumps");
        assert!(r < 0.2, "english ratio unexpectedly high: {r}");
    }
}
