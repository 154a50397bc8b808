//! Search term tokenization.
//!
//! A term is split on whitespace and each word is normalized. With word-based
//! matching on, generic qualifiers ("State", "City", ...) and words of two
//! characters or fewer are dropped, so `"Lagos State"` matches rows that only
//! contain `"Lagos"` while the whole-term comparisons still see `"Lagos State"`.

use super::normalizer::normalize;
use crate::config::ResolvedOptions;

/// Split a term into significant word tokens, in order of appearance.
///
/// # Example
///
/// ```
/// use pg_search::config::ResolvedOptions;
/// use pg_search::search::tokenize;
///
/// let tokens = tokenize("Lagos State", &ResolvedOptions::default());
/// assert_eq!(tokens, vec!["Lagos"]);
/// ```
pub fn tokenize(term: &str, options: &ResolvedOptions) -> Vec<String> {
    let words = term.split_whitespace().map(normalize);

    if !options.word_based_matching {
        return words.collect();
    }

    words
        .filter(|w| w.len() > 2 && !options.is_ignored_suffix(w))
        .collect()
}

/// Match candidates derived once per search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTerm {
    /// Trimmed term as typed
    pub raw: String,
    /// `raw` with punctuation and whitespace stripped
    pub normalized: String,
    /// Significant words (see [`tokenize`])
    pub tokens: Vec<String>,
}

impl NormalizedTerm {
    pub fn new(term: &str, options: &ResolvedOptions) -> Self {
        let raw = term.trim();
        Self {
            raw: raw.to_string(),
            normalized: normalize(raw),
            tokens: tokenize(raw, options),
        }
    }

    /// Tokens that take part in word matching for these options.
    #[must_use]
    pub fn match_tokens<'a>(&'a self, options: &ResolvedOptions) -> &'a [String] {
        if options.word_based_matching {
            &self.tokens
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SearchConfig, SearchOptions};

    fn options(overrides: SearchOptions) -> ResolvedOptions {
        SearchConfig::default().resolve(&overrides)
    }

    #[test]
    fn test_drops_default_suffixes() {
        let tokens = tokenize("Lagos State", &ResolvedOptions::default());
        assert_eq!(tokens, vec!["Lagos"]);

        let tokens = tokenize("Quebec PROVINCE", &ResolvedOptions::default());
        assert_eq!(tokens, vec!["Quebec"]);
    }

    #[test]
    fn test_drops_short_words() {
        let tokens = tokenize("Oak Li of the Bay", &ResolvedOptions::default());
        assert_eq!(tokens, vec!["Oak", "the", "Bay"]);
    }

    #[test]
    fn test_short_check_uses_normalized_length() {
        // "J." normalizes to "J"
        let tokens = tokenize("J. R. R. Tolkien", &ResolvedOptions::default());
        assert_eq!(tokens, vec!["Tolkien"]);
    }

    #[test]
    fn test_punctuation_inside_words_is_stripped() {
        let tokens = tokenize("Jane-Doe O'Brien", &ResolvedOptions::default());
        assert_eq!(tokens, vec!["JaneDoe", "OBrien"]);
    }

    #[test]
    fn test_all_filtered_yields_empty() {
        let tokens = tokenize("New York City", &options(SearchOptions::new().ignore_suffixes(["new", "york", "city"])));
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_custom_suffixes_replace_defaults() {
        let opts = options(SearchOptions::new().ignore_suffixes(["County"]));
        let tokens = tokenize("Kern County State", &opts);
        assert_eq!(tokens, vec!["Kern", "State"]);
    }

    #[test]
    fn test_word_matching_off_keeps_every_word() {
        let opts = options(SearchOptions::new().word_based_matching(false));
        let tokens = tokenize("Lagos  State of", &opts);
        assert_eq!(tokens, vec!["Lagos", "State", "of"]);
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let tokens = tokenize("doe john doe", &ResolvedOptions::default());
        assert_eq!(tokens, vec!["doe", "john", "doe"]);
    }

    #[test]
    fn test_normalized_term() {
        let term = NormalizedTerm::new("  Jane Doe ", &ResolvedOptions::default());
        assert_eq!(term.raw, "Jane Doe");
        assert_eq!(term.normalized, "JaneDoe");
        assert_eq!(term.tokens, vec!["Jane", "Doe"]);
    }

    #[test]
    fn test_match_tokens_respects_word_matching() {
        let opts = options(SearchOptions::new().word_based_matching(false));
        let term = NormalizedTerm::new("Jane Doe", &opts);
        assert!(term.match_tokens(&opts).is_empty());
        assert_eq!(term.tokens.len(), 2);
    }
}
