//! Bounding guide text to a single extraction request

/// Default character budget for one extraction request
pub const DEFAULT_MAX_CHARS: usize = 12_000;

/// Guide text bounded to a character budget
///
/// Immutable once built. `truncated` records whether the original text had
/// to be cut to fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    truncated: bool,
    original_chars: usize,
}

impl NormalizedText {
    /// The bounded text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether characters were dropped
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Character count of the text before truncation
    pub fn original_chars(&self) -> usize {
        self.original_chars
    }

    /// Character count after truncation
    pub fn char_count(&self) -> usize {
        if self.truncated {
            self.text.chars().count()
        } else {
            self.original_chars
        }
    }

    /// Consume into the bounded string
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Keep the first `max_chars` Unicode scalar values of `text`
///
/// Text at or under the budget is returned unchanged with `truncated ==
/// false`. Nothing is appended to truncated text.
pub fn normalize(text: &str, max_chars: usize) -> NormalizedText {
    let original_chars = text.chars().count();

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => NormalizedText {
            text: text[..cut].to_string(),
            truncated: true,
            original_chars,
        },
        None => NormalizedText {
            text: text.to_string(),
            truncated: false,
            original_chars,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_unchanged() {
        let normalized = normalize("Use Arial 11pt.", DEFAULT_MAX_CHARS);
        assert_eq!(normalized.as_str(), "Use Arial 11pt.");
        assert!(!normalized.is_truncated());
        assert_eq!(normalized.original_chars(), 15);
        assert_eq!(normalized.char_count(), 15);
    }

    #[test]
    fn test_exact_budget_not_truncated() {
        let normalized = normalize("abcde", 5);
        assert_eq!(normalized.as_str(), "abcde");
        assert!(!normalized.is_truncated());
    }

    #[test]
    fn test_long_text_truncated() {
        let text = "x".repeat(12_500);
        let normalized = normalize(&text, DEFAULT_MAX_CHARS);
        assert!(normalized.is_truncated());
        assert_eq!(normalized.char_count(), 12_000);
        assert_eq!(normalized.original_chars(), 12_500);
        assert!(!normalized.as_str().ends_with("..."));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let normalized = normalize("ééééé", 3);
        assert_eq!(normalized.as_str(), "ééé");
        assert!(normalized.is_truncated());
    }

    #[test]
    fn test_empty_text() {
        let normalized = normalize("", 10);
        assert_eq!(normalized.into_string(), "");
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_budget(text in ".{0,300}", max in 1usize..200) {
            let normalized = normalize(&text, max);
            prop_assert!(normalized.char_count() <= max);
            prop_assert_eq!(normalized.char_count(), normalized.as_str().chars().count());
        }

        #[test]
        fn prop_truncated_iff_over_budget(text in ".{0,300}", max in 1usize..200) {
            let normalized = normalize(&text, max);
            let chars = text.chars().count();
            prop_assert_eq!(normalized.is_truncated(), chars > max);
            prop_assert!(text.starts_with(normalized.as_str()));
            if !normalized.is_truncated() {
                prop_assert_eq!(normalized.as_str(), text.as_str());
            }
        }
    }
}
