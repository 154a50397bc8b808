//! Punctuation stripping for punctuation-insensitive comparison.
//!
//! Must agree with the SQL side, which strips with
//! `REGEXP_REPLACE(..., '[^a-zA-Z0-9]', '', 'g')`.

/// Remove every character that is not an ASCII letter or digit.
///
/// Case and order of the remaining characters are preserved.
///
/// ```
/// use pg_search::search::normalize;
///
/// assert_eq!(normalize("123-456-7890"), "1234567890");
/// assert_eq!(normalize("Jane Doe"), "JaneDoe");
/// ```
pub fn normalize(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_whitespace() {
        assert_eq!(normalize("Jane-Doe"), "JaneDoe");
        assert_eq!(normalize("987.654.3210"), "9876543210");
        assert_eq!(normalize("  a b\tc  "), "abc");
    }

    #[test]
    fn test_preserves_case() {
        assert_eq!(normalize("Oak-Li"), "OakLi");
    }

    #[test]
    fn test_empty_and_all_punctuation() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("...---..."), "");
    }

    #[test]
    fn test_non_ascii_letters_removed() {
        // [^a-zA-Z0-9] on the SQL side drops these too
        assert_eq!(normalize("Zürich"), "Zrich");
        assert_eq!(normalize("東京2020"), "2020");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("(555) 999-8888 ext. 12");
        assert_eq!(normalize(&once), once);
    }
}
