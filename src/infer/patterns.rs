//! Compiled regex patterns for header-cell and value classification.

use std::sync::LazyLock;

use regex::Regex;

/// Canonical GUID, braces optional.
pub static GUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\{?[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\}?$",
    )
    .expect("Invalid GUID pattern")
});

/// Boolean-looking header cell.
pub static BOOLEAN_WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(true|false|yes|no)$").expect("Invalid boolean pattern"));

/// Numeric-looking header cell: digits with optional sign and separators.
pub static NUMERIC_LIKE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[\d.,\s\u{00A0}]*\d[\d.,\s\u{00A0}]*%?$").expect("Invalid numeric pattern")
});

/// Date-looking header cell: two separators between digit groups, with an
/// optional time part.
pub static DATE_LIKE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}([T ]\d{1,2}:\d{2}(:\d{2})?)?$")
        .expect("Invalid date pattern")
});

/// Characters that rarely occur in genuine column names.
pub static UNCOMMON_SYMBOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N} _\-./#()&%:?!]").expect("Invalid symbol pattern")
});

/// Single-column header shape: letters optionally followed by one digit.
pub static WORD_DIGIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}+\d?$").expect("Invalid word pattern"));

/// Numeric-ish text for the last-resort "possible match" heuristic.
pub static NUMERIC_ISH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+(]?[\d.,'\s\u{00A0}%‰$€£¥)]*\d[\d.,'\s\u{00A0}%‰$€£¥)]*$")
        .expect("Invalid numeric-ish pattern")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_pattern() {
        assert!(GUID_PATTERN.is_match("550e8400-e29b-41d4-a716-446655440000"));
        assert!(GUID_PATTERN.is_match("{550E8400-E29B-41D4-A716-446655440000}"));
        assert!(!GUID_PATTERN.is_match("550e8400e29b41d4a716446655440000"));
        assert!(!GUID_PATTERN.is_match("not-a-guid"));
    }

    #[test]
    fn test_numeric_like_pattern() {
        assert!(NUMERIC_LIKE_PATTERN.is_match("1234"));
        assert!(NUMERIC_LIKE_PATTERN.is_match("-1,234.56"));
        assert!(NUMERIC_LIKE_PATTERN.is_match("12.5%"));
        assert!(!NUMERIC_LIKE_PATTERN.is_match("total"));
        assert!(!NUMERIC_LIKE_PATTERN.is_match("q1"));
    }

    #[test]
    fn test_date_like_pattern() {
        assert!(DATE_LIKE_PATTERN.is_match("2023-12-31"));
        assert!(DATE_LIKE_PATTERN.is_match("31.12.2023"));
        assert!(DATE_LIKE_PATTERN.is_match("12/31/2023 10:30:00"));
        assert!(!DATE_LIKE_PATTERN.is_match("price"));
    }

    #[test]
    fn test_word_digit_pattern() {
        assert!(WORD_DIGIT_PATTERN.is_match("Name"));
        assert!(WORD_DIGIT_PATTERN.is_match("Wert1"));
        assert!(!WORD_DIGIT_PATTERN.is_match("Wert12"));
        assert!(!WORD_DIGIT_PATTERN.is_match("a b"));
    }

    #[test]
    fn test_numeric_ish_pattern() {
        assert!(NUMERIC_ISH_PATTERN.is_match("1.234,56"));
        assert!(NUMERIC_ISH_PATTERN.is_match("$ 12.50"));
        assert!(NUMERIC_ISH_PATTERN.is_match("12 %"));
        assert!(!NUMERIC_ISH_PATTERN.is_match("about 12"));
    }
}
