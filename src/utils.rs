//! Small string helpers shared by logging and error paths.

/// Truncates a string to at most `max_chars` characters, adding "..." if truncated.
///
/// Counts characters, not bytes, so multi-byte input never splits a code point.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    const SUFFIX: &str = "...";

    // Byte length <= max_chars implies char count <= max_chars.
    if s.len() <= max_chars || s.chars().count() <= max_chars {
        return s.to_string();
    }

    let suffix_len = SUFFIX.chars().count();
    if max_chars <= suffix_len {
        return SUFFIX.chars().take(max_chars).collect();
    }

    let truncated: String = s.chars().take(max_chars - suffix_len).collect();
    format!("{}{}", truncated, SUFFIX)
}

/// Trim and map empty strings to `None`.
pub fn non_empty_trimmed(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_truncation_needed() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello", 5), "hello");
        assert_eq!(truncate_str("", 10), "");
    }

    #[test]
    fn test_truncation_ascii() {
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("abcdefghij", 6), "abc...");
    }

    #[test]
    fn test_truncation_multibyte() {
        assert_eq!(truncate_str("h\u{e9}llo w\u{f6}rld", 8), "h\u{e9}llo...");
        assert_eq!(truncate_str("\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}", 4), "\u{2022}...");
    }

    #[test]
    fn test_edge_cases() {
        assert_eq!(truncate_str("hello", 3), "...");
        assert_eq!(truncate_str("hello", 1), ".");
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_non_empty_trimmed() {
        assert_eq!(non_empty_trimmed("  "), None);
        assert_eq!(non_empty_trimmed(""), None);
        assert_eq!(non_empty_trimmed(" save 20% "), Some("save 20%".to_string()));
    }
}
