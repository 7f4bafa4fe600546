/// Canonical form of a handle: trimmed, without leading `@`, lowercase.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_lowercase()
}

/// Trim optional free text, collapsing blank values to `None`.
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_at_and_whitespace_and_lowercases() {
        assert_eq!(normalize_username("@Foo "), "foo");
        assert_eq!(normalize_username("  @@RustLang\t"), "rustlang");
        assert_eq!(normalize_username("plain"), "plain");
    }

    #[test]
    fn at_only_becomes_empty() {
        assert_eq!(normalize_username(" @ "), "");
        assert_eq!(normalize_username(""), "");
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(normalize_optional_text(Some("  ".into())), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" Ferris ".into())),
            Some("Ferris".to_string())
        );
    }
}
