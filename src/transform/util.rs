use crate::config;

/// Trims free text and collapses inner whitespace runs to one space.
///
/// Applied identically when dimension rows are built and when fact lookup
/// keys are built, so both sides compare equal.
pub fn normalize_text(raw: &str) -> String {
    config::WHITESPACE_RUN_RE
        .replace_all(raw.trim(), " ")
        .into_owned()
}

pub fn normalize_optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_kept_verbatim() {
        assert_eq!(normalize_text("  I Didn't  Mean\tTo "), "I Didn't Mean To");
    }

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some("Hamilton, Ohio")).as_deref(),
            Some("Hamilton, Ohio")
        );
    }
}
