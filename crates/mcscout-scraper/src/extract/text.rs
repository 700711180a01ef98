//! Text normalization shared by the snapshot and registration extractors.

/// Minimum count of digit/separator characters for a phone value to be kept.
const MIN_PHONE_CHARS: usize = 10;

/// Normalizes a scraped field value to a single trimmed line.
///
/// Unescapes the handful of entities the service double-encodes, turns
/// non-breaking spaces and newlines into spaces, and collapses whitespace
/// runs.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let unescaped = raw
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    // `split_whitespace` treats U+00A0 and `\n` as whitespace.
    unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps digits, whitespace, and `- ( ) + .` from a phone value.
///
/// Returns `None` when fewer than ten non-whitespace characters survive.
#[must_use]
pub fn clean_phone(raw: &str) -> Option<String> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace() || "-()+.".contains(*c))
        .collect();
    let significant = kept.chars().filter(|c| !c.is_whitespace()).count();
    if significant >= MIN_PHONE_CHARS {
        Some(clean_text(&kept))
    } else {
        None
    }
}

/// Returns the first run of ASCII digits in `raw`.
#[must_use]
pub fn first_digit_run(raw: &str) -> Option<&str> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let rest = &raw[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Whether `text` contains `prefix` immediately followed by `identifier`,
/// with no further digit after it (so `MC-12` does not match `MC-123`).
#[must_use]
pub fn contains_reference(text: &str, prefix: &str, identifier: &str) -> bool {
    let needle = format!("{prefix}{identifier}");
    text.match_indices(&needle).any(|(pos, _)| {
        !text[pos + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_whitespace_and_nbsp() {
        assert_eq!(
            clean_text("  123 MAIN ST\n\u{a0}\u{a0}SPRINGFIELD,   IL  "),
            "123 MAIN ST SPRINGFIELD, IL"
        );
    }

    #[test]
    fn clean_text_unescapes_entities() {
        assert_eq!(clean_text("A&amp;B&nbsp;&lt;LLC&gt;"), "A&B <LLC>");
    }

    #[test]
    fn clean_text_does_not_double_unescape() {
        assert_eq!(clean_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn clean_phone_keeps_separators() {
        assert_eq!(clean_phone("Tel: (555) 555-1234").as_deref(), Some("(555) 555-1234"));
    }

    #[test]
    fn clean_phone_rejects_short_values() {
        assert_eq!(clean_phone("555-1234"), None);
        assert_eq!(clean_phone("N/A"), None);
    }

    #[test]
    fn clean_phone_ignores_spaces_when_counting() {
        // nine digits padded with spaces is still too short
        assert_eq!(clean_phone("1 2 3 4 5 6 7 8 9"), None);
        assert_eq!(clean_phone("+1.555.555.1234").as_deref(), Some("+1.555.555.1234"));
    }

    #[test]
    fn first_digit_run_finds_leading_number() {
        assert_eq!(first_digit_run("USDOT 1234567 (active)"), Some("1234567"));
        assert_eq!(first_digit_run("none"), None);
    }

    #[test]
    fn contains_reference_requires_digit_boundary() {
        assert!(contains_reference("Docket MC-123456 ", "MC-", "123456"));
        assert!(contains_reference("MC-123456", "MC-", "123456"));
        assert!(!contains_reference("MC-1234567", "MC-", "123456"));
        assert!(contains_reference("MC-1234567 and MC-123456,", "MC-", "123456"));
    }
}
