//! Text normalization shared by strategies and heuristics.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\w+.*?>").expect("OPEN_TAG regex"));

#[allow(clippy::expect_used)]
static FILLER_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:a|an|the|and)\b").expect("FILLER_WORDS regex"));

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE regex"));

#[allow(clippy::expect_used)]
static UNICODE_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("UNICODE_ESCAPE regex"));

/// Comparison key for publisher names and similar labels.
///
/// Lowercases, drops opening tags and punctuation, removes the words
/// "a", "an", "the" and "and", then removes all whitespace.
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let untagged = OPEN_TAG.replace_all(&lowered, "");
    let bare: String = untagged
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let trimmed = FILLER_WORDS.replace_all(&bare, "");
    WHITESPACE.replace_all(&trimmed, "").into_owned()
}

/// Equal after [`normalize`]. Empty strings never match anything.
#[must_use]
pub fn normalized_strings_equal(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && normalize(a) == normalize(b)
}

/// Collapse runs of whitespace to one space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Decode `\uXXXX` and `\/` escapes left in hrefs lifted from script payloads.
#[must_use]
pub fn decode_escaped_href(href: &str) -> String {
    if !UNICODE_ESCAPE.is_match(href) && !href.contains("\\/") {
        return href.to_string();
    }
    let decoded = UNICODE_ESCAPE.replace_all(href, |caps: &regex::Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    });
    decoded.replace("\\/", "/")
}

/// Remove `prefix` from the start of `text`, ignoring ASCII case.
#[must_use]
pub fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> &'a str {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &text[prefix.len()..],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_filler_and_punctuation() {
        assert_eq!(normalize("The University of Chicago Press"), "universityofchicagopress");
        assert_eq!(
            normalize("Institute of Electrical and Electronics Engineers (IEEE)"),
            "instituteofelectricalelectronicsengineersieee"
        );
        assert_eq!(normalize(r#"<span class="pub">Wiley"#), "wiley");
    }

    #[test]
    fn normalized_equality_ignores_case_and_articles() {
        assert!(normalized_strings_equal("wiley", "Wiley"));
        assert!(normalized_strings_equal(
            "New England Journal of Medicine (NEJM/MMS)",
            "new england journal of medicine nejm mms"
        ));
        assert!(!normalized_strings_equal("", ""));
        assert!(!normalized_strings_equal("Wiley", "Elsevier BV"));
    }

    #[test]
    fn filler_words_only_removed_on_word_boundaries() {
        assert_eq!(normalize("Anthem Press"), "anthempress");
        assert_eq!(normalize("Theoretical Biology"), "theoreticalbiology");
    }

    #[test]
    fn collapse_whitespace_joins_lines() {
        assert_eq!(
            collapse_whitespace("  University of\n     São Paulo "),
            "University of São Paulo"
        );
    }

    #[test]
    fn escaped_hrefs_are_decoded() {
        assert_eq!(
            decode_escaped_href(r"/pdf?id=1\u0026type=main"),
            "/pdf?id=1&type=main"
        );
        assert_eq!(
            decode_escaped_href(r"https:\/\/example.org\/a.pdf"),
            "https://example.org/a.pdf"
        );
        assert_eq!(decode_escaped_href("/plain.pdf"), "/plain.pdf");
    }

    #[test]
    fn strip_prefix_is_case_insensitive() {
        assert_eq!(strip_prefix_ignore_case("ABSTRACT Body", "abstract"), " Body");
        assert_eq!(strip_prefix_ignore_case("Summary", "abstract"), "Summary");
        assert_eq!(strip_prefix_ignore_case("é", "abstract"), "é");
    }
}
