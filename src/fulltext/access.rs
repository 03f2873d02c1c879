//! Open-access status signals.
//!
//! Bronze: the page is free to read but carries no explicit license.
//! Hybrid: the page labels itself open access, or states a license in a
//! sentence we can recognise.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::Page;
use crate::error::Result;
use crate::text::normalized_strings_equal;

use super::license::{find_normalized_license, trust_publisher_license};

pub const VIA_FREE_ARTICLE: &str = "open (via free article)";
pub const VIA_OPEN_ACCESS_LABEL: &str = "open (via page says Open Access)";
pub const VIA_LICENSE: &str = "open (via page says license)";
pub const VIA_AUTHOR_MANUSCRIPT: &str = "open (author manuscript)";

/// Marker for pages that are open but name no concrete license.
pub const UNSPECIFIED_OA: &str = "unspecified-oa";

/// Text of the ScienceDirect control linking to the accepted manuscript.
const SD_MANUSCRIPT_LABEL: &str = "View Open Manuscript";

#[allow(clippy::expect_used)]
fn keyed(table: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
    table
        .iter()
        .map(|(key, pattern)| {
            (
                *key,
                Regex::new(&format!("(?is){pattern}")).expect("access pattern"),
            )
        })
        .collect()
}

/// (landing URL snippet, markup pattern)
static BRONZE_URL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    keyed(&[
        ("sciencedirect.com/", r#"<div class="OpenAccessLabel">open archive</div>"#),
        (
            "sciencedirect.com/",
            r#"<span[^>]*class="[^"]*pdf-download-label[^"]*"[^>]*>Download PDF</span>"#,
        ),
        (
            "sciencedirect.com/",
            r#"<span class="primary-cta-button-text|link-button-text">View\s*<strong>PDF</strong></span>"#,
        ),
        ("onlinelibrary.wiley.com", r#"<div[^>]*class="doi-access"[^>]*>Free Access</div>"#),
        ("openedition.org", r#"<span[^>]*id="img-freemium"[^>]*></span>"#),
        ("openedition.org", r#"<span[^>]*id="img-openaccess"[^>]*></span>"#),
        // markup there is broken: <span class="accesstext"></span>Free</span>
        ("microbiologyresearch.org", r#"<span class="accesstext">(?:</span>)?Free"#),
        ("journals.lww.com", r#"<li[^>]*id="[^"]*-article-indicators-free"[^>]*>"#),
        ("ashpublications.org", r#"<i[^>]*class="[^"]*icon-availability_free"#),
        ("academic.oup.com", r#"<i[^>]*class="[^"]*icon-availability_free"#),
        ("publications.aap.org", r#"<i[^>]*class="[^"]*icon-availability_free"#),
        ("degruyter.com/", r"<span>Free Access</span>"),
        ("degruyter.com/", r#"data-accessrestricted="false""#),
        ("practicalactionpublishing.com", r#"<img [^>]*class="open-access-icon""#),
        ("iucnredlist.org", r"<title>"),
    ])
});

/// (publisher name, markup pattern)
static BRONZE_PUBLISHER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    keyed(&[
        ("New England Journal of Medicine (NEJM/MMS)", r#"<meta content="yes" name="evt-free""#),
        ("Massachusetts Medical Society", r#"<meta content="yes" name="evt-free""#),
        ("University of Chicago Press", r#"<img[^>]*class="[^"]*accessIconLocation"#),
        (
            "Elsevier BV",
            r#"<span[^>]*class="[^"]*article-header__access[^"]*"[^>]*>Open Archive</span>"#,
        ),
    ])
});

#[allow(clippy::expect_used)]
static BRONZE_CITATION_PDF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^https?://www\.sciencedirect\.com/science/article/pii/S[0-9X]+/pdf(?:ft)?\?md5=[0-9a-f]+.*[0-9x]+-main.pdf$",
    )
    .expect("BRONZE_CITATION_PDF regex")
});

static HYBRID_URL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    keyed(&[
        ("projecteuclid.org/", r"<strong>Full-text: Open access</strong>"),
        ("sciencedirect.com/", r#"<div class="OpenAccessLabel">open access</div>"#),
        (
            "journals.ametsoc.org/",
            r#"src="/templates/jsp/_style2/_ams/images/access_free\.gif""#,
        ),
        (
            "apsjournals.apsnet.org",
            r#"src="/products/aps/releasedAssets/images/open-access-icon\.png""#,
        ),
        ("psychiatriapolska.pl", r"is an Open Access journal:"),
        ("journals.lww.com", r#"<span class="[^>]*ejp-indicator--free"#),
        ("journals.lww.com", r#"<img[^>]*src="[^"]*/icon-access-open\.gif"[^>]*>"#),
        ("iospress.com", r#"<img[^>]*src="[^"]*/img/openaccess_icon.png[^"]*"[^>]*>"#),
        ("rti.org/", r"</svg>[^<]*Open Access[^<]*</span>"),
        ("cambridge.org/", r#"<span[^>]*class="open-access"[^>]*>Open access</span>"#),
    ])
});

/// Only consulted when nothing else produced a license.
static HYBRID_BACKUP_URL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| keyed(&[("degruyter.com/", r"<span>Open Access</span>")]));

static HYBRID_PUBLISHER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    keyed(&[
        ("Informa UK Limited", r"/accessOA.png"),
        ("Oxford University Press (OUP)", r"<i class='icon-availability_open'"),
        ("Institute of Electrical and Electronics Engineers (IEEE)", r#""isOpenAccess":true"#),
        ("Institute of Electrical and Electronics Engineers (IEEE)", r#""openAccessFlag":"yes""#),
        ("Royal Society of Chemistry (RSC)", r"/open_access_blue.png"),
        (
            "Cambridge University Press (CUP)",
            r#"<span class="icon access open-access cursorDefault">"#,
        ),
        ("Wiley", r#"<div[^>]*class="doi-access"[^>]*>Open Access</div>"#),
    ])
});

/// Sentences that state a license; group 1 holds the license wording.
#[allow(clippy::expect_used)]
static LICENSE_SENTENCES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(creativecommons.org/licenses/[a-z\-]+)",
        r"distributed under the terms (.*) which permits",
        r"This is an open access article under the terms (.*) which permits",
        r"This is an open-access article distributed under the terms (.*), where it is permissible",
        r"This is an open access article published under (.*) which permits",
        r#"<div class="openAccess-articleHeaderContainer(.*?)</div>"#,
        r"this article is published under the creative commons (.*) licence",
        r"This work is licensed under a Creative Commons (.*), which permits ",
    ]
    .into_iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("license sentence"))
    .collect()
});

fn url_matches(table: &[(&'static str, Regex)], resolved_url: &str, markup: &str) -> bool {
    let url = resolved_url.to_lowercase();
    table
        .iter()
        .any(|(snippet, re)| url.contains(snippet) && re.is_match(markup))
}

fn publisher_matches(table: &[(&'static str, Regex)], publisher: &str, markup: &str) -> bool {
    table
        .iter()
        .any(|(name, re)| normalized_strings_equal(name, publisher) && re.is_match(markup))
}

/// Provenance string when the page is free to read without a license.
#[must_use]
pub fn detect_bronze(
    markup: &str,
    publisher: Option<&str>,
    resolved_url: &str,
    citation_pdf_url: Option<&str>,
) -> Option<&'static str> {
    let free = url_matches(&BRONZE_URL_PATTERNS, resolved_url, markup)
        || publisher_matches(&BRONZE_PUBLISHER_PATTERNS, publisher.unwrap_or_default(), markup)
        || citation_pdf_url.is_some_and(|href| BRONZE_CITATION_PDF.is_match(href));
    free.then_some(VIA_FREE_ARTICLE)
}

/// Result of hybrid detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridSignal {
    pub open_version_source_string: &'static str,
    /// Concrete license code, or [`UNSPECIFIED_OA`].
    pub license: String,
}

impl HybridSignal {
    fn labelled() -> Self {
        Self {
            open_version_source_string: VIA_OPEN_ACCESS_LABEL,
            license: UNSPECIFIED_OA.to_string(),
        }
    }
}

/// Explicit open-access labelling or license sentence.
///
/// License sentences are read from `excerpt` and only on trusted hosts. When
/// several sentence patterns match, the last one decides.
#[must_use]
pub fn detect_hybrid(
    markup: &str,
    excerpt: &str,
    publisher: Option<&str>,
    resolved_url: &str,
) -> Option<HybridSignal> {
    let mut signal = None;

    if url_matches(&HYBRID_URL_PATTERNS, resolved_url, markup)
        || url_matches(&HYBRID_BACKUP_URL_PATTERNS, resolved_url, markup)
        || publisher_matches(&HYBRID_PUBLISHER_PATTERNS, publisher.unwrap_or_default(), markup)
    {
        signal = Some(HybridSignal::labelled());
    }

    if trust_publisher_license(Some(resolved_url).filter(|u| !u.is_empty())) {
        for sentence in LICENSE_SENTENCES.iter() {
            let Some(caps) = sentence.captures(excerpt) else {
                continue;
            };
            let wording = caps.get(1).map_or("", |m| m.as_str());
            signal = Some(match find_normalized_license(wording) {
                Some(code) => HybridSignal {
                    open_version_source_string: VIA_LICENSE,
                    license: code.to_string(),
                },
                None => HybridSignal::labelled(),
            });
        }
    }

    signal
}

/// ScienceDirect page linking to an open accepted manuscript.
pub fn detect_sd_author_manuscript(page: &Page) -> Result<Option<&'static str>> {
    if !page.markup().contains(SD_MANUSCRIPT_LABEL) {
        return Ok(None);
    }
    let found = page
        .select("*")?
        .iter()
        .any(|el| &*el.text() == SD_MANUSCRIPT_LABEL);
    Ok(found.then_some(VIA_AUTHOR_MANUSCRIPT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetLimits, CallBudget};

    #[test]
    fn bronze_by_host() {
        let markup = r#"<div class="doi-access">Free Access</div>"#;
        assert_eq!(
            detect_bronze(markup, None, "https://onlinelibrary.wiley.com/doi/10.1/x", None),
            Some(VIA_FREE_ARTICLE)
        );
        assert_eq!(detect_bronze(markup, None, "https://example.org/a", None), None);
    }

    #[test]
    fn bronze_by_publisher() {
        let markup = r#"<meta content="yes" name="evt-free" />"#;
        assert_eq!(
            detect_bronze(markup, Some("Massachusetts Medical Society"), "https://www.nejm.org/doi/1", None),
            Some(VIA_FREE_ARTICLE)
        );
        assert_eq!(detect_bronze(markup, None, "https://www.nejm.org/doi/1", None), None);
    }

    #[test]
    fn bronze_by_sciencedirect_citation_pdf() {
        let href = "https://www.sciencedirect.com/science/article/pii/S0001457513001017/pdfft?md5=abc123&pid=1-s2.0-S0001457513001017-main.pdf";
        assert_eq!(detect_bronze("", None, "https://example.org", Some(href)), Some(VIA_FREE_ARTICLE));
    }

    #[test]
    fn hybrid_label_is_unspecified() {
        let signal = detect_hybrid(
            r#"<span class="open-access">Open access</span>"#,
            "",
            None,
            "https://www.cambridge.org/core/article/x",
        );
        assert_eq!(signal, Some(HybridSignal::labelled()));
    }

    #[test]
    fn hybrid_sentence_extracts_license() {
        let excerpt = "This is an open access article distributed under the terms of the Creative Commons Attribution License, which permits unrestricted use.";
        let signal = detect_hybrid(excerpt, excerpt, None, "https://journal.example.org/a");
        assert_eq!(
            signal,
            Some(HybridSignal {
                open_version_source_string: VIA_LICENSE,
                license: "cc-by".to_string(),
            })
        );
    }

    #[test]
    fn hybrid_sentence_ignored_on_untrusted_host() {
        let excerpt = "distributed under the terms of the CC BY license which permits reuse";
        assert_eq!(
            detect_hybrid(excerpt, excerpt, None, "https://www.berghahnjournals.com/view/x"),
            None
        );
    }

    #[test]
    fn degruyter_backup_label() {
        assert_eq!(
            detect_hybrid("<span>Open Access</span>", "", None, "https://www.degruyter.com/document/x"),
            Some(HybridSignal::labelled())
        );
    }

    #[test]
    fn sd_manuscript_label() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse(r#"<a href="/am">View Open Manuscript</a>"#, &budget);
        assert!(matches!(detect_sd_author_manuscript(&page), Ok(Some(VIA_AUTHOR_MANUSCRIPT))));

        let other = Page::parse(r#"<a href="/x">View Open Manuscript (PDF)</a>"#, &budget);
        assert!(matches!(detect_sd_author_manuscript(&other), Ok(None)));
    }
}
