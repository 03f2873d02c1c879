//! Host-specific full-text URL rewrites.
//!
//! Several publishers expose a reader or landing variant of the PDF URL that
//! does not serve the file itself. The table maps those to the direct form.
//! Rules are tried in order and the first matching rule is the only one applied.

use std::sync::LazyLock;

use regex::Regex;

enum Replacement {
    /// Regex replacement template applied to the first match.
    Template(&'static str),
    /// Plain substring swap applied to the whole URL.
    Swap(&'static str, &'static str),
}

struct Rewrite {
    pattern: Regex,
    replacement: Replacement,
}

impl Rewrite {
    fn apply(&self, url: &str) -> Option<String> {
        if !self.pattern.is_match(url) {
            return None;
        }
        Some(match self.replacement {
            Replacement::Template(template) => self.pattern.replace(url, template).into_owned(),
            Replacement::Swap(from, to) => url.replace(from, to),
        })
    }
}

#[allow(clippy::expect_used)]
static REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    use Replacement::{Swap, Template};

    [
        (
            r"(https?://[\w.]*onlinelibrary\.wiley\.com/doi/)pdf(/.+)",
            Template("${1}pdfdirect${2}"),
        ),
        (r"(^https?://drops\.dagstuhl\.de/.*\.pdf)/$", Template("${1}")),
        (
            r"^(https?://repository\.ubn\.ru\.nl/bitstream/)(\d+.*\.pdf)$",
            Template("${1}handle/${2}"),
        ),
        (r"^http://(journal\.nileuniversity\.edu\.ng/?.*)", Template("https://${1}")),
        (
            r"^http://virginialibrariesjournal\.org//articles",
            Template("http://virginialibrariesjournal.org/articles"),
        ),
        (r"^http://www\.(ecologyandsociety\.org/.*\.pdf)", Template("https://www.${1}")),
        (
            r"^https?://recyt\.fecyt\.es/index\.php/EPI/article/view/",
            Swap("/article/view/", "/article/download/"),
        ),
        (
            r"^https?://(www\.)?(mitpressjournals\.org|journals\.uchicago\.edu)/doi/full/10\.",
            Swap("/doi/full/", "/doi/pdf/"),
        ),
        (
            r"^https?://(www\.)?ascopubs\.org/doi/full/10\.",
            Swap("/doi/full/", "/doi/pdfdirect/"),
        ),
        (
            r"^https?://(www\.)?(ahajournals\.org|journals\.sagepub\.com)/doi/reader/10\.",
            Swap("/doi/reader/", "/doi/pdf/"),
        ),
        (
            r"^https?://(www\.)?(tandfonline\.com|ajronline\.org|pubs\.acs\.org|royalsocietypublishing\.org)/doi/epdf/10\.",
            Swap("/doi/epdf/", "/doi/pdf/"),
        ),
        (
            r"^https?://(www\.)?onlinelibrary\.wiley\.com/doi/epdf/10\.",
            Swap("/epdf/", "/pdfdirect/"),
        ),
        (
            r"^https?://(journals\.)?healio\.com/doi/epdf/10\.",
            Swap("/doi/epdf/", "/doi/pdf/"),
        ),
        (
            r"^https?://(pubs\.)?rsna\.org/doi/epdf/10\.",
            Swap("/doi/epdf/", "/doi/pdf/"),
        ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| Rewrite {
        pattern: Regex::new(pattern).expect("rewrite pattern"),
        replacement,
    })
    .collect()
});

const NATURE_ARTICLES: &str = "https://www.nature.com/articles/";

/// Apply the first matching rewrite rule, if any.
#[must_use]
pub fn rewrite_pdf_url(url: &str) -> String {
    REWRITES
        .iter()
        .find_map(|rule| rule.apply(url))
        .unwrap_or_else(|| url.to_string())
}

/// Nature serves a preview PDF; prefer the `_reference.pdf` variant when the
/// page links to it.
#[must_use]
pub fn prefer_nature_reference_pdf(url: &str, markup: &str) -> String {
    let Some(stem) = url
        .strip_prefix(NATURE_ARTICLES)
        .and_then(|rest| rest.strip_suffix(".pdf"))
    else {
        return url.to_string();
    };

    let reference_path = format!("/articles/{stem}_reference.pdf");
    if markup.contains(&reference_path) {
        format!("{NATURE_ARTICLES}{stem}_reference.pdf")
    } else {
        url.to_string()
    }
}

/// Full rewrite pipeline for an absolute full-text URL.
#[must_use]
pub fn finalize_pdf_url(url: &str, markup: &str) -> String {
    prefer_nature_reference_pdf(&rewrite_pdf_url(url), markup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiley_pdf_becomes_pdfdirect() {
        assert_eq!(
            rewrite_pdf_url("https://onlinelibrary.wiley.com/doi/pdf/10.1111/j.1461-0248.2011.01645.x"),
            "https://onlinelibrary.wiley.com/doi/pdfdirect/10.1111/j.1461-0248.2011.01645.x"
        );
    }

    #[test]
    fn wiley_epdf_becomes_pdfdirect() {
        assert_eq!(
            rewrite_pdf_url("https://onlinelibrary.wiley.com/doi/epdf/10.1002/abc.1"),
            "https://onlinelibrary.wiley.com/doi/pdfdirect/10.1002/abc.1"
        );
    }

    #[test]
    fn reader_and_full_variants() {
        assert_eq!(
            rewrite_pdf_url("https://www.ahajournals.org/doi/reader/10.1161/CIR.1"),
            "https://www.ahajournals.org/doi/pdf/10.1161/CIR.1"
        );
        assert_eq!(
            rewrite_pdf_url("https://ascopubs.org/doi/full/10.1200/JCO.1"),
            "https://ascopubs.org/doi/pdfdirect/10.1200/JCO.1"
        );
        assert_eq!(
            rewrite_pdf_url("https://www.journals.uchicago.edu/doi/full/10.1086/1"),
            "https://www.journals.uchicago.edu/doi/pdf/10.1086/1"
        );
        assert_eq!(
            rewrite_pdf_url("https://www.tandfonline.com/doi/epdf/10.1080/1?needAccess=true"),
            "https://www.tandfonline.com/doi/pdf/10.1080/1?needAccess=true"
        );
    }

    #[test]
    fn template_rules() {
        assert_eq!(
            rewrite_pdf_url("https://drops.dagstuhl.de/opus/volltexte/2018/1.pdf/"),
            "https://drops.dagstuhl.de/opus/volltexte/2018/1.pdf"
        );
        assert_eq!(
            rewrite_pdf_url("https://repository.ubn.ru.nl/bitstream/2066/47467/1/47467.pdf"),
            "https://repository.ubn.ru.nl/bitstream/handle/2066/47467/1/47467.pdf"
        );
        assert_eq!(
            rewrite_pdf_url("http://journal.nileuniversity.edu.ng/index.php/x.pdf"),
            "https://journal.nileuniversity.edu.ng/index.php/x.pdf"
        );
        assert_eq!(
            rewrite_pdf_url("http://www.ecologyandsociety.org/vol1/art1.pdf"),
            "https://www.ecologyandsociety.org/vol1/art1.pdf"
        );
    }

    #[test]
    fn unknown_hosts_are_untouched() {
        let url = "https://example.org/doi/pdf/10.1/x";
        assert_eq!(rewrite_pdf_url(url), url);
    }

    #[test]
    fn nature_reference_pdf_preferred_when_linked() {
        let url = "https://www.nature.com/articles/s41586-020-1.pdf";
        let markup = r#"<a href="/articles/s41586-020-1_reference.pdf">PDF</a>"#;
        assert_eq!(
            finalize_pdf_url(url, markup),
            "https://www.nature.com/articles/s41586-020-1_reference.pdf"
        );
        assert_eq!(finalize_pdf_url(url, "<p>no preview</p>"), url);
    }
}
