//! One landing page in, one [`PageRecord`] out.
//!
//! The classifier decodes the stored bytes, picks the strategy catalogue for
//! the page's namespace, runs strategy selection, resolves the full-text
//! location and assembles the record.

use tracing::{debug, info};

use crate::budget::CallBudget;
use crate::dom::{self, Page};
use crate::encoding;
use crate::error::{Error, Result};
use crate::fulltext;
use crate::options::{NoStrategyPolicy, Options};
use crate::result::{
    AuthorRecord, ContentType, ExtractionResult, FulltextLocation, Namespace, PageRecord, UrlEntry,
};
use crate::strategy::StrategyRegistry;
use crate::url_utils::is_absolute_url;

/// Classify landing-page bytes.
///
/// A fresh [`CallBudget`] with `options.budget` limits covers the whole call.
/// PDF payloads stored in place of HTML are read as an empty page.
///
/// # Errors
///
/// - [`Error::SelectorBudgetExceeded`] when the page needs too many selector
///   evaluations.
/// - [`Error::UnusualTraffic`] when the stored page is a bot interstitial.
/// - [`Error::StrategyNotFound`] when no strategy finds authors and the
///   namespace policy is [`NoStrategyPolicy::Fail`].
#[tracing::instrument(skip(markup, options), fields(bytes = markup.as_ref().len()))]
pub fn classify(
    markup: impl AsRef<[u8]>,
    namespace: Option<Namespace>,
    resolved_url: Option<&str>,
    options: &Options,
) -> Result<PageRecord> {
    let bytes = markup.as_ref();
    let budget = CallBudget::with_limits(options.budget);
    budget.reset();

    let page = if encoding::is_pdf(bytes) {
        debug!("pdf payload, using empty page");
        Page::null(&budget)
    } else {
        let decoded = encoding::decode(bytes);
        if decoded.had_errors {
            debug!(encoding = decoded.encoding.name(), "malformed byte sequences replaced");
        }
        Page::parse(decoded.text, &budget)
    };

    let record = classify_page(&page, namespace, resolved_url, options)?;
    debug!(calls = budget.calls(), "selector calls");
    Ok(record)
}

/// Classify an already parsed page, charging the page's own budget.
///
/// # Errors
///
/// Same as [`classify`].
pub fn classify_page(
    page: &Page,
    namespace: Option<Namespace>,
    resolved_url: Option<&str>,
    options: &Options,
) -> Result<PageRecord> {
    let base_url = match resolved_url {
        Some(url) => Some(url.to_string()),
        None => discover_base_url(page)?,
    };

    let registry = StrategyRegistry::for_namespace(namespace);
    let extraction = match registry.select(page) {
        Ok(selected) => {
            info!(
                strategy = selected.strategy,
                tier = ?selected.tier,
                authors = selected.result.authors.len(),
                "strategy selected"
            );
            selected.result
        }
        Err(Error::StrategyNotFound) if options.policy_for(namespace) == NoStrategyPolicy::EmptyAuthors => {
            debug!(?namespace, "no strategy found authors, continuing without authors");
            ExtractionResult::default()
        }
        Err(err) => return Err(err),
    };

    let base = base_url.as_deref();
    let limit = options.license_excerpt_limit;
    let location = match namespace {
        Some(Namespace::Doi) => fulltext::resolve_publisher(page, base, limit)?,
        Some(Namespace::Pmh) => fulltext::resolve_repository(page, base, limit)?.into_iter().next(),
        None => Some(FulltextLocation {
            license: fulltext::classify_license(page, base, limit)?,
            ..FulltextLocation::default()
        }),
    }
    .unwrap_or_default();

    let mut urls = Vec::new();
    if let Some(url) = location.url {
        urls.push(UrlEntry {
            url,
            content_type: ContentType::Pdf,
        });
    }
    if options.include_landing_url {
        if let Some(landing) = resolved_url {
            urls.push(UrlEntry {
                url: landing.to_string(),
                content_type: ContentType::Html,
            });
        }
    }

    Ok(PageRecord {
        authors: extraction.authors.into_iter().map(AuthorRecord::from).collect(),
        urls,
        license: location.license,
        version: location.version,
        abstract_text: extraction.abstract_text,
        oa_status: location.oa_status,
        open_version_source_string: location.open_version_source_string,
    })
}

/// Base URL for relative links when the caller supplied none.
///
/// Tries `<base href>`, the canonical link, `og:url` and `citation_url`, and
/// keeps the first absolute one.
pub fn discover_base_url(page: &Page) -> Result<Option<String>> {
    let base = page.select_first("base[href]")?.and_then(|b| dom::attr(&b, "href"));
    if let Some(url) = base.filter(|u| is_absolute_url(u)) {
        return Ok(Some(url));
    }
    let canonical = page
        .select_first(r#"link[rel="canonical"]"#)?
        .and_then(|l| dom::attr(&l, "href"));
    if let Some(url) = canonical.filter(|u| is_absolute_url(u)) {
        return Ok(Some(url));
    }
    for key in ["og:url", "citation_url"] {
        if let Some(url) = page.meta_content(key)?.filter(|u| is_absolute_url(u)) {
            return Ok(Some(url));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetLimits;

    #[test]
    fn pdf_payload_is_an_empty_page() {
        let options = Options::default();
        let record = classify(b"%PDF-1.7 binary", Some(Namespace::Pmh), None, &options);
        assert!(record.is_ok_and(|r| r.is_no_authors()));
    }

    #[test]
    fn publisher_page_without_authors_fails_by_default() {
        let options = Options::default();
        let result = classify("<html><body><p>Journal home</p></body></html>", Some(Namespace::Doi), None, &options);
        assert!(matches!(result, Err(Error::StrategyNotFound)));
    }

    #[test]
    fn base_url_discovery_order() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse(
            r#"<html><head>
               <link rel="canonical" href="/relative">
               <meta property="og:url" content="https://journal.example.org/article/1">
               </head></html>"#,
            &budget,
        );
        assert_eq!(
            discover_base_url(&page).ok().flatten().as_deref(),
            Some("https://journal.example.org/article/1")
        );
    }

    #[test]
    fn landing_entry_follows_pdf_entry() {
        let options = Options::default();
        let markup = r#"<html><head>
            <meta name="citation_author" content="Ada Lovelace">
            <meta name="citation_author_institution" content="Analytical Society">
            <meta name="citation_pdf_url" content="https://journal.example.org/article/1.pdf">
            </head><body></body></html>"#;
        let record = classify(markup, Some(Namespace::Doi), Some("https://journal.example.org/article/1"), &options)
            .unwrap_or_default();
        let kinds: Vec<ContentType> = record.urls.iter().map(|u| u.content_type).collect();
        assert_eq!(kinds, vec![ContentType::Pdf, ContentType::Html]);
        assert_eq!(record.pdf_url(), Some("https://journal.example.org/article/1.pdf"));
        assert_eq!(record.authors[0].affiliations[0].name, "Analytical Society");
    }

    #[test]
    fn tiny_budget_refuses_the_page() {
        let options = Options {
            budget: BudgetLimits { warn_at: 1, limit: 3 },
            ..Options::default()
        };
        let markup = r#"<meta name="citation_author" content="Ada Lovelace">"#;
        let result = classify(markup, Some(Namespace::Doi), None, &options);
        assert!(result.is_err_and(|e| e.is_client_error()));
    }
}
