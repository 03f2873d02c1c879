//! Full-text location, license and version resolution.
//!
//! [`resolve_publisher`] handles publisher landing pages (DOI namespace),
//! [`resolve_repository`] handles repository pages (PMH namespace). Both run
//! a single linear decision chain; the page itself is never mutated.

pub mod access;
pub mod license;
pub mod links;
pub mod rewrite;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dom::Page;
use crate::error::Result;
use crate::result::{FulltextLocation, OaStatus, Version};
use crate::text::normalized_strings_equal;
use crate::url_utils::{self, link_target};

use links::{CandidateLink, LinkContext, LinkSource};

/// Removed before link discovery on every publisher page.
const PUBLISHER_CLEANUP: &str = r#"script, div[class="table-of-content"], li[class="linked-article__item"]"#;

/// Extra cleanup keyed by publisher name.
const PUBLISHER_SPECIFIC_CLEANUP: &[(&str, &str)] = &[
    ("Wiley", r#"div[class="hubpage-menu"]"#),
    ("Oncology Nursing Society (ONS)", r#"div[class="view-issue-articles"]"#),
];

const PUBLISHER_META_KEYS: &[&str] = &["citation_publisher", "dc.publisher", "DC.publisher"];

#[allow(clippy::expect_used)]
static IEEE_PDF_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""pdfPath":\s*"(/ielx?7/[\d/]*\.pdf)""#).expect("IEEE_PDF_PATH regex")
});

#[allow(clippy::expect_used)]
static CITESEERX_DOWNLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h3>Download Links</h3>.*?href="(.*?)""#).expect("CITESEERX_DOWNLOAD regex")
});

#[allow(clippy::expect_used)]
static CONTENTDM_IR_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://cdm21054\.contentdm\.oclc\.org/digital/collection/IR/id/(\d+)")
        .expect("CONTENTDM_IR_ITEM regex")
});

/// Hosts that serve preprints as a PDF and a word-processor copy at one link.
const DOC_HOSTS: &[&str] = &["paleorxiv.org", "osf.io"];

/// Landing pages that list many papers; no link on them is this article's.
const MULTI_PAPER_PAGES: &[&str] =
    &["https://www.swarthmore.edu/donna-jo-napoli/publications-available-download"];

/// Publisher name declared in the page metadata.
pub fn publisher_name(page: &Page) -> Result<Option<String>> {
    for key in PUBLISHER_META_KEYS {
        if let Some(name) = page.meta_content(key)?.filter(|n| !n.trim().is_empty()) {
            return Ok(Some(name.trim().to_string()));
        }
    }
    Ok(None)
}

/// Markup and trust-gated license code shared by both resolution paths.
fn page_license(page: &Page, resolved_url: Option<&str>, excerpt_limit: usize) -> Result<(String, Option<String>)> {
    let excerpt = license::license_excerpt(page, excerpt_limit)?;
    let found = if license::trust_publisher_license(resolved_url) {
        license::find_normalized_license(&excerpt).map(str::to_string)
    } else {
        None
    };
    Ok((excerpt, found))
}

/// License classification alone, for pages with no namespace context.
pub fn classify_license(page: &Page, resolved_url: Option<&str>, excerpt_limit: usize) -> Result<Option<String>> {
    Ok(page_license(page, resolved_url, excerpt_limit)?.1)
}

/// OJS issue table of contents: many articles, none of them ours.
pub fn is_ojs_index(page: &Page) -> Result<bool> {
    let is_ojs = page
        .meta_content("generator")?
        .is_some_and(|g| g.starts_with("Open Journal Systems"));
    if !is_ojs {
        return Ok(false);
    }
    Ok(page.select(r#"div[role="main"] li a[id^="article-"]"#)?.length() > 1)
}

fn cleanup_publisher_page(page: &Page, publisher: Option<&str>) -> Result<()> {
    page.strip(PUBLISHER_CLEANUP)?;
    let publisher = publisher.unwrap_or_default();
    for (name, css) in PUBLISHER_SPECIFIC_CLEANUP {
        if normalized_strings_equal(name, publisher) {
            page.strip(css)?;
        }
    }
    Ok(())
}

/// Resolve the full-text location on a publisher landing page.
///
/// Returns `None` for OJS issue indexes, which list other articles.
pub fn resolve_publisher(
    page: &Page,
    resolved_url: Option<&str>,
    excerpt_limit: usize,
) -> Result<Option<FulltextLocation>> {
    let landing = resolved_url.unwrap_or_default();
    let host = url_utils::hostname(landing).unwrap_or_default();
    let publisher = publisher_name(page)?;
    let (excerpt, mut license) = page_license(page, resolved_url, excerpt_limit)?;
    let mut version = Version::PublishedVersion;
    let mut source_string = None;
    let mut oa_status = None;

    let copy = page.fork();
    cleanup_publisher_page(&copy, publisher.as_deref())?;

    if is_ojs_index(&copy)? {
        debug!(url = landing, "OJS issue index, no full-text location");
        return Ok(None);
    }

    let ctx = LinkContext::from_page(page, resolved_url)?;
    let mut pdf_link = links::find_pdf_link(&copy, page.markup(), &ctx)?;

    if pdf_link.is_none() {
        if host.ends_with("ieeexplore.ieee.org") {
            pdf_link = IEEE_PDF_PATH.captures(page.markup()).map(|caps| {
                CandidateLink::synthetic(caps[1].replace("iel7", "ielx7"), "download", LinkSource::Script)
            });
        } else if host.ends_with("osf.io") || host.ends_with("psyarxiv.com") {
            pdf_link = Some(CandidateLink::synthetic(
                link_target("download", resolved_url),
                "download",
                LinkSource::Anchor,
            ));
        } else if let Some(note) = access::detect_sd_author_manuscript(page)? {
            source_string = Some(note.to_string());
            version = Version::AcceptedVersion;
            pdf_link = Some(CandidateLink::synthetic(
                landing.replace("/article/pii/", "/article/am/pii/"),
                "download",
                LinkSource::Anchor,
            ));
        }
    }

    let url = pdf_link.map(|link| {
        let absolute = link_target(&link.href, resolved_url);
        rewrite::finalize_pdf_url(&absolute, page.markup())
    });

    let citation_pdf_url = page.meta_content("citation_pdf_url")?;
    if let Some(note) = access::detect_bronze(
        page.markup(),
        publisher.as_deref(),
        landing,
        citation_pdf_url.as_deref(),
    ) {
        source_string = Some(note.to_string());
        oa_status = Some(OaStatus::Bronze);
    }

    if let Some(hybrid) = access::detect_hybrid(page.markup(), &excerpt, publisher.as_deref(), landing) {
        source_string = Some(hybrid.open_version_source_string.to_string());
        license = Some(hybrid.license);
        oa_status = Some(OaStatus::Hybrid);
    }

    debug!(
        url = landing,
        pdf = url.as_deref().unwrap_or(""),
        license = license.as_deref().unwrap_or(""),
        "publisher full-text resolved"
    );

    Ok(Some(FulltextLocation {
        url,
        version: Some(version),
        license,
        oa_status,
        open_version_source_string: source_string,
    }))
}

/// Explicit version statements some repositories print on the page.
#[must_use]
pub fn find_version(resolved_url: &str, markup: &str) -> Option<Version> {
    let host = url_utils::hostname(resolved_url)?;
    if host.ends_with("serval.unil.ch") {
        if markup.contains("Version: Final published version") {
            return Some(Version::PublishedVersion);
        }
        if markup.contains("Version: Author's accepted manuscript") {
            return Some(Version::AcceptedVersion);
        }
    }
    if host.ends_with("repository.lboro.ac.uk") && markup.contains("AM (Accepted Manuscript)") {
        return Some(Version::AcceptedVersion);
    }
    None
}

/// Working but unusable PDF URLs.
#[must_use]
pub fn discard_pdf_url(pdf_url: &str, landing_url: &str) -> bool {
    let expiring = url_utils::host_ends_with(pdf_url, "exlibrisgroup.com")
        && url_utils::query(pdf_url).is_some_and(|q| q.contains("Expires="));
    expiring || MULTI_PAPER_PAGES.contains(&landing_url)
}

/// Hosts where the PDF link doubles as the document download.
#[must_use]
pub fn try_pdf_link_as_doc(resolved_url: &str) -> bool {
    url_utils::hostname(resolved_url).is_some_and(|host| DOC_HOSTS.iter().any(|h| host.ends_with(h)))
}

fn repository_pdf_link(copy: &Page, page: &Page, landing: &str, ctx: &LinkContext) -> Result<Option<CandidateLink>> {
    let cleaned = copy.html();

    // CiteSeerX: prefer the third-party copy over the cached one
    if landing.contains("citeseerx.ist.psu.edu/") {
        return Ok(CITESEERX_DOWNLOAD
            .captures(&cleaned)
            .map(|caps| CandidateLink::synthetic(&caps[1], "download", LinkSource::Anchor)));
    }

    // OSF pages never carry the link; it is derived from the landing URL
    if cleaned.contains("osf-cookie") {
        let href = format!("{landing}/download");
        let href = match href.strip_suffix("//download") {
            Some(stem) => format!("{stem}/download"),
            None => href,
        };
        return Ok(Some(CandidateLink::synthetic(href, "download", LinkSource::Anchor)));
    }

    let found = links::find_pdf_link(copy, page.markup(), ctx)?;
    if found.is_some() {
        return Ok(found);
    }

    Ok(CONTENTDM_IR_ITEM.captures(landing).map(|caps| {
        CandidateLink::synthetic(
            format!("/digital/api/collection/IR/id/{}/download", &caps[1]),
            "download",
            LinkSource::Anchor,
        )
    }))
}

/// Resolve full-text locations on a repository page, best first.
///
/// Besides the PDF, a word-processor copy and a Biodiversity Heritage Library
/// reader link are reported when present.
pub fn resolve_repository(
    page: &Page,
    resolved_url: Option<&str>,
    excerpt_limit: usize,
) -> Result<Vec<FulltextLocation>> {
    let landing = resolved_url.unwrap_or_default();
    let (_, license) = page_license(page, resolved_url, excerpt_limit)?;
    let mut version = find_version(landing, page.markup());

    let copy = page.fork();
    copy.strip("script")?;

    let ctx = LinkContext::from_page(page, resolved_url)?;
    let pdf_link = repository_pdf_link(&copy, page, landing, &ctx)?;

    let location = |url: String, version: Option<Version>| FulltextLocation {
        url: Some(url),
        version,
        license: license.clone(),
        oa_status: None,
        open_version_source_string: None,
    };

    let mut locations = Vec::new();

    if let Some(link) = &pdf_link {
        if link.anchor.to_lowercase().contains("accepted version") {
            version = Some(Version::AcceptedVersion);
        }
        let mut pdf_url = link_target(&link.href, resolved_url);
        if link.source == LinkSource::MetaTag {
            pdf_url = rewrite::finalize_pdf_url(&pdf_url, page.markup());
        }
        if discard_pdf_url(&pdf_url, landing) {
            debug!(url = landing, pdf = %pdf_url, "discarding unstable repository pdf url");
        } else {
            locations.push(location(pdf_url, version));
        }
    }

    let doc_link = match links::find_doc_download_link(&copy)? {
        Some(link) => Some(link),
        None if try_pdf_link_as_doc(landing) => pdf_link,
        None => None,
    };
    if let Some(link) = doc_link {
        locations.push(location(link_target(&link.href, resolved_url), version));
    }

    if let Some(link) = links::find_bhl_view_link(&copy, landing)? {
        locations.push(location(link.href, version));
    }

    Ok(locations)
}
