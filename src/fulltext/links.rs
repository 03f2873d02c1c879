//! Full-text link discovery.
//!
//! Candidates come from three places, in rank order: the `citation_pdf_url`
//! meta tag, a PDF URL embedded in a script payload, and anchors that survive
//! after noise sections (reference lists, tables of contents, related-content
//! widgets) are stripped. Each candidate is checked against deny-lists, then
//! accepted by the first rule that recognises it as a full-text link.

use std::sync::LazyLock;

use dom_query::{NodeRef, Selection};
use regex::Regex;
use tracing::{debug, trace};

use crate::dom::{self, Page};
use crate::error::Result;
use crate::text;

/// Anchor label given to the `citation_pdf_url` candidate.
pub const META_PDF_ANCHOR: &str = "<meta citation_pdf_url>";

/// Where a candidate link was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    MetaTag,
    Script,
    Anchor,
}

/// A link that might point at the full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub href: String,
    /// Anchor text, lowercased for text anchors, or a synthetic label.
    pub anchor: String,
    /// `title` attribute of the anchor element.
    pub title: Option<String>,
    /// `src` and `class` values of images inside the anchor.
    pub image_hints: Vec<String>,
    pub source: LinkSource,
}

impl CandidateLink {
    /// Candidate that did not come from an anchor element.
    #[must_use]
    pub fn synthetic(href: impl Into<String>, anchor: impl Into<String>, source: LinkSource) -> Self {
        Self {
            href: href.into(),
            anchor: anchor.into(),
            title: None,
            image_hints: Vec::new(),
            source,
        }
    }
}

/// Page-level facts the acceptance rules depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkContext<'a> {
    /// Landing page URL, empty when unknown.
    pub resolved_url: &'a str,
    /// University of Toronto Press page (prefers non-`epdf` links).
    pub utp_page: bool,
    /// Page carries a `wkhealth` meta tag ("full text" links are abstracts there).
    pub wkhealth_meta: bool,
}

impl<'a> LinkContext<'a> {
    /// Gather the context for `page`.
    pub fn from_page(page: &Page, resolved_url: Option<&'a str>) -> Result<Self> {
        let resolved_url = resolved_url.unwrap_or_default();
        let utp_page = resolved_url.contains("utpjournals.press")
            || page
                .meta_content("og:url")?
                .is_some_and(|url| url.contains("utpjournals.press"))
            || page
                .meta_content("citation_publisher")?
                .is_some_and(|p| p.contains("University of Toronto Press"));
        Ok(Self {
            resolved_url,
            utp_page,
            wkhealth_meta: page.exists(r#"meta[name*="wkhealth"]"#)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Noise sections
// ---------------------------------------------------------------------------

/// Sections whose links never point at this article's full text.
const NOISE_SECTIONS: &[&str] = &[
    r#"div[class="relatedItem"]"#,
    r#"ol[class="links-for-figure"]"#,
    r#"div[class="citedBySection"]"#,
    r#"div[class="references"]"#,
    r#"div[class="moduletable"]"#,
    r#"div[class*="ref-list"]"#,
    r#"div[class*="references"]"#,
    r#"div[id="supplementary-material"]"#,
    r#"div[id="toc"]"#,
    r#"div[class*="cta-guide-authors"]"#,
    r#"div[class*="footer-publication"]"#,
    "d-appendix",
    "dt-appendix",
    r#"div[id^="dt-cite"]"#,
    r#"ol[class*="ref-item"]"#,
    r#"div[class*="NLM_back"]"#,
    r#"div[class*="NLM_citation"]"#,
    r#"div[id="relatedcontent"]"#,
    r#"div[id="author-infos"]"#,
    r#"ul[id="book-metrics"]"#,
    r#"section[id="article_references"]"#,
    r#"section[id="SupplementaryMaterial"]"#,
    r#"div[id="attach_additional_files"]"#,
    r#"span[class*="fa-lock"]"#,
    r#"ul[id="reflist"]"#,
    r#"div[class="listbibl"]"#,
    r#"div[class*="summation-section"]"#,
    r#"ul[class*="references"]"#,
    r#"span[class*="ref-lnk"]"#,
    r#"div[id="referenceContainer"]"#,
    r#"div[class*="table-of-content"]"#,
    r#"img[src*="supplementary_material"] ~ p"#,
    r#"div[id="utpPrimaryNav"]"#,
    r#"p[class="bibentry"]"#,
    r#"a[class*="cover-out"]"#,
    r#"div[class="footnotes"]"#,
    r#"section[id="article-references"]"#,
    r#"div[class="refs"]"#,
    r#"div[class="citation-content"]"#,
    r#"li[class="refbiblio"]"#,
    r#"div[class="Citation"]"#,
    r#"section[id="ej-article-sam-container"]"#,
    r#"li[class*="article-references"]"#,
    r#"section[id="supplementary-materials"]"#,
    r#"article[id="ej-article-view"] div[class*="ejp-fulltext-content"] p[id*="JCL-P"]"#,
    r#"span[class*="ref-list"] span[class*="reference"]"#,
    r#"div[class*="ncbiinpagenav"]"#,
    r#"section[class*="references"]"#,
    r#"div[id="references-list"]"#,
    // chapter listings: can't tell which entry belongs to this DOI
    r#"div[id="booktoc"]"#,
    r#"div[id="tocWrapper"]"#,
    r#"tr[class="bookTocEntryRow"]"#,
];

enum Label {
    Exactly(&'static str),
    Containing(&'static str),
}

impl Label {
    fn matches(&self, text: &str) -> bool {
        match self {
            Self::Exactly(label) => text == *label,
            Self::Containing(label) => text.contains(label),
        }
    }
}

/// A labelled element whose following siblings are noise.
struct SiblingNoise {
    tag: &'static str,
    label: Label,
    sibling: &'static str,
    /// Only these descendants of the sibling are noise.
    inner: Option<&'static str>,
}

const SIBLING_NOISE: &[SiblingNoise] = &[
    SiblingNoise { tag: "p", label: Label::Exactly("References"), sibling: "p", inner: None },
    SiblingNoise { tag: "h2", label: Label::Exactly("References"), sibling: "ul", inner: None },
    SiblingNoise { tag: "h4", label: Label::Exactly("References"), sibling: "p", inner: None },
    SiblingNoise { tag: "td", label: Label::Exactly("References"), sibling: "td", inner: None },
    SiblingNoise {
        tag: "h4",
        label: Label::Containing("Multimedia Appendix"),
        sibling: "a",
        inner: None,
    },
    SiblingNoise { tag: "h3", label: Label::Exactly("Acknowledgements"), sibling: "p", inner: None },
    SiblingNoise {
        tag: "h2",
        label: Label::Exactly("Notes"),
        sibling: "ol",
        inner: Some(r#"p[class="alinea"]"#),
    },
    SiblingNoise {
        tag: "h2",
        label: Label::Exactly("Policies and information"),
        sibling: "ul",
        inner: None,
    },
];

/// Remove every noise section from `page`.
pub fn strip_noise_sections(page: &Page) -> Result<()> {
    page.strip(&NOISE_SECTIONS.join(", "))?;

    for rule in SIBLING_NOISE {
        for labelled in page.select(rule.tag)?.iter() {
            if !rule.label.matches(labelled.text().trim()) {
                continue;
            }
            for sibling in dom::following_element_siblings(&labelled) {
                if !sibling.node_name().is_some_and(|t| t.eq_ignore_ascii_case(rule.sibling)) {
                    continue;
                }
                let sibling = Selection::from(sibling);
                match rule.inner {
                    Some(css) => page.select_in(&sibling, css)?.remove(),
                    None => sibling.remove(),
                }
            }
        }
    }

    // supplemental material rows: span > td > tr
    for span in page.select("span")?.iter() {
        if !span.text().contains("Supplemental Material") {
            continue;
        }
        let cell = span.parent();
        let row = cell.parent();
        if dom::tag_name(&cell).as_deref() == Some("td") && dom::tag_name(&row).as_deref() == Some("tr") {
            row.remove();
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[allow(clippy::expect_used)]
static SCRIPT_PDF_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""pdfUrl":"(.*?)""#).expect("SCRIPT_PDF_URL regex"));

#[allow(clippy::expect_used)]
static SCRIPT_EXPORT_PDF_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""exportPdfDownloadUrl": ?"(.*?)""#).expect("SCRIPT_EXPORT_PDF_URL regex")
});

/// The `citation_pdf_url` meta tag, as a candidate.
pub fn meta_pdf_link(page: &Page) -> Result<Option<CandidateLink>> {
    Ok(page
        .meta_content("citation_pdf_url")?
        .map(|href| CandidateLink::synthetic(href, META_PDF_ANCHOR, LinkSource::MetaTag)))
}

/// A PDF URL embedded in a script payload.
#[must_use]
pub fn script_pdf_link(markup: &str) -> Option<CandidateLink> {
    [(&*SCRIPT_PDF_URL, "pdfUrl"), (&*SCRIPT_EXPORT_PDF_URL, "exportPdfDownloadUrl")]
        .into_iter()
        .find_map(|(re, label)| {
            re.captures(markup).map(|caps| {
                CandidateLink::synthetic(
                    text::decode_escaped_href(&caps[1]),
                    label,
                    LinkSource::Script,
                )
            })
        })
}

/// Anchors that could be full-text links, after noise sections are removed.
///
/// Works on a fork; `page` itself is left untouched.
pub fn anchor_links(page: &Page) -> Result<Vec<CandidateLink>> {
    let copy = page.fork();
    strip_noise_sections(&copy)?;

    let anchors = copy.select("a")?;
    Ok(anchors.iter().filter_map(|a| anchor_candidate(&a)).collect())
}

fn anchor_candidate(a: &Selection) -> Option<CandidateLink> {
    let href = dom::attr(a, "href");
    let text = a.text().trim().to_lowercase();

    let anchor = if !text.is_empty() {
        text
    } else if let Some(tooltip) =
        dom::attr(a, "data-tooltip").filter(|t| t.to_lowercase().contains("download pdf"))
    {
        tooltip
    } else if let Some(title) =
        dom::attr(a, "title").filter(|t| t.to_lowercase().contains("download fulltext"))
    {
        format!("title: {title}")
    } else if href
        .as_deref()
        .is_some_and(|h| h.to_lowercase().contains("?create_pdf_query"))
    {
        "pdf_generator".to_string()
    } else {
        let node = a.nodes().first()?;
        let children = dom::element_children(node);
        let [only_child] = children.as_slice() else {
            return None;
        };
        if !only_child.node_name().is_some_and(|t| t.eq_ignore_ascii_case("img")) {
            return None;
        }
        let src = only_child.attr("src").map(|s| s.to_string())?;
        if !src.contains("pdf") {
            return None;
        }
        format!("image: {src}")
    };

    Some(CandidateLink {
        href: href?,
        anchor,
        title: dom::attr(a, "title"),
        image_hints: a.nodes().first().map(image_hints).unwrap_or_default(),
        source: LinkSource::Anchor,
    })
}

fn image_hints(node: &NodeRef) -> Vec<String> {
    node.descendants()
        .into_iter()
        .filter(|d| d.node_name().is_some_and(|t| t.eq_ignore_ascii_case("img")))
        .flat_map(|img| {
            ["src", "class"]
                .into_iter()
                .filter_map(move |name| img.attr(name).map(|v| v.to_string()))
        })
        .collect()
}

/// All candidates in rank order: meta tag, script payload, anchors.
///
/// `page` should already have scripts removed; `script_markup` is the
/// original markup the script payload is searched in.
pub fn candidate_links(page: &Page, script_markup: &str) -> Result<Vec<CandidateLink>> {
    let mut links: Vec<CandidateLink> = meta_pdf_link(page)?.into_iter().collect();
    links.extend(script_pdf_link(script_markup));
    links.extend(anchor_links(page)?);
    Ok(links)
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

const BAD_HREF_WORDS: &[&str] = &[
    "/eab/",
    "/suppl_file/",
    "supplementary+file",
    "showsubscriptions",
    "/faq",
    "{{",
    "cdt-flyer",
    "figures",
    "price-lists",
    "aaltodoc_pdf_a.pdf",
    "janssenmd.com",
    "community-register",
    "quickreference",
    "libraryrequestform",
    "iporeport",
    "no_local_copy",
    ".zip",
    ".gz",
    ".tar.",
    "/doi/full/10.1642",
    "hyke.org",
    "&rendering=",
    ".fmatter",
    "/samples/",
    "letter_to_publisher",
    "first-page",
    "lib_rec_form",
    "ebook-flyer",
    "accesoRestringido",
    "/productFlyer/",
    "/author_agreement",
    "supinfo.pdf",
    "/Appendix",
    "BookTOC.pdf",
    "BookBackMatter.pdf",
    "publishers-catalogue",
    "_toc_",
    "adobe.com/products/acrobat",
    "featured-article-pdf",
    "modern-slavery-act-statement.pdf",
    "Deposit_Agreement",
    "/product_flyer/",
    "links.lww.com/JBJS/F791",
    "ctr_media_kit",
    "ctr_advertising_rates",
    "format=googlePreviewPdf",
    "type=googlepdf",
    "guide_authors",
    "_TOC.pdf",
    "_BookBackMatter.pdf",
    "_BookTOC.pdf",
    "-supplement.pdf",
    "ethicspolicy.pdf",
    "coi_disclosure.pdf",
    "_leaflet.pdf",
    "User-manual.pdf",
    "table_final.pdf",
    "/doi/full/10.18553/jmcp.",
    "Bilkent-research-paper.pdf",
    "guia_busquedas_avanzadas.pdf",
    "PDFs/2017-Legacy-1516816496183.pdf",
    "TermsOfUse.pdf",
    "javascript:void",
    "/DownloadSummary/",
    "WOS000382116900027.pdf",
    "content_policy.pdf",
];

/// Hrefs that look bad but are the article itself.
const GOOD_HREF_WORDS: &[&str] = &[
    "190317_MainText_Figures_JNNP.pdf",
    "Using%20Google%20Forms%20to%20Track%20Library%20Space%20Usage%20w%20figures.pdf",
];

#[allow(clippy::expect_used)]
static BAD_HREF_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)jmir_v[a-z0-9]+_app\d+\.pdf"]
        .into_iter()
        .map(|p| Regex::new(p).expect("bad href pattern"))
        .collect()
});

const BAD_ANCHOR_WORDS: &[&str] = &[
    "user",
    "guide",
    "checklist",
    "abstracts",
    "downloaded publications",
    "metadata from the pdf file",
    "récupérer les métadonnées à partir d'un fichier pdf",
    "bulk downloads",
    "license agreement",
    "masthead",
    "download statistics",
    "supplement",
    "figure",
    "faq",
    "download MODS",
    "BibTeX citations",
    "RIS citations",
    "ACS ActiveView PDF",
    "Submission Form",
    "Sample Pages",
    "Download this page",
    "Download left page",
    "Download right page",
    "author agreement",
    "map to our office",
    "download flyer",
    "download extract",
    "Call for Papers",
    "View PDF Flyer",
    "Full Text HTML",
    "Submitting an item to the Open Research repository",
    "Download our catalogue",
    "Reprint Order Form",
    "Cost Confirmation and Order Form",
];

/// (landing URL pattern, href pattern): links on that site matching the href
/// pattern are abstracts, unstable, or belong to another work.
const SITE_BAD_LINKS: &[(&str, &str)] = &[
    (r"^https?://repositorio\.uchile\.cl/handle", r"item_\d+\.pdf"),
    (r"^https?://dial\.uclouvain\.be", r"downloader\.php\?.*disclaimer="),
    (r"^https?://(?:www)?\.goodfellowpublishers\.com", r"(?i)free_files/"),
    (r"^https?://(?:www)?\.intellectbooks\.com", r"(?i)_nfc"),
    (r"^https?://philpapers\.org/rec/FISBAI", r"FISBAI\.pdf$"),
    (r"^https?://eresearch\.qmu\.ac\.uk/", r"appendix\.pdf"),
];

/// `citation_pdf_url` targets that redirect or serve the wrong file.
const BAD_META_PDF_HREFS: &[&str] = &[
    r"^https?://cora\.ucc\.ie/bitstream/",
    r"^https?://zefq-journal\.com/",
    r"^https?://www\.nowpublishers\.com/",
    r"^https://dsa\.fullsight\.org/api/v1/",
];

/// Sites whose `citation_pdf_url` is worse than a link in the page body.
const BAD_META_PDF_SITES: &[&str] = &[
    r"^https?://researchonline\.federation\.edu\.au/vital/access/manager/Repository/",
    r"^https?://www\.dora\.lib4ri\.ch/[^/]*/islandora/object/",
    r"^https?://ifs\.org\.uk/publications/",
    r"^https?://ogma\.newcastle\.edu\.au",
    r"^https?://cjon\.ons\.org",
    r"^https?://nowpublishers\.com",
    r"^https?://dspace\.library\.uu\.nl",
];

const BAD_HREF_EXACT: &str = "https://dsq-sds.org/article/download/298/345";

/// Hosts where hrefs legitimately contain newlines.
const NEWLINE_HREF_HOSTS: &[&str] = &["securityanddefence.pl"];

#[allow(clippy::expect_used)]
static SITE_BAD_LINK_RULES: LazyLock<Vec<(Regex, Regex)>> = LazyLock::new(|| {
    SITE_BAD_LINKS
        .iter()
        .map(|(site, href)| {
            (
                Regex::new(site).expect("site pattern"),
                Regex::new(href).expect("href pattern"),
            )
        })
        .collect()
});

#[allow(clippy::expect_used)]
fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("link pattern"))
        .collect()
}

static BAD_META_PDF_HREF_RULES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile_all(BAD_META_PDF_HREFS));

static BAD_META_PDF_SITE_RULES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile_all(BAD_META_PDF_SITES));

/// Href contains a deny-listed word and no allow-listed one.
#[must_use]
pub fn has_bad_href_word(href: &str) -> bool {
    let lowered = href.to_lowercase();
    if GOOD_HREF_WORDS.iter().any(|w| lowered.contains(&w.to_lowercase())) {
        return false;
    }
    BAD_HREF_WORDS.iter().any(|w| lowered.contains(&w.to_lowercase()))
        || BAD_HREF_PATTERNS.iter().any(|re| re.is_match(href))
}

/// Anchor text contains a deny-listed phrase.
#[must_use]
pub fn has_bad_anchor_word(anchor: &str) -> bool {
    let lowered = anchor.to_lowercase();
    BAD_ANCHOR_WORDS.iter().any(|w| lowered.contains(&w.to_lowercase()))
}

/// Known problematic links for specific landing sites.
#[must_use]
pub fn is_known_bad_link(resolved_url: &str, link: &CandidateLink) -> bool {
    if let Some((_, href_rule)) = SITE_BAD_LINK_RULES
        .iter()
        .find(|(site, _)| site.is_match(resolved_url))
    {
        return href_rule.is_match(&link.href);
    }

    if link.source == LinkSource::MetaTag
        && (BAD_META_PDF_HREF_RULES.iter().any(|re| re.is_match(&link.href))
            || BAD_META_PDF_SITE_RULES.iter().any(|re| re.is_match(resolved_url)))
    {
        return true;
    }

    link.href == BAD_HREF_EXACT
}

/// Why a candidate was rejected, or `None` if it may be considered.
#[must_use]
pub fn rejection(resolved_url: &str, link: &CandidateLink) -> Option<&'static str> {
    if is_known_bad_link(resolved_url, link) {
        Some("known bad link for site")
    } else if has_bad_anchor_word(&link.anchor) {
        Some("anchor deny-list")
    } else if has_bad_href_word(&link.href) {
        Some("href deny-list")
    } else if link.href.contains('\n') && !NEWLINE_HREF_HOSTS.iter().any(|h| link.href.contains(h)) {
        Some("newline in href")
    } else if link.href.starts_with('#') {
        Some("fragment link")
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

#[allow(clippy::expect_used)]
static OCLC_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(www\.)?oclc\.org").expect("OCLC_SITE regex"));

#[allow(clippy::expect_used)]
static RUDMET_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(www\.)?rudmet\.ru/journal/").expect("RUDMET_SITE regex"));

#[allow(clippy::expect_used)]
static RUDMET_PDF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?rudmet\.net/media/articles/.*\.pdf$").expect("RUDMET_PDF regex")
});

#[allow(clippy::expect_used)]
static UTRECHT_DSPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://dspace\.library\.uu\.nl/").expect("UTRECHT_DSPACE regex"));

#[allow(clippy::expect_used)]
static VERSION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:submitted|accepted|published) version(?:\s+\([0-9.,gmkb ]+\))?$")
        .expect("VERSION_LABEL regex")
});

/// Outcome of the acceptance rules for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept(&'static str),
    /// Skip this candidate outright.
    Skip,
    /// No rule fired; try the next candidate.
    Pass,
}

/// Run the acceptance rules, first rule that fires wins.
#[must_use]
pub fn verdict(link: &CandidateLink, ctx: &LinkContext) -> Verdict {
    let anchor = link.anchor.to_lowercase();
    let href = link.href.as_str();

    if anchor.contains("pdf") {
        if ctx.utp_page && href.contains("epdf") {
            return Verdict::Skip;
        }
        return Verdict::Accept("anchor mentions pdf");
    }

    if (link.anchor.contains("download") || link.anchor.contains("télécharger"))
        && !link.anchor.contains("citation")
    {
        return Verdict::Accept("download anchor");
    }

    if !ctx.wkhealth_meta && !ctx.utp_page {
        if anchor.contains("full text") {
            return Verdict::Accept("full text anchor");
        }
        if anchor.contains("текст статьи") {
            return Verdict::Accept("article text anchor");
        }
    }

    if OCLC_SITE.is_match(ctx.resolved_url)
        && href.ends_with(".pdf")
        && (anchor.contains("download") || anchor.contains("read"))
    {
        return Verdict::Accept("oclc pdf");
    }

    if ctx.resolved_url.contains("aida-itea.org") && href.contains("pdf") {
        return Verdict::Accept("aida-itea pdf");
    }

    if RUDMET_SITE.is_match(ctx.resolved_url) && RUDMET_PDF.is_match(href) {
        return Verdict::Accept("rudmet pdf");
    }

    if UTRECHT_DSPACE.is_match(ctx.resolved_url)
        && anchor.contains("open access version via utrecht university repository")
    {
        return Verdict::Accept("utrecht repository copy");
    }

    if link.image_hints.iter().any(|h| h.to_lowercase().contains("pdf")) {
        return Verdict::Accept("pdf image");
    }

    if link.title.as_deref().is_some_and(|t| t.to_lowercase().contains("pdf")) {
        return Verdict::Accept("title mentions pdf");
    }

    if href.contains("download/pdf") {
        return Verdict::Accept("download/pdf href");
    }

    let lowered_href = href.to_lowercase();
    if VERSION_LABEL.is_match(&anchor)
        && (lowered_href.ends_with(".pdf") || lowered_href.contains(".pdf?"))
    {
        return Verdict::Accept("version label");
    }

    Verdict::Pass
}

/// First acceptable candidate, after deny-lists.
#[must_use]
pub fn select_pdf_link(candidates: Vec<CandidateLink>, ctx: &LinkContext) -> Option<CandidateLink> {
    for link in candidates {
        if let Some(reason) = rejection(ctx.resolved_url, &link) {
            trace!(href = %link.href, anchor = %link.anchor, reason, "link rejected");
            continue;
        }
        match verdict(&link, ctx) {
            Verdict::Accept(rule) => {
                debug!(href = %link.href, anchor = %link.anchor, rule, "full-text link accepted");
                return Some(link);
            }
            Verdict::Skip | Verdict::Pass => {}
        }
    }
    None
}

/// Find the full-text PDF link on a script-free page.
pub fn find_pdf_link(page: &Page, script_markup: &str, ctx: &LinkContext) -> Result<Option<CandidateLink>> {
    Ok(select_pdf_link(candidate_links(page, script_markup)?, ctx))
}

/// A `.doc` download link, for repositories that deposit Word files.
pub fn find_doc_download_link(page: &Page) -> Result<Option<CandidateLink>> {
    Ok(anchor_links(page)?.into_iter().find(|link| {
        !has_bad_href_word(&link.href)
            && !has_bad_anchor_word(&link.anchor)
            && (link.href.contains(".doc") || link.anchor.contains(".doc"))
    }))
}

/// Biodiversity Heritage Library "view article" link.
pub fn find_bhl_view_link(page: &Page, resolved_url: &str) -> Result<Option<CandidateLink>> {
    if !crate::url_utils::host_ends_with(resolved_url, "biodiversitylibrary.org") {
        return Ok(None);
    }
    Ok(anchor_links(page)?
        .into_iter()
        .find(|link| link.anchor == "view article"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetLimits, CallBudget};

    fn anchor(href: &str, text: &str) -> CandidateLink {
        CandidateLink {
            href: href.to_string(),
            anchor: text.to_lowercase(),
            title: None,
            image_hints: Vec::new(),
            source: LinkSource::Anchor,
        }
    }

    fn ctx(url: &str) -> LinkContext<'_> {
        LinkContext {
            resolved_url: url,
            ..LinkContext::default()
        }
    }

    #[test]
    fn user_guide_anchor_is_always_rejected() {
        for href in ["/article.pdf", "https://example.org/download/pdf/1", "/x"] {
            let link = CandidateLink {
                anchor: "User Guide".to_string(),
                ..anchor(href, "")
            };
            assert!(rejection("https://example.org/a", &link).is_some());
        }
    }

    #[test]
    fn zip_href_is_always_rejected() {
        for text in ["Download PDF", "full text", "PDF (1 MB)"] {
            let link = anchor("https://example.org/files/article.zip", text);
            assert_eq!(rejection("https://example.org/a", &link), Some("href deny-list"));
        }
    }

    #[test]
    fn allow_list_overrides_deny_list() {
        assert!(!has_bad_href_word("https://zenodo.org/record/3831263/files/190317_MainText_Figures_JNNP.pdf"));
        assert!(has_bad_href_word("https://example.org/figures/1.pdf"));
        assert!(has_bad_href_word("https://digitalcommons.fairfield.edu/content_policy.pdf"));
        assert!(has_bad_href_word("https://www.jmir.org/2019/9/e15011/jmir_v21i9e15011_app1.pdf"));
    }

    #[test]
    fn fragment_and_newline_hrefs_are_rejected() {
        assert_eq!(rejection("", &anchor("#section-1", "pdf")), Some("fragment link"));
        assert_eq!(rejection("", &anchor("/a\n.pdf", "pdf")), Some("newline in href"));
        assert_eq!(
            rejection("", &anchor("https://securityanddefence.pl/a\n.pdf", "pdf")),
            None
        );
    }

    #[test]
    fn site_specific_bad_links() {
        let link = anchor("https://repositorio.uchile.cl/bitstream/item_1234.pdf", "pdf");
        assert!(is_known_bad_link("https://repositorio.uchile.cl/handle/2250/1", &link));

        let meta = CandidateLink::synthetic(
            "https://cora.ucc.ie/bitstream/10468/1/a.pdf",
            META_PDF_ANCHOR,
            LinkSource::MetaTag,
        );
        assert!(is_known_bad_link("https://cora.ucc.ie/handle/10468/3838", &meta));

        let uu = CandidateLink::synthetic("/bitstream/1.pdf", META_PDF_ANCHOR, LinkSource::MetaTag);
        assert!(is_known_bad_link("https://dspace.library.uu.nl/handle/1874/1", &uu));
        assert!(!is_known_bad_link("https://dspace.library.uu.nl/handle/1874/1", &anchor("/bitstream/1.pdf", "pdf")));
    }

    #[test]
    fn acceptance_order() {
        let c = ctx("https://journal.example.org/article/1");
        assert_eq!(verdict(&anchor("/a", "PDF (1 MB)"), &c), Verdict::Accept("anchor mentions pdf"));
        assert_eq!(verdict(&anchor("/a", "download"), &c), Verdict::Accept("download anchor"));
        assert_eq!(verdict(&anchor("/a", "download citation"), &c), Verdict::Pass);
        assert_eq!(verdict(&anchor("/a", "Full Text"), &c), Verdict::Accept("full text anchor"));
        assert_eq!(verdict(&anchor("/download/pdf/1", "get it"), &c), Verdict::Accept("download/pdf href"));
        assert_eq!(
            verdict(&anchor("/files/am.pdf", "Accepted version (1.2 MB)"), &c),
            Verdict::Accept("version label")
        );
        assert_eq!(verdict(&anchor("/about", "About us"), &c), Verdict::Pass);
    }

    #[test]
    fn wkhealth_pages_ignore_full_text_anchors() {
        let c = LinkContext {
            wkhealth_meta: true,
            ..ctx("https://journals.lww.com/x")
        };
        assert_eq!(verdict(&anchor("/a", "full text"), &c), Verdict::Pass);
    }

    #[test]
    fn utp_pages_skip_epdf() {
        let c = LinkContext {
            utp_page: true,
            ..ctx("https://utpjournals.press/doi/full/10.3138/tjt-2021-0016")
        };
        assert_eq!(verdict(&anchor("/doi/epdf/10.3138/x", "PDF"), &c), Verdict::Skip);
        assert_eq!(verdict(&anchor("/doi/pdf/10.3138/x", "PDF"), &c), Verdict::Accept("anchor mentions pdf"));
    }

    #[test]
    fn image_and_title_hints() {
        let c = ctx("https://example.org/a");
        let img = CandidateLink {
            image_hints: vec!["/icons/PDF-icon.png".into()],
            ..anchor("/get/1", "")
        };
        assert_eq!(verdict(&img, &c), Verdict::Accept("pdf image"));
        let titled = CandidateLink {
            title: Some("Open PDF".into()),
            ..anchor("/get/1", "open")
        };
        assert_eq!(verdict(&titled, &c), Verdict::Accept("title mentions pdf"));
    }

    #[test]
    fn anchors_inside_reference_lists_are_ignored() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse(
            r#"<div class="article-references"><div class="references">
                 <a href="/other.pdf">Other paper PDF</a></div></div>
               <h2>References</h2><ul><li><a href="/cited.pdf">cited pdf</a></li></ul>
               <a href="/this.pdf">Download PDF</a>"#,
            &budget,
        );
        let links = anchor_links(&page).unwrap_or_default();
        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/this.pdf"]);
    }

    #[test]
    fn anchor_labels_for_textless_links() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse(
            r#"<a href="/t" data-tooltip="Download PDF"></a>
               <a href="/f" title="Download fulltext"></a>
               <a href="/gen?create_pdf_query=1"></a>
               <a href="/i"><img src="/img/pdf.png"></a>
               <a href="/n"><img src="/img/logo.png"></a>"#,
            &budget,
        );
        let anchors: Vec<String> = anchor_links(&page)
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.anchor)
            .collect();
        assert_eq!(
            anchors,
            vec![
                "Download PDF".to_string(),
                "title: Download fulltext".to_string(),
                "pdf_generator".to_string(),
                "image: /img/pdf.png".to_string(),
            ]
        );
    }

    #[test]
    fn script_payload_links() {
        let link = script_pdf_link(r#"var x = {"pdfUrl":"\/doi\/pdf\/10.1\/x"};"#);
        assert_eq!(link.map(|l| l.href), Some("/doi/pdf/10.1/x".to_string()));
        let export = script_pdf_link(r#"{"exportPdfDownloadUrl": "/export/1.pdf"}"#);
        assert_eq!(export.map(|l| l.anchor), Some("exportPdfDownloadUrl".to_string()));
        assert!(script_pdf_link("<script>nothing</script>").is_none());
    }

    #[test]
    fn meta_candidate_ranks_first() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse(
            r#"<meta name="citation_pdf_url" content="https://example.org/meta.pdf">
               <a href="/body.pdf">PDF</a>"#,
            &budget,
        );
        let picked = find_pdf_link(&page, page.markup(), &ctx("https://example.org/a"))
            .ok()
            .flatten();
        assert_eq!(picked.map(|l| l.href), Some("https://example.org/meta.pdf".to_string()));
    }
}
