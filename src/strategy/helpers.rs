//! Building blocks shared by extraction strategies.

use std::sync::LazyLock;

use dom_query::NodeRef;
use regex::Regex;

use crate::dom::{self, Page};
use crate::error::Result;
use crate::result::AuthorAffiliation;
use crate::text;

/// Meta tags naming one author each, by `name` or `property`.
const AUTHOR_META_KEYS: &[&str] = &["citation_author", "dc.Creator"];

const AUTHOR_INSTITUTION_META: &str = "citation_author_institution";

/// Abstract metas, in preference order.
const ABSTRACT_META_KEYS: &[&str] = &["citation_abstract", "og:description", "dc.description", "description"];

/// Shortest meta description taken as a real abstract.
const MIN_META_ABSTRACT_CHARS: usize = 200;

/// Shortest block taken as an abstract by the DOM fallback.
const MIN_FALLBACK_ABSTRACT_CHARS: usize = 100;

const ABSTRACT_BLOCK_TAGS: &[&str] = &["p", "div", "span", "section", "article"];

const ABSTRACT_BLACKLIST: &[&str] = &[
    "download options",
    "please wait",
    "copyright clearance center",
    "procite",
    "food funct",
    "rsc publication",
];

const ABSTRACT_PREFIX_BLACKLIST: &[&str] = &["download"];

#[allow(clippy::expect_used)]
static ABSTRACT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^abstract[:.]?\s*").expect("ABSTRACT_LABEL regex"));

/// `og:url` meta content contains `domain`.
pub fn domain_in_meta_og_url(page: &Page, domain: &str) -> Result<bool> {
    Ok(page
        .meta_content("og:url")?
        .is_some_and(|url| url.contains(domain)))
}

/// `<link rel="canonical">` href contains `domain`.
pub fn domain_in_canonical_link(page: &Page, domain: &str) -> Result<bool> {
    Ok(page
        .select_first(r#"link[rel="canonical"]"#)?
        .and_then(|link| dom::attr(&link, "href"))
        .is_some_and(|href| href.contains(domain)))
}

fn meta_contains_ignore_case(page: &Page, key: &str, needle: &str) -> Result<bool> {
    Ok(page
        .meta_content(key)?
        .is_some_and(|content| content.to_lowercase().contains(&needle.to_lowercase())))
}

/// `citation_journal_title` contains `substr`, ignoring case.
pub fn substr_in_citation_journal_title(page: &Page, substr: &str) -> Result<bool> {
    meta_contains_ignore_case(page, "citation_journal_title", substr)
}

/// `citation_publisher` contains `substr`, ignoring case.
pub fn substr_in_citation_publisher(page: &Page, substr: &str) -> Result<bool> {
    meta_contains_ignore_case(page, "citation_publisher", substr)
}

/// `og:site_name` contains `text`.
pub fn text_in_meta_og_site_name(page: &Page, text: &str) -> Result<bool> {
    Ok(page
        .meta_content("og:site_name")?
        .is_some_and(|name| name.contains(text)))
}

fn is_author_meta(meta: &NodeRef) -> bool {
    ["name", "property"].into_iter().any(|attr| {
        meta.attr(attr)
            .is_some_and(|value| AUTHOR_META_KEYS.contains(&&*value))
    })
}

/// Authors from `citation_author` / `dc.Creator` metas.
///
/// Each `citation_author_institution` meta is attached to the author meta
/// that precedes it.
pub fn parse_author_meta_tags(page: &Page) -> Result<Vec<AuthorAffiliation>> {
    let mut authors: Vec<AuthorAffiliation> = Vec::new();
    let mut current: Option<AuthorAffiliation> = None;

    for meta in page.select("meta")?.nodes() {
        if is_author_meta(meta) {
            authors.extend(current.take());
            let name = meta.attr("content").map(|c| c.trim().to_string());
            current = name.filter(|n| !n.is_empty()).map(AuthorAffiliation::named);
        }
        if meta.attr("name").is_some_and(|n| &*n == AUTHOR_INSTITUTION_META) {
            let institution = meta.attr("content").map(|c| c.trim().to_string());
            if let (Some(author), Some(institution)) = (current.as_mut(), institution) {
                if !institution.is_empty() {
                    author.affiliations.push(institution);
                }
            }
        }
    }
    authors.extend(current);
    Ok(authors)
}

/// Authors from `citation_author` metas as repositories emit them (by `name`
/// only).
pub fn parse_repository_meta_tags(page: &Page) -> Result<Vec<AuthorAffiliation>> {
    let mut authors: Vec<AuthorAffiliation> = Vec::new();

    for meta in page.select("meta")?.nodes() {
        let Some(name) = meta.attr("name") else {
            continue;
        };
        let content = meta.attr("content").map(|c| c.trim().to_string()).unwrap_or_default();
        match &*name {
            "citation_author" => authors.push(AuthorAffiliation::named(content)),
            AUTHOR_INSTITUTION_META => {
                if let Some(author) = authors.last_mut() {
                    author.affiliations.push(content);
                }
            }
            _ => {}
        }
    }
    Ok(authors)
}

/// Abstract from description-like metas.
///
/// For each key (by `property`, then `name`, ignoring case) only the first
/// matching meta is considered. Short, truncated or URL-like descriptions are
/// skipped; a leading "Abstract:" label is removed.
pub fn parse_abstract_meta_tags(page: &Page) -> Result<Option<String>> {
    let metas = page.select("meta")?;
    let metas = metas.nodes();

    for key in ABSTRACT_META_KEYS {
        for attr in ["property", "name"] {
            let Some(meta) = metas
                .iter()
                .find(|m| m.attr(attr).is_some_and(|v| v.eq_ignore_ascii_case(key)))
            else {
                continue;
            };
            let description = meta.attr("content").map(|c| c.trim().to_string()).unwrap_or_default();
            if description.chars().count() > MIN_META_ABSTRACT_CHARS
                && !description.ends_with("...")
                && !description.ends_with('…')
                && !description.starts_with("http")
            {
                return Ok(Some(ABSTRACT_LABEL.replace(&description, "").into_owned()));
            }
        }
    }
    Ok(None)
}

fn attribute_mentions(node: &NodeRef, word: &str) -> bool {
    dom::attribute_values(node)
        .iter()
        .any(|value| value.to_lowercase().contains(word))
}

/// Abstract found by walking the DOM.
///
/// Looks inside elements with "abstract" in any attribute value, and inside
/// headings reading "Abstract", for the first long enough text block.
pub fn fallback_parse_abstract(page: &Page) -> Result<Option<String>> {
    for node in page.select("*")?.nodes() {
        let labelled = attribute_mentions(node, "abstract")
            || (dom::is_heading(node) && node.text().to_lowercase() == "abstract");
        if !labelled {
            continue;
        }

        for desc in node.descendants() {
            let is_block = desc
                .node_name()
                .is_some_and(|t| ABSTRACT_BLOCK_TAGS.contains(&t.to_ascii_lowercase().as_str()));
            if !is_block {
                continue;
            }
            let raw = desc.text();
            if raw.chars().count() <= MIN_FALLBACK_ABSTRACT_CHARS {
                continue;
            }
            let candidate = text::strip_prefix_ignore_case(&raw, "abstract").trim().to_string();
            let lowered = candidate.to_lowercase();
            if ABSTRACT_PREFIX_BLACKLIST.iter().any(|w| lowered.starts_with(w))
                || ABSTRACT_BLACKLIST.iter().any(|w| lowered.contains(w))
            {
                continue;
            }
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

fn has_mailto_link(node: &NodeRef) -> bool {
    node.descendants().into_iter().any(|d| {
        d.node_name().is_some_and(|t| t.eq_ignore_ascii_case("a"))
            && d.attr("href").is_some_and(|h| h.contains("mailto"))
    })
}

/// Mark authors named inside author blocks that carry a `mailto` link.
///
/// Only the innermost such blocks are used, so a list wrapping every author
/// does not mark them all.
pub fn fallback_mark_corresponding_authors(page: &Page, authors: &mut [AuthorAffiliation]) -> Result<()> {
    let blocks: Vec<_> = page
        .select("*")?
        .nodes()
        .iter()
        .filter(|node| attribute_mentions(node, "author") && has_mailto_link(node))
        .copied()
        .collect();

    for block in dom::innermost(blocks) {
        let markup = dom::Selection::from(block).html().to_string();
        for author in authors.iter_mut() {
            let named = markup.contains(&author.name)
                || (author.name.contains(',')
                    && author.name.split(',').all(|part| markup.contains(part.trim_matches(' '))));
            if named {
                author.is_corresponding = Some(true);
            }
        }
    }
    Ok(())
}

/// Numeric ids from a comma-separated superscript list such as `"1,3,*"`.
///
/// `ignore` characters are removed first; anything that is not all digits is
/// dropped.
#[must_use]
pub fn format_ids(ids: &str, ignore: &[char]) -> Vec<u32> {
    let mut cleaned = ids.trim().to_string();
    for c in ignore {
        cleaned = cleaned.replace(&format!(",{c}"), "").replace(*c, "");
    }
    cleaned
        .split(',')
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|id| id.parse().ok())
        .collect()
}

/// "Last, First" to "First Last".
#[must_use]
pub fn format_name(name: &str) -> String {
    name.rsplit(", ").collect::<Vec<_>>().join(" ")
}

/// Whether a `mailto:` address plausibly belongs to `name`.
///
/// The local part must contain the author's family name, or their given
/// name when it is not a bare initial.
#[must_use]
pub fn email_matches_name(email: &str, name: &str) -> bool {
    let address = text::strip_prefix_ignore_case(email.trim(), "mailto:");
    let local: String = address
        .split('@')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_lowercase();
    if local.is_empty() {
        return false;
    }

    let parts: Vec<String> = name
        .split(|c: char| c.is_whitespace() || c == ',' || c == '-')
        .map(|p| p.chars().filter(char::is_ascii_alphabetic).collect::<String>().to_lowercase())
        .filter(|p| p.len() > 1)
        .collect();
    parts.iter().any(|part| local.contains(part.as_str()))
}
