use dom_query::Selection;

use crate::dom::Page;
use crate::error::{Error, Result};
use crate::result::{AuthorAffiliation, ExtractionResult};
use crate::strategy::{helpers, Strategy};
use crate::text::strip_prefix_ignore_case;

/// Taylor & Francis Online.
#[derive(Debug, Clone, Copy, Default)]
pub struct Taylor;

const NAME: &str = "taylor";

/// Drop a leading footnote marker such as `a ` or `1 `.
fn strip_marker(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), Some(' ')) if c.is_ascii_lowercase() || c.is_ascii_digit() => &text[2..],
        _ => text,
    }
}

/// The overlay's leading text node, when it is not an ORCID link or URL.
fn overlay_affiliation(overlay: &Selection) -> Option<String> {
    let first = overlay.nodes().first()?.first_child()?;
    if !first.is_text() {
        return None;
    }
    let text = first.text();
    let text = text.trim();
    if text.is_empty() || text.starts_with("http") {
        return None;
    }
    Some(strip_marker(text).to_string())
}

impl Strategy for Taylor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_site_match(&self, page: &Page) -> Result<bool> {
        helpers::domain_in_meta_og_url(page, "tandfonline.com")
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        page.exists("div.publicationContentAuthors")
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let block = page
            .select_first("div.publicationContentAuthors")?
            .ok_or_else(|| Error::strategy(NAME, "no author block"))?;

        let mut authors = Vec::new();
        for entry in page.select_in(&block, "div.entryAuthor")?.iter() {
            let name = page
                .first_in(&entry, "a")?
                .ok_or_else(|| Error::strategy(NAME, "author entry without name link"))?;

            let is_corresponding = page
                .first_in(&entry, "span.heading")?
                .is_some_and(|heading| heading.text().to_lowercase() == "correspondence");

            let affiliations = page
                .first_in(&entry, "span.overlay")?
                .and_then(|overlay| overlay_affiliation(&overlay))
                .into_iter()
                .collect();

            authors.push(AuthorAffiliation {
                name: name.text().to_string(),
                affiliations,
                is_corresponding: Some(is_corresponding),
            });
        }

        let abstract_text = page
            .select_first("div.abstractInFull")?
            .map(|section| strip_prefix_ignore_case(section.text().trim(), "abstract").trim().to_string());

        Ok(ExtractionResult { authors, abstract_text })
    }
}
