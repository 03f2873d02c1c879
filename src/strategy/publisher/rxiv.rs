use crate::dom::{self, Page};
use crate::error::Result;
use crate::result::{AuthorAffiliation, ExtractionResult};
use crate::strategy::{helpers, Strategy};

/// bioRxiv and medRxiv preprints.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rxiv;

/// Tooltip indices may skip numbers; give up after this many misses.
const MAX_MISSING_TOOLTIPS: usize = 2;

impl Rxiv {
    fn tooltip_authors(page: &Page) -> Result<Vec<AuthorAffiliation>> {
        let mut authors = Vec::new();
        let mut missing = 0;
        let mut index = 0;

        loop {
            let Some(tooltip) = page.select_first(&format!("div.author-tooltip-{index}"))? else {
                if missing < MAX_MISSING_TOOLTIPS {
                    missing += 1;
                    index += 1;
                    continue;
                }
                break;
            };
            index += 1;

            let Some(name) = page.first_in(&tooltip, "div.author-tooltip-name")? else {
                continue;
            };
            let is_corresponding = tooltip.text().to_lowercase().contains("correspondence");

            let mut affiliations = Vec::new();
            for affiliation in page.select_in(&tooltip, "div.author-affiliation")?.iter() {
                let mut organization = dom::trimmed_text(&affiliation);
                if let Some(sup) = page.first_in(&affiliation, "span.nlm-sup")? {
                    let marker = sup.text();
                    if !marker.is_empty() {
                        organization = organization.replacen(&*marker, "", 1).trim().to_string();
                    }
                }
                affiliations.push(organization);
            }

            authors.push(AuthorAffiliation {
                name: dom::trimmed_text(&name),
                affiliations,
                is_corresponding: Some(is_corresponding),
            });
        }
        Ok(authors)
    }
}

impl Strategy for Rxiv {
    fn name(&self) -> &'static str {
        "RXIV (Cold Spring Harbor Laboratory)"
    }

    fn is_site_match(&self, page: &Page) -> Result<bool> {
        Ok(helpers::domain_in_meta_og_url(page, "medrxiv.org")?
            || helpers::domain_in_meta_og_url(page, "biorxiv.org")?)
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        Ok(page.exists("div.author-tooltip-0")? || page.exists(r#"meta[name="citation_author"]"#)?)
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let authors = Self::tooltip_authors(page)?;
        if authors.is_empty() {
            // A quarter of preprint pages only carry authors in metas.
            return Ok(ExtractionResult {
                authors: helpers::parse_author_meta_tags(page)?,
                abstract_text: helpers::parse_abstract_meta_tags(page)?,
            });
        }

        let abstract_text = page
            .select_first("div.section.abstract p")?
            .map(|p| dom::trimmed_text(&p));
        Ok(ExtractionResult { authors, abstract_text })
    }
}
