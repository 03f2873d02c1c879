use crate::dom::{self, Page};
use crate::error::{Error, Result};
use crate::result::{AuthorAffiliation, ExtractionResult};
use crate::strategy::{helpers, Strategy};

/// Brill (brill.com).
#[derive(Debug, Clone, Copy, Default)]
pub struct Brill;

const NAME: &str = "brill";

impl Strategy for Brill {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_site_match(&self, page: &Page) -> Result<bool> {
        helpers::domain_in_meta_og_url(page, "brill.com")
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        page.exists("div.contributor-line")
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let block = page
            .select_first("div.contributor-line")?
            .ok_or_else(|| Error::strategy(NAME, "no contributor line"))?;

        let mut authors = Vec::new();
        for contributor in page.select_in(&block, ".contributor-details")?.iter() {
            let Some(name) = page.first_in(&contributor, "span.contributor-details-link")? else {
                continue;
            };
            let affiliations = page
                .select_in(&contributor, "span.institution")?
                .iter()
                .map(|inst| inst.text().to_string())
                .collect();
            authors.push(AuthorAffiliation {
                name: name.text().to_string(),
                affiliations,
                is_corresponding: None,
            });
        }

        let abstract_text = match page.select_first("section.abstract")? {
            Some(section) => Some(
                page.select_in(&section, "p")?
                    .iter()
                    .map(|p| dom::trimmed_text(&p))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            None => None,
        };

        Ok(ExtractionResult { authors, abstract_text })
    }
}
