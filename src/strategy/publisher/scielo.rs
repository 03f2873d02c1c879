use dom_query::NodeRef;

use crate::dom::{self, Page};
use crate::error::{Error, Result};
use crate::result::{AuthorAffiliation, ExtractionResult};
use crate::strategy::Strategy;
use crate::text::collapse_whitespace;

/// SciELO Preprints.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScieloPreprints;

const NAME: &str = "SciELO preprints";

fn is_affiliation_span(node: &NodeRef) -> bool {
    node.node_name().is_some_and(|tag| tag.eq_ignore_ascii_case("span"))
        && node
            .attr("class")
            .is_some_and(|class| class.split_whitespace().any(|c| c == "affiliation"))
}

impl Strategy for ScieloPreprints {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_site_match(&self, page: &Page) -> Result<bool> {
        Ok(page
            .select(r#"link[rel~="stylesheet"]"#)?
            .iter()
            .filter_map(|link| dom::attr(&link, "href"))
            .any(|href| href.contains("preprints.scielo.org/")))
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        page.exists("ul.authors")
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let list = page
            .select_first("ul.authors")?
            .ok_or_else(|| Error::strategy(NAME, "no author list"))?;

        let mut authors = Vec::new();
        for item in page.select_in(&list, "li")?.iter() {
            let Some(name_span) = page.first_in(&item, "span.name")? else {
                continue;
            };
            let name = collapse_whitespace(&name_span.text());
            if name.is_empty() {
                continue;
            }
            let affiliations = dom::following_element_siblings(&name_span)
                .into_iter()
                .filter(is_affiliation_span)
                .map(|span| collapse_whitespace(&span.text()))
                .filter(|text| !text.is_empty())
                .collect();
            authors.push(AuthorAffiliation {
                name,
                affiliations,
                is_corresponding: None,
            });
        }

        Ok(ExtractionResult {
            authors,
            abstract_text: None,
        })
    }
}
