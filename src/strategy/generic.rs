//! Generic fallback strategy.
//!
//! Reads the Highwire/Dublin Core metadata most platforms emit, marks
//! corresponding authors from `mailto` blocks, and takes the abstract from
//! description metas or, failing that, the DOM.

use crate::dom::Page;
use crate::error::Result;
use crate::result::ExtractionResult;

use super::{helpers, Strategy};

const AUTHOR_METAS: &str = r#"meta[name="citation_author"], meta[property="citation_author"], meta[name="dc.Creator"], meta[property="dc.Creator"]"#;

/// Fallback used when no site-specific strategy qualifies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

impl Strategy for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn is_site_match(&self, _page: &Page) -> Result<bool> {
        Ok(false)
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        page.exists(AUTHOR_METAS)
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let mut authors = helpers::parse_author_meta_tags(page)?;
        helpers::fallback_mark_corresponding_authors(page, &mut authors)?;

        let abstract_text = match helpers::parse_abstract_meta_tags(page)? {
            Some(text) => Some(text),
            None => helpers::fallback_parse_abstract(page)?,
        };

        Ok(ExtractionResult { authors, abstract_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetLimits, CallBudget};

    #[test]
    fn citation_metas_without_institutions() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse(
            r#"<html><head>
               <meta name="citation_author" content="Grace Hopper">
               <meta name="citation_author" content="Alan Turing">
               </head><body></body></html>"#,
            &budget,
        );
        assert!(matches!(Generic.authors_found(&page), Ok(true)));
        let result = Generic.extract(&page).unwrap_or_default();
        let names: Vec<&str> = result.authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Grace Hopper", "Alan Turing"]);
        assert!(result.authors.iter().all(|a| a.affiliations.is_empty()));
        assert_eq!(result.abstract_text, None);
    }

    #[test]
    fn no_author_metas() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse("<p>About us</p>", &budget);
        assert!(matches!(Generic.authors_found(&page), Ok(false)));
    }
}
