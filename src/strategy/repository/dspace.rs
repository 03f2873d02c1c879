use crate::dom::Page;
use crate::error::Result;
use crate::result::ExtractionResult;
use crate::strategy::{helpers, Strategy};

/// DSpace item pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DSpace;

impl Strategy for DSpace {
    fn name(&self) -> &'static str {
        "dspace"
    }

    fn is_site_match(&self, page: &Page) -> Result<bool> {
        Ok(page
            .meta_content("generator")?
            .is_some_and(|generator| generator.trim_start().starts_with("DSpace")))
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        page.exists(r#"meta[name="citation_author"]"#)
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let abstract_text = match helpers::parse_abstract_meta_tags(page)? {
            Some(text) => Some(text),
            None => page.meta_content("DCTERMS.abstract")?.map(|text| text.trim().to_string()),
        };
        Ok(ExtractionResult {
            authors: helpers::parse_repository_meta_tags(page)?,
            abstract_text,
        })
    }
}
