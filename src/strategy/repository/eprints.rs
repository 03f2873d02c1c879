use crate::dom::{self, Page};
use crate::error::Result;
use crate::result::{AuthorAffiliation, ExtractionResult};
use crate::strategy::{helpers, Strategy};

/// EPrints archives.
///
/// Newer installs emit Highwire `citation_*` metas; older ones only the
/// `eprints.*` set, where creator names are "Family, Given".
#[derive(Debug, Clone, Copy, Default)]
pub struct EPrints;

const CREATOR_METAS: &str = r#"meta[name="eprints.creators_name"]"#;

impl Strategy for EPrints {
    fn name(&self) -> &'static str {
        "eprints"
    }

    fn is_site_match(&self, page: &Page) -> Result<bool> {
        if page
            .meta_content("generator")?
            .is_some_and(|generator| generator.contains("EPrints"))
        {
            return Ok(true);
        }
        page.exists(r#"meta[name^="eprints."]"#)
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        Ok(page.exists(r#"meta[name="citation_author"]"#)? || page.exists(CREATOR_METAS)?)
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let mut authors = helpers::parse_repository_meta_tags(page)?;
        if authors.is_empty() {
            authors = page
                .select(CREATOR_METAS)?
                .iter()
                .filter_map(|meta| dom::attr(&meta, "content"))
                .map(|name| helpers::format_name(name.trim()))
                .filter(|name| !name.is_empty())
                .map(AuthorAffiliation::named)
                .collect();
        }

        let abstract_text = match page.meta_content("eprints.abstract")? {
            Some(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => helpers::parse_abstract_meta_tags(page)?,
        };

        Ok(ExtractionResult { authors, abstract_text })
    }
}
