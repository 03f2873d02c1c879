use crate::dom::{self, Page};
use crate::error::{Error, Result};
use crate::result::ExtractionResult;
use crate::strategy::{helpers, Strategy};

/// IOP Publishing (iopscience.iop.org).
///
/// Displayed affiliations are not in the served markup, so authors come from
/// citation metas.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iop;

const NAME: &str = "IOP";

const BOT_NOTICE: &str = "your activity and behavior on this site made us think that you are a bot";

impl Strategy for Iop {
    fn name(&self) -> &'static str {
        NAME
    }

    /// # Errors
    ///
    /// `UnusualTraffic` when the stored page is IOP's bot interstitial.
    fn is_site_match(&self, page: &Page) -> Result<bool> {
        let markup = page.markup();
        if markup.contains("iopscience.iop.org") && markup.contains(BOT_NOTICE) {
            return Err(Error::UnusualTraffic { strategy: NAME });
        }
        Ok(page
            .select_first(r#"link[rel~="stylesheet"]"#)?
            .and_then(|link| dom::attr(&link, "href"))
            .is_some_and(|href| href.contains("static.iopscience.com")))
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        page.exists(r#"meta[name="citation_author"]"#)
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let mut authors = helpers::parse_author_meta_tags(page)?;

        for email in page
            .select(r#"div[class*="art-email-addresses"] a[href*="mailto"]"#)?
            .iter()
        {
            let href = dom::attr(&email, "href").unwrap_or_default();
            for author in &mut authors {
                if helpers::email_matches_name(&href, &author.name) {
                    author.is_corresponding = Some(true);
                }
            }
        }

        Ok(ExtractionResult {
            authors,
            abstract_text: helpers::parse_abstract_meta_tags(page)?,
        })
    }
}
