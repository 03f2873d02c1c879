use crate::authors::{self, Affiliation, AffiliationId, Author};
use crate::dom::{self, Page};
use crate::error::{Error, Result};
use crate::result::ExtractionResult;
use crate::strategy::{helpers, Strategy};

/// SPIE Digital Library.
///
/// Authors sit in a bold run with superscript ids; affiliations follow the
/// first line break, each introduced by its own superscript.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spie;

const NAME: &str = "spie";
const BLOCK: &str = r#"[id="affiliations"]"#;

fn trim_name(raw: &str) -> &str {
    raw.trim_matches(|c| c == ' ' || c == ',' || c == '\n' || c == '\t')
}

fn parse_authors(page: &Page) -> Result<Vec<Author>> {
    let Some(names) = page.select_first(&format!("{BLOCK} b"))? else {
        return Ok(Vec::new());
    };

    let mut authors = Vec::new();
    for sup in page.select_in(&names, "sup")?.iter() {
        let marker = sup.text();
        let name = sup
            .nodes()
            .first()
            .and_then(|node| node.prev_sibling())
            .map(|prev| trim_name(&prev.text()).to_string())
            .unwrap_or_default();

        let refs = marker
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| AffiliationId::Label(c.to_string()))
            .collect();
        let mut author = Author::new(name, refs);
        author.is_corresponding = Some(marker.contains('*'));
        authors.push(author);
    }
    Ok(authors)
}

fn parse_affiliations(page: &Page) -> Result<Vec<Affiliation>> {
    let Some(line_break) = page.select_first(&format!("{BLOCK} br"))? else {
        return Ok(Vec::new());
    };

    Ok(dom::following_element_siblings(&line_break)
        .into_iter()
        .filter(|node| node.node_name().is_some_and(|tag| tag.eq_ignore_ascii_case("sup")))
        .map(|sup| {
            let id = sup.text().trim().to_string();
            let organization = sup
                .next_sibling()
                .map(|next| next.text().trim().to_string())
                .unwrap_or_default();
            Affiliation::new(organization, Some(AffiliationId::Label(id)))
        })
        .collect())
}

impl Strategy for Spie {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_site_match(&self, page: &Page) -> Result<bool> {
        Ok(page
            .select_first("a.logo")?
            .and_then(|link| dom::attr(&link, "href"))
            .is_some_and(|href| href.contains("spie.org")))
    }

    fn authors_found(&self, page: &Page) -> Result<bool> {
        page.exists(BLOCK)
    }

    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let page = page.fork();
        if !page.exists(BLOCK)? {
            return Err(Error::strategy(NAME, "no affiliations block"));
        }
        page.strip(&format!(r#"{BLOCK} a[href*="orcid.org"]"#))?;

        let authors = parse_authors(&page)?;
        let affiliations = parse_affiliations(&page)?;

        Ok(ExtractionResult {
            authors: authors::reconcile(&authors, &affiliations),
            abstract_text: helpers::parse_abstract_meta_tags(&page)?,
        })
    }
}
