//! License text classification.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::Page;
use crate::error::Result;
use crate::url_utils;

/// Hosts whose landing-page license text is known to be misleading.
const UNTRUSTED_LICENSE_HOSTS: &[&str] = &[
    "indianjournalofmarketing.com",
    "rnajournal.cshlp.org",
    "press.umich.edu",
    "genome.cshlp.org",
    "medlit.ru",
    "journals.eco-vector.com",
    "alife-robotics.co.jp",
    "un-pub.eu",
    "zniso.fcgie.ru",
    "molbiolcell.org",
    "jcog.com.tr",
    "aimsciences.org",
    "soed.in",
    "berghahnjournals.com",
    "ojs.ual.es",
    "cjc-online.ca",
];

/// First JCB volume published in 2018; later volumes carry delayed-access
/// wording that reads like a license.
const RUPRESS_FIRST_UNTRUSTED_VOLUME: u32 = 217;

#[allow(clippy::expect_used)]
static RUPRESS_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rupress\.org/jcb/[^/]+/(\d+)").expect("RUPRESS_VOLUME regex"));

/// Lookup table over normalized text. Order matters: most specific first.
const LICENSE_LOOKUPS: &[(&str, &str)] = &[
    ("koreanjpathol.org/authors/access.php", "cc-by-nc"),
    ("elsevier.com/openaccess/userlicense", "publisher-specific-oa"),
    ("pubs.acs.org/page/policy/authorchoice_termsofuse.html", "publisher-specific-oa"),
    ("open.canada.ca/en/opengovernmentlicencecanada", "other-oa"),
    ("creativecommons.org/licenses/byncnd", "cc-by-nc-nd"),
    ("creativecommonsattributionnoncommercialnoderiv", "cc-by-nc-nd"),
    ("ccbyncnd", "cc-by-nc-nd"),
    ("creativecommons.org/licenses/byncsa", "cc-by-nc-sa"),
    ("creativecommonsattributionnoncommercialsharealike", "cc-by-nc-sa"),
    ("ccbyncsa", "cc-by-nc-sa"),
    ("creativecommons.org/licenses/bynd", "cc-by-nd"),
    ("creativecommonsattributionnoderiv", "cc-by-nd"),
    ("ccbynd", "cc-by-nd"),
    ("creativecommons.org/licenses/bysa", "cc-by-sa"),
    ("creativecommonsattributionsharealike", "cc-by-sa"),
    ("ccbysa", "cc-by-sa"),
    ("creativecommons.org/licenses/bync", "cc-by-nc"),
    ("creativecommonsattributionnoncommercial", "cc-by-nc"),
    ("ccbync", "cc-by-nc"),
    ("creativecommons.org/licenses/by", "cc-by"),
    ("creativecommonsattribution", "cc-by"),
    ("ccby", "cc-by"),
    ("creativecommons.org/publicdomain/zero", "public-domain"),
    ("creativecommonszero", "public-domain"),
    ("creativecommons.org/publicdomain/mark", "public-domain"),
    ("publicdomain", "public-domain"),
    ("openaccess", "other-oa"),
    ("arxiv.orgperpetual", "publisher-specific-oa"),
    ("arxiv.orgnonexclusive", "publisher-specific-oa"),
];

/// Sections whose text mentions licenses that are not this article's.
const NOISY_LICENSE_SECTIONS: &str =
    r#"div[class*="view-pnas-featured"], meta[name*="citation_reference"]"#;

/// Whether license text on pages from this landing URL can be believed.
///
/// Unknown or missing URLs are trusted.
#[must_use]
pub fn trust_publisher_license(resolved_url: Option<&str>) -> bool {
    let Some(url) = resolved_url else {
        return true;
    };
    let Some(host) = url_utils::hostname(url) else {
        return true;
    };

    if UNTRUSTED_LICENSE_HOSTS.iter().any(|h| host.ends_with(h)) {
        return false;
    }

    if host.ends_with("rupress.org") {
        return RUPRESS_VOLUME
            .captures(url)
            .and_then(|c| c[1].parse::<u32>().ok())
            .is_some_and(|volume| volume < RUPRESS_FIRST_UNTRUSTED_VOLUME);
    }

    true
}

/// Map free text to a normalized license code.
///
/// Spaces and dashes are removed and the text lowercased before the lookup.
/// A public-domain match is void when the text says "works not in the public
/// domain".
#[must_use]
pub fn find_normalized_license(text: &str) -> Option<&'static str> {
    if text.is_empty() {
        return None;
    }
    let normalized = text.replace([' ', '-'], "").to_lowercase();

    let (_, license) = LICENSE_LOOKUPS
        .iter()
        .find(|(needle, _)| normalized.contains(needle))?;

    if *license == "public-domain" && normalized.contains("worksnotinthepublicdomain") {
        return None;
    }
    Some(*license)
}

/// Markup likely to hold this article's license statement.
///
/// Featured-content blocks and cited-reference metadata are removed first,
/// and the result is capped at `limit` bytes (on a char boundary).
pub fn license_excerpt(page: &Page, limit: usize) -> Result<String> {
    let copy = page.fork();
    let excerpt = if copy.strip(NOISY_LICENSE_SECTIONS)? > 0 {
        copy.html()
    } else {
        page.markup().to_string()
    };
    Ok(truncate_at_char_boundary(excerpt, limit))
}

fn truncate_at_char_boundary(mut text: String, limit: usize) -> String {
    if text.len() > limit {
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetLimits, CallBudget};

    #[test]
    fn most_specific_license_wins() {
        assert_eq!(
            find_normalized_license("Licensed CC BY. Figures are CC BY-NC-ND."),
            Some("cc-by-nc-nd")
        );
        assert_eq!(
            find_normalized_license("https://creativecommons.org/licenses/by/4.0/"),
            Some("cc-by")
        );
        assert_eq!(
            find_normalized_license("Creative Commons Attribution-NonCommercial 4.0"),
            Some("cc-by-nc")
        );
    }

    #[test]
    fn publisher_specific_urls() {
        assert_eq!(
            find_normalized_license("see http://www.elsevier.com/open-access/userlicense/1.0/"),
            Some("publisher-specific-oa")
        );
        assert_eq!(find_normalized_license("Open Access article"), Some("other-oa"));
    }

    #[test]
    fn public_domain_can_be_voided() {
        assert_eq!(find_normalized_license("This work is in the public domain"), Some("public-domain"));
        assert_eq!(
            find_normalized_license("Public domain works are marked; works not in the public domain are not"),
            None
        );
    }

    #[test]
    fn no_license_text() {
        assert_eq!(find_normalized_license(""), None);
        assert_eq!(find_normalized_license("All rights reserved"), None);
    }

    #[test]
    fn untrusted_hosts() {
        assert!(trust_publisher_license(None));
        assert!(trust_publisher_license(Some("https://www.example.org/article/1")));
        assert!(!trust_publisher_license(Some("https://www.berghahnjournals.com/view/x")));
        assert!(!trust_publisher_license(Some("https://genome.cshlp.org/content/1")));
    }

    #[test]
    fn rupress_trust_depends_on_volume() {
        assert!(trust_publisher_license(Some("https://rupress.org/jcb/article/216/1/1/x")));
        assert!(!trust_publisher_license(Some("https://rupress.org/jcb/article/217/1/1/x")));
        assert!(!trust_publisher_license(Some("https://rupress.org/jem/article/1")));
    }

    #[test]
    fn excerpt_drops_reference_metadata() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse(
            r#"<html><head>
               <meta name="citation_reference" content="Smith, CC BY-NC 4.0 handbook">
               </head><body><p>This article is licensed CC BY.</p></body></html>"#,
            &budget,
        );
        let excerpt = license_excerpt(&page, 100_000).unwrap_or_default();
        assert!(!excerpt.contains("handbook"));
        assert_eq!(find_normalized_license(&excerpt), Some("cc-by"));
    }

    #[test]
    fn excerpt_is_capped() {
        let budget = CallBudget::with_limits(BudgetLimits::default());
        let page = Page::parse("<p>ééééé</p>", &budget);
        let excerpt = license_excerpt(&page, 6).unwrap_or_default();
        assert_eq!(excerpt, "<p>é");
    }
}
