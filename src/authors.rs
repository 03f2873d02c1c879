//! Merging author names with affiliation blocks.
//!
//! Pages either number affiliations with superscript ids and tag each author
//! with the ids that apply, or list one shared institution with no id at all.
//! [`reconcile`] handles both layouts without per-site special cases.

use std::fmt;

use crate::result::AuthorAffiliation;

/// Identifier tying an author to an affiliation block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AffiliationId {
    /// Numbered superscripts such as `1,3`.
    Index(u32),
    /// Symbolic markers such as `a` or `†`.
    Label(String),
}

impl fmt::Display for AffiliationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(n) => write!(f, "{n}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

impl From<u32> for AffiliationId {
    fn from(n: u32) -> Self {
        Self::Index(n)
    }
}

impl From<&str> for AffiliationId {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

/// Author as found on the page, before reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    /// Ordered affiliation references; empty when the page gives none.
    pub affiliation_refs: Vec<AffiliationId>,
    pub is_corresponding: Option<bool>,
}

impl Author {
    #[must_use]
    pub fn new(name: impl Into<String>, refs: Vec<AffiliationId>) -> Self {
        Self {
            name: name.into(),
            affiliation_refs: refs,
            is_corresponding: None,
        }
    }
}

/// Affiliation block; `id: None` means it applies to every author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affiliation {
    pub organization: String,
    pub id: Option<AffiliationId>,
}

impl Affiliation {
    #[must_use]
    pub fn new(organization: impl Into<String>, id: Option<AffiliationId>) -> Self {
        Self {
            organization: organization.into(),
            id,
        }
    }
}

/// Attribute affiliations to authors.
///
/// For each author, in order:
/// 1. every affiliation whose id appears in the author's references, walking
///    references in order and affiliations in source order;
/// 2. then every affiliation that either has no id while the author has no
///    references, or is the only affiliation on the page and nothing matched
///    in step 1.
///
/// No author is ever dropped and duplicates are kept.
#[must_use]
pub fn reconcile(authors: &[Author], affiliations: &[Affiliation]) -> Vec<AuthorAffiliation> {
    let lone = affiliations.len() == 1;

    authors
        .iter()
        .map(|author| {
            let mut orgs: Vec<String> = author
                .affiliation_refs
                .iter()
                .flat_map(|wanted| {
                    affiliations
                        .iter()
                        .filter(move |aff| aff.id.as_ref() == Some(wanted))
                        .map(|aff| aff.organization.clone())
                })
                .collect();

            let matched_by_id = !orgs.is_empty();
            for aff in affiliations {
                let shared = author.affiliation_refs.is_empty() && aff.id.is_none();
                if shared || (lone && !matched_by_id) {
                    orgs.push(aff.organization.clone());
                }
            }

            AuthorAffiliation {
                name: author.name.clone(),
                affiliations: orgs,
                is_corresponding: author.is_corresponding,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orgs(result: &[AuthorAffiliation]) -> Vec<Vec<&str>> {
        result
            .iter()
            .map(|a| a.affiliations.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn numbered_affiliations_follow_reference_order() {
        let authors = vec![
            Author::new("A", vec![2.into(), 1.into()]),
            Author::new("B", vec![1.into()]),
        ];
        let affs = vec![
            Affiliation::new("One", Some(1.into())),
            Affiliation::new("Two", Some(2.into())),
        ];
        assert_eq!(orgs(&reconcile(&authors, &affs)), vec![vec!["Two", "One"], vec!["One"]]);
    }

    #[test]
    fn lone_unnumbered_affiliation_goes_to_single_author() {
        let authors = vec![Author::new("A", vec![])];
        let affs = vec![Affiliation::new("Shared", None)];
        assert_eq!(orgs(&reconcile(&authors, &affs)), vec![vec!["Shared"]]);
    }

    #[test]
    fn lone_unnumbered_affiliation_is_shared_by_all_authors() {
        let authors = vec![Author::new("A", vec![]), Author::new("B", vec![])];
        let affs = vec![Affiliation::new("Shared", None)];
        assert_eq!(
            orgs(&reconcile(&authors, &affs)),
            vec![vec!["Shared"], vec!["Shared"]]
        );
    }

    #[test]
    fn lone_affiliation_rescues_unmatched_reference() {
        let authors = vec![Author::new("A", vec!["b".into()])];
        let affs = vec![Affiliation::new("Only", Some("a".into()))];
        assert_eq!(orgs(&reconcile(&authors, &affs)), vec![vec!["Only"]]);
    }

    #[test]
    fn unmatched_references_keep_the_author() {
        let authors = vec![
            Author::new("A", vec![9.into()]),
            Author::new("B", vec![1.into()]),
        ];
        let affs = vec![
            Affiliation::new("One", Some(1.into())),
            Affiliation::new("Two", Some(2.into())),
        ];
        let result = reconcile(&authors, &affs);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "A");
        assert!(result[0].affiliations.is_empty());
    }

    #[test]
    fn unnumbered_affiliations_skip_authors_with_references() {
        let authors = vec![
            Author::new("A", vec![1.into()]),
            Author::new("B", vec![]),
        ];
        let affs = vec![
            Affiliation::new("One", Some(1.into())),
            Affiliation::new("Everyone", None),
        ];
        assert_eq!(
            orgs(&reconcile(&authors, &affs)),
            vec![vec!["One"], vec!["Everyone"]]
        );
    }

    #[test]
    fn duplicates_from_source_are_preserved() {
        let authors = vec![Author::new("A", vec![1.into(), 1.into()])];
        let affs = vec![
            Affiliation::new("One", Some(1.into())),
            Affiliation::new("Other", Some(2.into())),
        ];
        assert_eq!(orgs(&reconcile(&authors, &affs)), vec![vec!["One", "One"]]);
    }

    #[test]
    fn reconciling_twice_is_stable() {
        let mut author = Author::new("A", vec!["*".into(), "1".into()]);
        author.is_corresponding = Some(true);
        let authors = vec![author, Author::new("B", vec![])];
        let affs = vec![
            Affiliation::new("One", Some("1".into())),
            Affiliation::new("Shared", None),
        ];
        let first = reconcile(&authors, &affs);
        let second = reconcile(&authors, &affs);
        assert_eq!(first, second);
        assert_eq!(first[0].is_corresponding, Some(true));
    }

    #[test]
    fn ids_compare_by_kind() {
        assert_ne!(AffiliationId::from(1), AffiliationId::from("1"));
        assert_eq!(AffiliationId::from(3).to_string(), "3");
    }
}
