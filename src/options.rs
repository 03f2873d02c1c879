//! Configuration options for page classification.
//!
//! The `Options` struct carries the selector budget, what to do when no
//! strategy recognises a page, and a few output switches.

use crate::budget::BudgetLimits;
use crate::result::Namespace;

/// What [`crate::classify`] does when no strategy finds authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoStrategyPolicy {
    /// Return [`crate::Error::StrategyNotFound`].
    Fail,
    /// Carry on with an empty author list.
    EmptyAuthors,
}

/// Configuration options for page classification.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use landing_parse::{NoStrategyPolicy, Options};
///
/// // Use defaults
/// let options = Options::default();
///
/// // Tolerate unrecognised publisher pages
/// let options = Options {
///     doi_policy: NoStrategyPolicy::EmptyAuthors,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Selector call thresholds for one page.
    ///
    /// Default: warn at 500 calls, refuse above 2000.
    pub budget: BudgetLimits,

    /// Policy for publisher (`doi`) pages.
    ///
    /// Default: `NoStrategyPolicy::Fail`
    pub doi_policy: NoStrategyPolicy,

    /// Policy for repository (`pmh`) pages.
    ///
    /// Default: `NoStrategyPolicy::EmptyAuthors`
    pub pmh_policy: NoStrategyPolicy,

    /// Policy when no namespace is given.
    ///
    /// Default: `NoStrategyPolicy::EmptyAuthors`
    pub no_namespace_policy: NoStrategyPolicy,

    /// Longest page excerpt scanned for license text, in bytes.
    ///
    /// Default: `100_000`
    pub license_excerpt_limit: usize,

    /// Report the resolved landing URL as an `html` entry in `urls`.
    ///
    /// Default: `true`
    pub include_landing_url: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            budget: BudgetLimits::default(),
            doi_policy: NoStrategyPolicy::Fail,
            pmh_policy: NoStrategyPolicy::EmptyAuthors,
            no_namespace_policy: NoStrategyPolicy::EmptyAuthors,
            license_excerpt_limit: 100_000,
            include_landing_url: true,
        }
    }
}

impl Options {
    /// Policy that applies to `namespace`.
    #[must_use]
    pub fn policy_for(&self, namespace: Option<Namespace>) -> NoStrategyPolicy {
        match namespace {
            Some(Namespace::Doi) => self.doi_policy,
            Some(Namespace::Pmh) => self.pmh_policy,
            None => self.no_namespace_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policies_differ_by_namespace() {
        let options = Options::default();
        assert_eq!(options.policy_for(Some(Namespace::Doi)), NoStrategyPolicy::Fail);
        assert_eq!(options.policy_for(Some(Namespace::Pmh)), NoStrategyPolicy::EmptyAuthors);
        assert_eq!(options.policy_for(None), NoStrategyPolicy::EmptyAuthors);
    }

    #[test]
    fn default_budget() {
        let options = Options::default();
        assert_eq!(options.budget.warn_at, 500);
        assert_eq!(options.budget.limit, 2000);
        assert!(options.include_landing_url);
    }
}
