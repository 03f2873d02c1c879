//! Extraction strategies and the selector that picks one per document.
//!
//! A strategy targets one publisher or repository family. Selection works in
//! tiers: strategies that recognise both the site and its author markup
//! (tier A) are tried before strategies that only recognise author markup
//! (tier B), and the generic strategy is the last resort. A strategy that
//! errors is skipped; it never stops the others from being tried.

pub mod generic;
pub mod helpers;
pub mod publisher;
pub mod repository;

use tracing::{debug, warn};

use crate::dom::Page;
use crate::error::{Error, Result};
use crate::result::{ExtractionResult, Namespace};

/// One self-contained extraction rule set.
pub trait Strategy: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// The page comes from the site this strategy was written for.
    fn is_site_match(&self, page: &Page) -> Result<bool>;

    /// The page carries author markup this strategy can read.
    fn authors_found(&self, page: &Page) -> Result<bool>;

    /// Pull authors and abstract out of the page.
    fn extract(&self, page: &Page) -> Result<ExtractionResult>;
}

/// Priority bucket a strategy was selected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Site confirmed and authors found.
    A,
    /// Authors found only.
    B,
    Generic,
}

/// Result of trying one strategy.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// Non-empty author list with at least one affiliation.
    Accepted(ExtractionResult),
    /// Ran, but nothing affiliation-bearing came out.
    NoAffiliations(ExtractionResult),
    /// The strategy failed; the error is kept for logging only.
    Errored(Error),
}

/// The strategy whose result was accepted.
#[derive(Debug)]
pub struct Selected {
    pub strategy: &'static str,
    pub tier: Tier,
    pub result: ExtractionResult,
}

/// Run one strategy, isolating its failures.
///
/// Document-level errors (budget exhaustion, bot interstitials) are not
/// isolated: they describe the page, not the strategy, and are returned.
pub fn attempt(strategy: &dyn Strategy, page: &Page) -> Result<StrategyOutcome> {
    match strategy.extract(page) {
        Ok(result) if !result.authors.is_empty() && result.has_affiliations() => {
            Ok(StrategyOutcome::Accepted(result))
        }
        Ok(result) => Ok(StrategyOutcome::NoAffiliations(result)),
        Err(err) if err.is_document_level() => Err(err),
        Err(err) => Ok(StrategyOutcome::Errored(err)),
    }
}

/// Evaluate a capability check, treating strategy-local failures as `false`.
fn check(strategy: &dyn Strategy, what: &str, outcome: Result<bool>) -> Result<bool> {
    match outcome {
        Ok(found) => Ok(found),
        Err(err) if err.is_document_level() => Err(err),
        Err(err) => {
            warn!(strategy = strategy.name(), check = what, error = %err, "strategy check failed");
            Ok(false)
        }
    }
}

/// Ordered strategies for one namespace plus the generic fallback.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
    generic: Box<dyn Strategy>,
}

impl StrategyRegistry {
    /// Registry with an explicit strategy order.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn Strategy>>, generic: Box<dyn Strategy>) -> Self {
        Self { strategies, generic }
    }

    /// Publisher catalogue.
    #[must_use]
    pub fn publisher() -> Self {
        Self::new(publisher::strategies(), Box::new(generic::Generic))
    }

    /// Repository catalogue.
    #[must_use]
    pub fn repository() -> Self {
        Self::new(repository::strategies(), Box::new(generic::Generic))
    }

    /// Catalogue for a namespace; single-document mode uses the publisher set.
    #[must_use]
    pub fn for_namespace(namespace: Option<Namespace>) -> Self {
        match namespace {
            Some(Namespace::Pmh) => Self::repository(),
            Some(Namespace::Doi) | None => Self::publisher(),
        }
    }

    /// Strategy names in registration order, generic last.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(self.generic.name()))
            .collect()
    }

    /// Pick the best strategy for `page` and return its result.
    ///
    /// # Errors
    ///
    /// `StrategyNotFound` when no strategy, generic included, finds authors.
    /// Document-level errors from any strategy are propagated unchanged.
    pub fn select(&self, page: &Page) -> Result<Selected> {
        let mut tier_a: Vec<&dyn Strategy> = Vec::new();
        let mut tier_b: Vec<&dyn Strategy> = Vec::new();

        for strategy in &self.strategies {
            let strategy = strategy.as_ref();
            if !check(strategy, "authors_found", strategy.authors_found(page))? {
                continue;
            }
            if check(strategy, "is_site_match", strategy.is_site_match(page))? {
                tier_a.push(strategy);
            } else {
                tier_b.push(strategy);
            }
        }

        let tiers = tier_a
            .into_iter()
            .map(|s| (Tier::A, s))
            .chain(tier_b.into_iter().map(|s| (Tier::B, s)));

        for (tier, strategy) in tiers {
            match attempt(strategy, page)? {
                StrategyOutcome::Accepted(result) => {
                    debug!(strategy = strategy.name(), ?tier, authors = result.authors.len(), "strategy accepted");
                    return Ok(Selected {
                        strategy: strategy.name(),
                        tier,
                        result,
                    });
                }
                StrategyOutcome::NoAffiliations(result) => {
                    debug!(
                        strategy = strategy.name(),
                        ?tier,
                        authors = result.authors.len(),
                        "no affiliations, trying next strategy"
                    );
                }
                StrategyOutcome::Errored(err) => {
                    warn!(strategy = strategy.name(), ?tier, error = %err, "strategy failed, trying next");
                }
            }
        }

        let generic = self.generic.as_ref();
        if check(generic, "authors_found", generic.authors_found(page))? {
            match generic.extract(page) {
                Ok(result) if result.authors.is_empty() => {
                    debug!(strategy = generic.name(), "generic markup held no author names");
                }
                Ok(result) => {
                    debug!(strategy = generic.name(), authors = result.authors.len(), "generic strategy used");
                    return Ok(Selected {
                        strategy: generic.name(),
                        tier: Tier::Generic,
                        result,
                    });
                }
                Err(err) if err.is_document_level() => return Err(err),
                Err(err) => warn!(strategy = generic.name(), error = %err, "generic strategy failed"),
            }
        }

        Err(Error::StrategyNotFound)
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}
