//! Collaborator seams for harvest pipelines.
//!
//! Storage and DOI/OAI resolution live outside this crate. Callers implement
//! [`LandingPageSource`] and [`ResolutionLookup`] over whatever backs them and
//! hand both to [`classify_harvest`].

use tracing::debug;

use crate::classifier::classify;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::result::{Namespace, PageRecord};

/// Where stored landing pages come from.
pub trait LandingPageSource {
    /// Raw bytes stored for `id`, already decompressed; `None` when nothing is
    /// stored.
    fn fetch(&self, id: &str) -> Result<Option<Vec<u8>>>;
}

/// Resolution data recorded for a harvested identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// URL the identifier resolved to when the page was fetched.
    pub resolved_url: Option<String>,
    pub namespace: Namespace,
}

/// Looks up how an identifier was resolved.
pub trait ResolutionLookup {
    /// # Errors
    ///
    /// [`Error::NotFound`] when `id` is unknown.
    fn lookup(&self, id: &str) -> Result<Resolution>;
}

/// Fetch, resolve and classify one harvested identifier.
///
/// # Errors
///
/// [`Error::NotFound`] when no landing page is stored for `id`, plus anything
/// the lookup or [`classify`] returns.
pub fn classify_harvest(
    id: &str,
    source: &dyn LandingPageSource,
    lookup: &dyn ResolutionLookup,
    options: &Options,
) -> Result<PageRecord> {
    let resolution = lookup.lookup(id)?;
    let bytes = source
        .fetch(id)?
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    debug!(id, namespace = %resolution.namespace, bytes = bytes.len(), "classifying harvested page");
    classify(bytes, Some(resolution.namespace), resolution.resolved_url.as_deref(), options)
}
