//! # landing-parse
//!
//! Metadata extraction for scholarly landing pages.
//!
//! Given the stored HTML of an article's landing page (a publisher page reached
//! through a DOI, or a repository page harvested over OAI-PMH), this library
//! works out who wrote the article and where they work, where the full text
//! lives, and under what license and version it is offered.
//!
//! ## Quick Start
//!
//! ```rust
//! use landing_parse::{classify, Namespace, Options};
//!
//! let html = r#"<html><head>
//!   <meta name="citation_author" content="Ada Lovelace">
//!   <meta name="citation_author_institution" content="Analytical Society">
//! </head><body></body></html>"#;
//!
//! let record = classify(html, Some(Namespace::Doi), Some("https://journal.example.org/a/1"), &Options::default())?;
//! assert_eq!(record.authors[0].affiliations[0].name, "Analytical Society");
//! # Ok::<(), landing_parse::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Strategies**: site-specific extractors for publishers and repositories,
//!   selected in tiers, with a generic metadata fallback
//! - **Affiliation reconciliation**: superscript ids and shared institutions
//! - **Full-text links**: ranked PDF candidates, deny-lists and per-host rewrites
//! - **Access signals**: license normalization, bronze and hybrid detection
//! - **Bounded cost**: every selector evaluation is charged to a per-request budget

mod error;
mod options;
mod result;

/// Budgeted document queries.
pub mod dom;

/// Selector call budget.
pub mod budget;

/// Author/affiliation reconciliation.
pub mod authors;

/// Extraction strategies and strategy selection.
pub mod strategy;

/// Full-text link, license and version resolution.
pub mod fulltext;

/// Page classification entry points.
pub mod classifier;

/// Harvest collaborator traits.
pub mod harvest;

/// URL utilities for resolution and host checks.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Text normalization helpers.
pub mod text;

// Public API - re-exports
pub use budget::{BudgetLimits, CallBudget};
pub use classifier::{classify, classify_page};
pub use error::{Error, Result};
pub use harvest::{classify_harvest, LandingPageSource, Resolution, ResolutionLookup};
pub use options::{NoStrategyPolicy, Options};
pub use result::{
    AffiliationRecord, AuthorAffiliation, AuthorRecord, ContentType, ExtractionResult, FulltextLocation, Namespace,
    OaStatus, PageRecord, UrlEntry, Version,
};
pub use strategy::{Strategy, StrategyRegistry, Tier};
