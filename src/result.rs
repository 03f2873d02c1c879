//! Output types for landing-page classification.
//!
//! Strategies produce [`ExtractionResult`]s, full-text resolution produces a
//! [`FulltextLocation`], and the classifier folds both into the [`PageRecord`]
//! handed back to the harvesting pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a document's identity was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Publisher landing page reached through a DOI.
    Doi,
    /// Repository page harvested over OAI-PMH.
    Pmh,
}

impl Namespace {
    /// Wire name (`"doi"` or `"pmh"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doi => "doi",
            Self::Pmh => "pmh",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doi" => Ok(Self::Doi),
            "pmh" => Ok(Self::Pmh),
            other => Err(format!("unknown namespace {other:?}, expected \"doi\" or \"pmh\"")),
        }
    }
}

/// Reconciled author with the organizations attributed to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorAffiliation {
    /// Display name.
    pub name: String,
    /// Organization strings in source order.
    pub affiliations: Vec<String>,
    /// `None` when the page does not say.
    pub is_corresponding: Option<bool>,
}

impl AuthorAffiliation {
    /// Author with no affiliations and unknown corresponding status.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// What one strategy pulled out of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Authors in page order.
    pub authors: Vec<AuthorAffiliation>,
    /// Abstract text, if the strategy found one.
    pub abstract_text: Option<String>,
}

impl ExtractionResult {
    /// True when at least one author carries an affiliation.
    #[must_use]
    pub fn has_affiliations(&self) -> bool {
        self.authors.iter().any(|a| !a.affiliations.is_empty())
    }
}

/// Which manuscript version a full-text link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Version {
    PublishedVersion,
    AcceptedVersion,
    SubmittedVersion,
}

/// Open-access classification of a full-text location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OaStatus {
    Gold,
    Hybrid,
    Bronze,
    Closed,
}

/// Where the full text lives and under what terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulltextLocation {
    /// Absolute URL of the full text.
    pub url: Option<String>,
    pub version: Option<Version>,
    /// Normalized license code, `unspecified-oa`, or unknown.
    pub license: Option<String>,
    pub oa_status: Option<OaStatus>,
    /// Which signal established the open status.
    pub open_version_source_string: Option<String>,
}

/// Kind of resource behind a [`UrlEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Pdf,
    Html,
}

/// One entry of [`PageRecord::urls`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub url: String,
    pub content_type: ContentType,
}

/// Organization entry in the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliationRecord {
    pub name: String,
}

/// Author entry in the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub name: String,
    pub affiliations: Vec<AffiliationRecord>,
    pub is_corresponding: Option<bool>,
}

impl From<AuthorAffiliation> for AuthorRecord {
    fn from(author: AuthorAffiliation) -> Self {
        Self {
            name: author.name,
            affiliations: author
                .affiliations
                .into_iter()
                .map(|name| AffiliationRecord { name })
                .collect(),
            is_corresponding: author.is_corresponding,
        }
    }
}

/// Final, serializable record for one landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub authors: Vec<AuthorRecord>,
    /// PDF entry first, then the HTML landing page.
    pub urls: Vec<UrlEntry>,
    pub license: Option<String>,
    pub version: Option<Version>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oa_status: Option<OaStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_version_source_string: Option<String>,
}

impl PageRecord {
    /// Record for a page where no strategy found authors.
    #[must_use]
    pub fn no_authors() -> Self {
        Self::default()
    }

    /// True for the [`PageRecord::no_authors`] shape.
    #[must_use]
    pub fn is_no_authors(&self) -> bool {
        self.authors.is_empty() && self.urls.is_empty() && self.abstract_text.is_none()
    }

    /// URL of the PDF entry, if any.
    #[must_use]
    pub fn pdf_url(&self) -> Option<&str> {
        self.urls
            .iter()
            .find(|u| u.content_type == ContentType::Pdf)
            .map(|u| u.url.as_str())
    }
}
