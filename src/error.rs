//! Error types for landing-page classification.
//!
//! Only a few of these ever reach a caller: strategy failures are isolated
//! inside the selector and show up as reduced extraction quality instead.

/// Error type for classification operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No strategy, the generic fallback included, produced a usable author list.
    #[error("no extraction strategy matched the document")]
    StrategyNotFound,

    /// The per-request selector evaluation ceiling was hit.
    ///
    /// `breakdown` lists call sites by descending call count.
    #[error("document too complex to parse: selector budget exceeded after {calls} calls")]
    SelectorBudgetExceeded {
        /// Number of selector evaluations attempted, the refused one included.
        calls: usize,
        /// Per-call-site counts, highest first.
        breakdown: Vec<(String, usize)>,
    },

    /// The stored page is a bot interstitial rather than the article itself.
    #[error("page blocked by unusual-traffic interstitial (detected by {strategy})")]
    UnusualTraffic {
        /// Strategy that recognised the interstitial.
        strategy: &'static str,
    },

    /// A single strategy failed while extracting. Never escapes selection.
    #[error("strategy {strategy} failed: {message}")]
    Strategy {
        /// Name of the failing strategy.
        strategy: &'static str,
        /// What went wrong.
        message: String,
    },

    /// Markup bytes could not be turned into text.
    #[error("markup decoding failed: {0}")]
    Encoding(String),

    /// A harvest collaborator had nothing stored for the identifier.
    #[error("no landing page found for {0}")]
    NotFound(String),
}

impl Error {
    /// Convenience constructor for isolated strategy failures.
    pub fn strategy(strategy: &'static str, message: impl Into<String>) -> Self {
        Self::Strategy {
            strategy,
            message: message.into(),
        }
    }

    /// True when the request itself is at fault (maps to a 4xx response).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::SelectorBudgetExceeded { .. })
    }

    /// True for conditions describing the document rather than one strategy.
    ///
    /// The selector never swallows these.
    #[must_use]
    pub fn is_document_level(&self) -> bool {
        matches!(
            self,
            Self::SelectorBudgetExceeded { .. } | Self::UnusualTraffic { .. }
        )
    }

    /// Stable snake_case label for responses and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StrategyNotFound => "strategy_not_found",
            Self::SelectorBudgetExceeded { .. } => "too_complex_to_parse",
            Self::UnusualTraffic { .. } => "unusual_traffic",
            Self::Strategy { .. } => "strategy_error",
            Self::Encoding(_) => "encoding_error",
            Self::NotFound(_) => "not_found",
        }
    }
}

/// Result type alias for classification operations.
pub type Result<T> = std::result::Result<T, Error>;
