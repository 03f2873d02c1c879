//! Selector call budget.
//!
//! A handful of pathological landing pages make CSS selector matching blow up
//! combinatorially. Every query issued through [`crate::dom::Page`] is counted
//! here first; once a request crosses the hard ceiling further queries are
//! refused with [`Error::SelectorBudgetExceeded`].
//!
//! The counters live in a [`CallBudget`] owned by one request. It uses `Cell`
//! and `RefCell`, so it is `!Sync` and cannot be shared between concurrently
//! running requests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::Location;
use std::sync::OnceLock;

use tracing::{error, info, warn};

use crate::error::{Error, Result};

/// Warning threshold and hard ceiling for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetLimits {
    /// Call count at which a diagnostic is emitted (once).
    pub warn_at: usize,
    /// Highest call count still allowed.
    pub limit: usize,
}

impl Default for BudgetLimits {
    fn default() -> Self {
        Self {
            warn_at: 500,
            limit: 2000,
        }
    }
}

static INSTALLED: OnceLock<BudgetLimits> = OnceLock::new();

/// Install process-wide default limits.
///
/// Only the first call has an effect; later calls return `false` and leave the
/// installed limits untouched.
pub fn install(limits: BudgetLimits) -> bool {
    let fresh = INSTALLED.set(limits).is_ok();
    if fresh {
        info!(warn_at = limits.warn_at, limit = limits.limit, "selector budget installed");
    }
    fresh
}

/// Limits installed with [`install`], or the built-in defaults.
#[must_use]
pub fn installed_limits() -> BudgetLimits {
    INSTALLED.get().copied().unwrap_or_default()
}

/// What happened on a tracked call that was allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Below the warning threshold, or already past it.
    Normal,
    /// This call reached the warning threshold.
    Warning,
}

/// Request-scoped selector call counter.
#[derive(Debug)]
pub struct CallBudget {
    limits: BudgetLimits,
    calls: Cell<usize>,
    sites: RefCell<HashMap<String, usize>>,
}

impl CallBudget {
    /// Budget using the installed (or default) limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(installed_limits())
    }

    /// Budget with explicit limits.
    #[must_use]
    pub fn with_limits(limits: BudgetLimits) -> Self {
        Self {
            limits,
            calls: Cell::new(0),
            sites: RefCell::new(HashMap::new()),
        }
    }

    /// The limits this budget enforces.
    #[must_use]
    pub fn limits(&self) -> BudgetLimits {
        self.limits
    }

    /// Calls tracked since the last reset.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Forget all counts. Called at the start of every request.
    pub fn reset(&self) {
        self.calls.set(0);
        self.sites.borrow_mut().clear();
    }

    /// Count one selector evaluation from the caller's location.
    #[track_caller]
    pub fn charge(&self) -> Result<BudgetStatus> {
        let loc = Location::caller();
        self.track(&format!("{}:{}", loc.file(), loc.line()))
    }

    /// Count one selector evaluation attributed to `site`.
    pub fn track(&self, site: &str) -> Result<BudgetStatus> {
        let calls = self.calls.get() + 1;
        self.calls.set(calls);
        *self.sites.borrow_mut().entry(site.to_string()).or_insert(0) += 1;

        if calls > self.limits.limit {
            let breakdown = self.breakdown();
            error!(
                calls,
                limit = self.limits.limit,
                site,
                ?breakdown,
                "selector call limit exceeded"
            );
            return Err(Error::SelectorBudgetExceeded { calls, breakdown });
        }

        if calls == self.limits.warn_at {
            warn!(
                calls,
                limit = self.limits.limit,
                breakdown = ?self.breakdown(),
                "selector calls approaching limit"
            );
            return Ok(BudgetStatus::Warning);
        }

        Ok(BudgetStatus::Normal)
    }

    /// Per-site counts sorted by descending count, ties by site name.
    #[must_use]
    pub fn breakdown(&self) -> Vec<(String, usize)> {
        let mut sites: Vec<(String, usize)> = self
            .sites
            .borrow()
            .iter()
            .map(|(site, count)| (site.clone(), *count))
            .collect();
        sites.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sites
    }
}

impl Default for CallBudget {
    fn default() -> Self {
        Self::new()
    }
}
