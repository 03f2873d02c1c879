//! Repository catalogue (OAI-PMH namespace).

mod dspace;
mod eprints;

pub use dspace::DSpace;
pub use eprints::EPrints;

use super::Strategy;

/// Repository strategies in registration order.
#[must_use]
pub fn strategies() -> Vec<Box<dyn Strategy>> {
    vec![Box::new(DSpace), Box::new(EPrints)]
}
