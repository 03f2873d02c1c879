//! Publisher catalogue (DOI namespace).

mod brill;
mod iop;
mod rxiv;
mod scielo;
mod spie;
mod taylor;

pub use brill::Brill;
pub use iop::Iop;
pub use rxiv::Rxiv;
pub use scielo::ScieloPreprints;
pub use spie::Spie;
pub use taylor::Taylor;

use super::Strategy;

/// Publisher strategies in registration order.
#[must_use]
pub fn strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(Brill),
        Box::new(Iop),
        Box::new(Rxiv),
        Box::new(ScieloPreprints),
        Box::new(Spie),
        Box::new(Taylor),
    ]
}
