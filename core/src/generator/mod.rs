use rand::Rng;

use crate::*;
pub use random::*;

mod random;

/// Draws a fresh mine layout at every episode reset.
///
/// The engine owns the RNG and threads it through here, so independent
/// engines seeded identically reproduce the same sequence of layouts.
pub trait LayoutGenerator {
    fn generate<R: Rng + ?Sized>(&self, board: BoardConfig, rng: &mut R) -> MineLayout;
}
