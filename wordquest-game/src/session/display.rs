//! Visual option ordering.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::OPTION_COUNT;

/// Permutation from on-screen position to underlying option index. A fresh
/// one is drawn every time a question is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMap([usize; OPTION_COUNT]);

impl DisplayMap {
    #[must_use]
    pub const fn identity() -> Self {
        Self([0, 1, 2, 3])
    }

    /// Uniformly random permutation.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut order = Self::identity().0;
        order.shuffle(rng);
        Self(order)
    }

    /// Underlying option shown at `display_index`.
    #[must_use]
    pub fn option_for(&self, display_index: usize) -> Option<usize> {
        self.0.get(display_index).copied()
    }

    /// Screen position of an underlying option.
    #[must_use]
    pub fn display_index_of(&self, option: usize) -> Option<usize> {
        self.0.iter().position(|&o| o == option)
    }

    #[must_use]
    pub const fn order(&self) -> &[usize; OPTION_COUNT] {
        &self.0
    }
}

impl Default for DisplayMap {
    fn default() -> Self {
        Self::identity()
    }
}
