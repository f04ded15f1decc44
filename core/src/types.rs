use core::fmt;
use serde::{Deserialize, Serialize};

/// Position of a card inside the current deal, also its stable identity.
pub type CardId = u16;

/// Count type used for cards and pairs.
pub type CardCount = u16;

/// Derived performance score, always within `0..=MAX_SCORE`.
pub type Score = u16;

/// Generation counter for game instances.
///
/// Bumped by every new game so timer events requested by a superseded game can be recognized and dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(u32);

impl Epoch {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Board shape, `rows * cols` is always even for the built-in difficulties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: u8,
    pub cols: u8,
}

impl GridShape {
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    pub const fn total_cards(self) -> CardCount {
        mult(self.rows, self.cols)
    }

    pub const fn total_pairs(self) -> CardCount {
        self.total_cards() / 2
    }
}

pub const fn mult(a: u8, b: u8) -> CardCount {
    let a = a as CardCount;
    let b = b as CardCount;
    a.saturating_mul(b)
}
