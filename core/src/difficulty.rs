use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Every selectable difficulty, in presentation order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub const fn grid(self) -> GridShape {
        use Difficulty::*;
        match self {
            Easy => GridShape::new(4, 4),
            Medium => GridShape::new(4, 5),
            Hard => GridShape::new(6, 6),
        }
    }

    pub const fn total_cards(self) -> CardCount {
        self.grid().total_cards()
    }

    pub const fn total_pairs(self) -> CardCount {
        self.grid().total_pairs()
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "easy",
            Medium => "medium",
            Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}
