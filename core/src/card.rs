use serde::{Deserialize, Serialize};

use crate::*;

const FACE_SYMBOLS: [&str; 18] = [
    "🍎", "🍌", "🍒", "🍇", "🍊", "🍓", "🍑", "🍍", "🥭", "🍉", "🥝", "🍋", "🍐", "🥥", "🍈", "🍏",
    "🫐", "🥑",
];

/// Face symbol printed on a card, an index into a fixed alphabet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Face(u8);

impl Face {
    /// Number of distinct faces available.
    pub const ALPHABET_LEN: usize = FACE_SYMBOLS.len();

    /// Face at `index`, wrapping around the alphabet.
    pub const fn wrapping(index: usize) -> Self {
        Self((index % Self::ALPHABET_LEN) as u8)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn symbol(self) -> &'static str {
        FACE_SYMBOLS[self.0 as usize]
    }
}

/// Per-card state machine: `FaceDown -> FaceUp -> {Matched | FaceDown}`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    face: Face,
    state: CardState,
}

impl Card {
    pub const fn new(id: CardId, face: Face) -> Self {
        Self {
            id,
            face,
            state: CardState::FaceDown,
        }
    }

    pub const fn id(&self) -> CardId {
        self.id
    }

    pub const fn face(&self) -> Face {
        self.face
    }

    pub const fn state(&self) -> CardState {
        self.state
    }

    /// Face-up and still waiting for its pair to resolve.
    pub const fn is_flipped(&self) -> bool {
        matches!(self.state, CardState::FaceUp)
    }

    pub const fn is_matched(&self) -> bool {
        matches!(self.state, CardState::Matched)
    }

    /// Whether a renderer should show the face.
    pub const fn is_face_visible(&self) -> bool {
        matches!(self.state, CardState::FaceUp | CardState::Matched)
    }

    pub(crate) fn turn_up(&mut self) {
        self.state = CardState::FaceUp;
    }

    pub(crate) fn turn_down(&mut self) {
        if self.is_flipped() {
            self.state = CardState::FaceDown;
        }
    }

    pub(crate) fn mark_matched(&mut self) {
        self.state = CardState::Matched;
    }
}
