use alloc::boxed::Box;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> Playing
/// - Playing -> Won
/// - any -> Playing, when a new game starts
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No deal yet
    #[default]
    NotStarted,
    /// Cards can be flipped and the clock runs
    Playing,
    /// Every pair matched, terminal until the next game
    Won,
}

impl Phase {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: CardId,
    pub face: Face,
    pub state: CardState,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id(),
            face: card.face(),
            state: card.state(),
        }
    }
}

impl CardView {
    pub const fn is_face_visible(&self) -> bool {
        matches!(self.state, CardState::FaceUp | CardState::Matched)
    }

    pub const fn is_matched(&self) -> bool {
        matches!(self.state, CardState::Matched)
    }
}

/// Final figures of a won game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub moves: u32,
    pub elapsed_secs: u32,
    pub score: Score,
}

/// Immutable picture of the whole game, everything a renderer needs for the board, HUD and win overlay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub difficulty: Difficulty,
    pub grid: GridShape,
    pub cards: Vec<CardView>,
    pub moves: u32,
    pub elapsed_secs: u32,
    pub score: Score,
    pub matched_pairs: CardCount,
    pub total_pairs: CardCount,
    pub phase: Phase,
}

impl Snapshot {
    pub const fn is_playing(&self) -> bool {
        self.phase.is_playing()
    }

    pub const fn is_won(&self) -> bool {
        self.phase.is_won()
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.is_won().then_some(GameSummary {
            moves: self.moves,
            elapsed_secs: self.elapsed_secs,
            score: self.score,
        })
    }
}

/// Subscriber notified with a fresh snapshot after every state change.
pub trait Observer {
    fn notify(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> Observer for F {
    fn notify(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

pub type BoxedObserver = Box<dyn Observer>;
