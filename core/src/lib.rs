//! Rules of the memory (concentration) game: dealing, the flip/match state machine, scoring and timing.
//!
//! Nothing in here touches a clock or a screen. Time enters through a [`Scheduler`] and state leaves through
//! [`Snapshot`]s handed to [`Observer`]s.

#![no_std]

extern crate alloc;

pub use card::*;
pub use difficulty::*;
pub use engine::*;
pub use error::*;
pub use schedule::*;
pub use snapshot::*;
pub use types::*;

pub mod deck;
pub mod score;

mod card;
mod difficulty;
mod engine;
mod error;
mod schedule;
mod snapshot;
mod types;
