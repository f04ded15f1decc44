use alloc::vec::Vec;
use rand::prelude::*;

use crate::*;

/// Faces for `total_pairs` pairs, taken in alphabet order.
///
/// Wraps around the alphabet when more pairs are requested than there are faces, so two different pairs may then
/// share a face.
pub fn pair_faces(total_pairs: CardCount) -> Vec<Face> {
    (0..usize::from(total_pairs)).map(Face::wrapping).collect()
}

/// In-place Fisher-Yates: walking from the last index down, swap each slot with a uniformly chosen slot at or before
/// it.
pub fn shuffle<T>(items: &mut [T], rng: &mut SmallRng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Deals a fresh face-down deck for `grid`, ids are assigned sequentially after shuffling.
pub fn deal(grid: GridShape, rng: &mut SmallRng) -> Vec<Card> {
    let faces = pair_faces(grid.total_pairs());

    let mut values = Vec::with_capacity(faces.len() * 2);
    values.extend_from_slice(&faces);
    values.extend_from_slice(&faces);
    shuffle(&mut values, rng);

    let cards: Vec<Card> = values
        .into_iter()
        .enumerate()
        .map(|(id, face)| Card::new(id as CardId, face))
        .collect();

    if cards.len() != usize::from(grid.total_cards()) {
        log::warn!(
            "Dealt deck size mismatch, actual: {}, requested: {}",
            cards.len(),
            grid.total_cards()
        );
    }
    cards
}
