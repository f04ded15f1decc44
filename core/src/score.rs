use crate::Score;

pub const MAX_SCORE: Score = 1000;

/// Points lost per completed move.
pub const MOVE_PENALTY: u32 = 5;

/// One point is lost for every full period of this many seconds.
pub const TIME_PENALTY_PERIOD_SECS: u32 = 10;

/// `max(0, 1000 - 5 * moves - floor(elapsed / 10))`, never overflows.
pub const fn compute(moves: u32, elapsed_secs: u32) -> Score {
    let penalty = moves
        .saturating_mul(MOVE_PENALTY)
        .saturating_add(elapsed_secs / TIME_PENALTY_PERIOD_SECS);
    (MAX_SCORE as u32).saturating_sub(penalty) as Score
}
