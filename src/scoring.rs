//! Score, star and best-time rules applied when a session is submitted.

pub const MAX_STARS: u8 = 3;
pub const POINTS_PER_CORRECT: u32 = 300;

const TIME_BONUS_CEILING: u64 = 1000;
const TIME_BONUS_FLOOR: u64 = 100;
const TIME_PENALTY_PER_SEC: u64 = 10;

/// Bonus for finishing quickly: loses 10 points per second, never below 100.
pub fn time_bonus(elapsed_secs: u64) -> u32 {
    let penalty = elapsed_secs.saturating_mul(TIME_PENALTY_PER_SEC);
    TIME_BONUS_CEILING
        .saturating_sub(penalty)
        .max(TIME_BONUS_FLOOR) as u32
}

/// Stars for `correct` of `total` placements, scaled to `MAX_STARS` and
/// rounded half up. With three slots this is simply `correct`.
pub fn stars_earned(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    let max = MAX_STARS as usize;
    let stars = (correct * max * 2 + total) / (2 * total);
    stars.min(max) as u8
}

pub fn score(correct: usize, elapsed_secs: u64) -> u32 {
    (correct as u32).saturating_mul(POINTS_PER_CORRECT) + time_bonus(elapsed_secs)
}

/// Only a fully correct run that beats the previous record counts.
pub fn improves_best_time(
    correct: usize,
    total: usize,
    elapsed_secs: u64,
    best: Option<u64>,
) -> bool {
    correct == total && best.map_or(true, |b| elapsed_secs < b)
}

/// Everything the results screen shows about one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorecard {
    pub correct: usize,
    pub total: usize,
    pub elapsed_secs: u64,
    pub time_bonus: u32,
    pub score: u32,
    pub stars: u8,
}

impl Scorecard {
    pub fn compute(correct: usize, total: usize, elapsed_secs: u64) -> Self {
        Self {
            correct,
            total,
            elapsed_secs,
            time_bonus: time_bonus(elapsed_secs),
            score: score(correct, elapsed_secs),
            stars: stars_earned(correct, total),
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.correct == self.total
    }
}
