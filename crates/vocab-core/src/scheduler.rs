//! Spaced-repetition review scheduler.
//!
//! A rating moves a word along a fixed interval table and updates its
//! mastery score with an integer-rounded exponential moving average. Two
//! consecutive low ratings mark the word difficult.
//!
//! The functions here only touch a [`WordMeta`]; placing the word on the
//! difficult list and all revision bookkeeping is done by the caller.

use crate::error::CoreError;
use crate::types::WordMeta;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Delay before the next review, indexed by the review count before the rating.
pub const REVIEW_INTERVALS_MS: [i64; 8] = [
    5 * MINUTE_MS,
    30 * MINUTE_MS,
    12 * HOUR_MS,
    DAY_MS,
    2 * DAY_MS,
    4 * DAY_MS,
    7 * DAY_MS,
    15 * DAY_MS,
];

/// Ratings at or below this count as "low".
pub const LOW_QUALITY_THRESHOLD: u8 = 2;

/// Consecutive low ratings after which a word is difficult.
pub const DIFFICULT_STREAK: u32 = 2;

/// Weight kept from the previous mastery on each rating.
const MASTERY_KEEP: f64 = 0.82;
const MASTERY_GAIN: f64 = 0.18;

/// A review rating in `0..=5`; lower is harder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, CoreError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Quality(value as u8))
        } else {
            Err(CoreError::QualityOutOfRange { quality: value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_low(self) -> bool {
        self.0 <= LOW_QUALITY_THRESHOLD
    }
}

/// What a rating did beyond the metadata update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingOutcome {
    /// The low streak reached [`DIFFICULT_STREAK`] on this rating.
    pub difficult: bool,
}

/// Interval applied after a word's `review_count`-th review (0-based),
/// capped at the last table entry.
pub fn interval_for(review_count: u32) -> i64 {
    let idx = (review_count as usize).min(REVIEW_INTERVALS_MS.len() - 1);
    REVIEW_INTERVALS_MS[idx]
}

/// Mastery after one rating.
pub fn next_mastery(previous: u8, quality: Quality) -> u8 {
    let target = ((f64::from(quality.get()) / f64::from(Quality::MAX)) * 100.0).round();
    let blended = f64::from(previous) * MASTERY_KEEP + target * MASTERY_GAIN;
    blended.clamp(0.0, 100.0).round() as u8
}

/// Applies a rating at `now` to `meta`.
pub fn apply_rating(meta: &mut WordMeta, quality: Quality, now: i64) -> RatingOutcome {
    let previous_count = meta.review_count;
    meta.review_count = previous_count.saturating_add(1);
    meta.last_review_at = now;
    meta.next_review_at = now.saturating_add(interval_for(previous_count));
    meta.mastery = next_mastery(meta.mastery.min(100), quality);

    meta.low_streak = if quality.is_low() {
        meta.low_streak.saturating_add(1)
    } else {
        0
    };

    let difficult = meta.low_streak >= DIFFICULT_STREAK;
    if difficult {
        meta.is_difficult = true;
    }
    RatingOutcome { difficult }
}

/// When the word is next due. Falls back to `last_review_at + interval` for
/// records written before `next_review_at` existed; `0` means never reviewed.
pub fn effective_next_review(meta: &WordMeta) -> i64 {
    if meta.next_review_at > 0 {
        return meta.next_review_at;
    }
    if meta.last_review_at == 0 {
        return 0;
    }
    meta.last_review_at
        .saturating_add(interval_for(meta.review_count))
}

/// A word is due when its effective next review is at or before `now`.
pub fn is_due(meta: &WordMeta, now: i64) -> bool {
    effective_next_review(meta) <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn test_quality_range() {
        assert!(Quality::new(0).is_ok());
        assert!(Quality::new(5).is_ok());
        assert_eq!(
            Quality::new(6),
            Err(CoreError::QualityOutOfRange { quality: 6 })
        );
        assert!(Quality::new(-1).is_err());
    }

    #[test]
    fn test_first_rating_uses_first_interval() {
        let mut meta = WordMeta::default();
        apply_rating(&mut meta, q(4), 1_000);
        assert_eq!(meta.review_count, 1);
        assert_eq!(meta.last_review_at, 1_000);
        assert_eq!(meta.next_review_at, 1_000 + 5 * MINUTE_MS);
    }

    #[test]
    fn test_interval_caps_at_last_entry() {
        assert_eq!(interval_for(0), 5 * MINUTE_MS);
        assert_eq!(interval_for(7), 15 * DAY_MS);
        assert_eq!(interval_for(40), 15 * DAY_MS);

        let mut meta = WordMeta {
            review_count: 12,
            ..WordMeta::default()
        };
        apply_rating(&mut meta, q(5), 0);
        assert_eq!(meta.next_review_at, 15 * DAY_MS);
    }

    #[test]
    fn test_mastery_formula() {
        // 0 * 0.82 + 100 * 0.18 = 18
        assert_eq!(next_mastery(0, q(5)), 18);
        // 50 * 0.82 + 60 * 0.18 = 41 + 10.8 = 51.8
        assert_eq!(next_mastery(50, q(3)), 52);
        assert_eq!(next_mastery(100, q(0)), 82);
    }

    #[test]
    fn test_two_low_ratings_mark_difficult() {
        let mut meta = WordMeta::default();
        let first = apply_rating(&mut meta, q(1), 10);
        assert!(!first.difficult);
        assert_eq!(meta.low_streak, 1);
        let second = apply_rating(&mut meta, q(2), 20);
        assert!(second.difficult);
        assert!(meta.is_difficult);
    }

    #[test]
    fn test_good_rating_resets_low_streak() {
        let mut meta = WordMeta::default();
        apply_rating(&mut meta, q(1), 10);
        apply_rating(&mut meta, q(4), 20);
        assert_eq!(meta.low_streak, 0);
        let outcome = apply_rating(&mut meta, q(0), 30);
        assert!(!outcome.difficult);
    }

    #[test]
    fn test_effective_next_review_fallback() {
        let never = WordMeta::default();
        assert_eq!(effective_next_review(&never), 0);
        assert!(is_due(&never, 0));

        let legacy = WordMeta {
            last_review_at: 1_000,
            review_count: 1,
            ..WordMeta::default()
        };
        assert_eq!(effective_next_review(&legacy), 1_000 + 30 * MINUTE_MS);
        assert!(!is_due(&legacy, 1_000));
    }

    proptest! {
        #[test]
        fn prop_mastery_stays_in_bounds(
            start in 0u8..=100,
            ratings in proptest::collection::vec(0i64..=5, 0..64),
        ) {
            let mut meta = WordMeta { mastery: start, ..WordMeta::default() };
            for (i, r) in ratings.into_iter().enumerate() {
                apply_rating(&mut meta, q(r), i as i64);
                prop_assert!(meta.mastery <= 100);
            }
        }

        #[test]
        fn prop_perfect_ratings_never_lower_mastery(start in 0u8..=100, rounds in 1usize..80) {
            let mut mastery = start;
            for _ in 0..rounds {
                let next = next_mastery(mastery, q(5));
                prop_assert!(next <= 100);
                if mastery <= 97 {
                    prop_assert!(next > mastery);
                } else {
                    prop_assert!(next >= 98);
                }
                mastery = next;
            }
        }
    }
}
