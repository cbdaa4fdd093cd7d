//! Review grading for tracked records (SM-2 variant).
//!
//! - quality 0-2: the recall failed; repetitions reset and the next review is
//!   tomorrow. Easiness is left alone.
//! - quality 3-5: repetitions grow, the interval goes 1 → 6 → interval × EF,
//!   and EF moves by `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)`.
//! - EF stays within [1.3, 3.0].
//!
//! These functions compute the next state only; writing it back is the record
//! store's job.

use chrono::{DateTime, Utc};
use crate::error::LeetspaceError;
use crate::records::{ReviewEvent, SpacedRepetition};
use crate::temporal::add_days;

pub const MAX_QUALITY: u8 = 5;
pub const PASSING_QUALITY: u8 = 3;
pub const MIN_EASINESS: f64 = 1.3;
pub const MAX_EASINESS: f64 = 3.0;
pub const MAX_SKIP_INTERVAL: u32 = 30;

pub fn apply_review(
    current: Option<&SpacedRepetition>,
    quality: u8,
    now: DateTime<Utc>,
) -> Result<SpacedRepetition, LeetspaceError> {
    if quality > MAX_QUALITY {
        return Err(LeetspaceError::validation(format!(
            "review quality must be 0-{}, got {}",
            MAX_QUALITY, quality
        )));
    }

    let mut sr = current.cloned().unwrap_or_default();

    if quality < PASSING_QUALITY {
        sr.repetitions = 0;
        sr.interval_days = 1;
    } else {
        sr.repetitions += 1;
        sr.interval_days = match sr.repetitions {
            1 => 1,
            2 => 6,
            _ => ((f64::from(sr.interval_days) * sr.easiness).round() as u32).max(1),
        };
        let q = f64::from(MAX_QUALITY - quality);
        let change = 0.1 - q * (0.08 + q * 0.02);
        sr.easiness = (sr.easiness + change).clamp(MIN_EASINESS, MAX_EASINESS);
    }

    sr.last_reviewed = Some(now);
    sr.next_review = Some(add_days(now, i64::from(sr.interval_days)));
    sr.review_history.push(ReviewEvent {
        date: Some(now),
        quality: Some(quality),
        action: "reviewed".to_string(),
        interval: Some(sr.interval_days),
    });
    Ok(sr)
}

/// Push the review to tomorrow and lengthen the interval by one day.
pub fn skip_review(current: Option<&SpacedRepetition>, now: DateTime<Utc>) -> SpacedRepetition {
    let mut sr = current.cloned().unwrap_or_default();
    sr.next_review = Some(add_days(now, 1));
    sr.interval_days = (sr.interval_days + 1).min(MAX_SKIP_INTERVAL);
    sr.review_history.push(ReviewEvent {
        date: Some(now),
        quality: None,
        action: "skipped".to_string(),
        interval: Some(sr.interval_days),
    });
    sr
}
