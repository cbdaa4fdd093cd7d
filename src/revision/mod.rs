pub mod lock;
pub mod review;

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::records::{Difficulty, PracticeRecord};
use crate::temporal::{day_index, days_between};

/// A retry-flagged record with its scheduling metadata.
#[derive(Debug, Clone)]
pub struct RetryCandidate<'a> {
    pub record: &'a PracticeRecord,
    pub days_since: i64,
    pub priority: i64,
}

/// Today's pick, as shown on the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RevisionSuggestion {
    pub id: String,
    pub title: String,
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
    pub days_since_solved: i64,
    pub priority_score: i64,
    pub review_count: Option<usize>,
    pub retry_later: bool,
    pub queue_position: usize,
    pub queue_size: usize,
}

/// Retry-flagged, dated records ordered by `days_since × weight`, highest
/// first. Equal priorities keep insertion order. Future dates give negative
/// values and are kept as-is.
pub fn build_retry_queue(records: &[PracticeRecord], today: NaiveDate) -> Vec<RetryCandidate<'_>> {
    let mut queue: Vec<RetryCandidate<'_>> = records
        .iter()
        .filter(|r| r.retry_later)
        .filter_map(|record| {
            let solved = record.date_solved?;
            let days_since = days_between(solved, today);
            Some(RetryCandidate {
                record,
                days_since,
                priority: days_since * Difficulty::weight(record.difficulty),
            })
        })
        .collect();
    queue.sort_by(|a, b| b.priority.cmp(&a.priority));
    queue
}

/// Position in a queue of `len` for the given absolute day index. Consecutive
/// days walk the queue cyclically.
pub fn rotation_index(day_index: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(day_index.rem_euclid(len as i64) as usize)
}

/// Pick today's revision. Selection is by daily rotation over the ranked
/// queue; rank only orders the queue and feeds the metadata.
pub fn suggest_todays_revision(
    records: &[PracticeRecord],
    today: NaiveDate,
    day_offset: i64,
) -> Option<RevisionSuggestion> {
    let queue = build_retry_queue(records, today);
    let index = rotation_index(day_index(today) + day_offset, queue.len())?;
    let picked = &queue[index];

    tracing::debug!(
        record_id = %picked.record.id,
        queue_size = queue.len(),
        queue_position = index,
        priority = picked.priority,
        "Selected revision candidate"
    );

    Some(RevisionSuggestion {
        id: picked.record.id.clone(),
        title: picked.record.title.clone(),
        difficulty: picked.record.difficulty,
        tags: picked.record.tags.clone(),
        days_since_solved: picked.days_since,
        priority_score: picked.priority,
        review_count: picked.record.review_count(),
        retry_later: picked.record.retry_later,
        queue_position: index,
        queue_size: queue.len(),
    })
}
