use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::records::PracticeRecord;

pub const RECENT_REVIEW_LIMIT: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecentReview {
    pub problem_id: String,
    pub problem_title: String,
    pub review_date: Option<DateTime<Utc>>,
    pub quality: Option<u8>,
    pub action: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SpacedRepetitionSummary {
    pub total_problems: usize,
    pub problems_with_sr: usize,
    pub todays_revisions: usize,
    pub overdue_revisions: usize,
    pub average_easiness: f64,
    pub total_reviews: usize,
    pub recent_reviews: Vec<RecentReview>,
}

/// Review-state summary, driven by each record's own `next_review`. This is
/// independent of the daily rotation.
pub fn summarize_spaced_repetition(records: &[PracticeRecord], now: DateTime<Utc>) -> SpacedRepetitionSummary {
    let today = now.date_naive();
    let mut summary = SpacedRepetitionSummary {
        total_problems: records.len(),
        ..Default::default()
    };
    let mut easiness_sum = 0.0;
    let mut recent = Vec::new();

    for record in records {
        let Some(sr) = record.spaced_repetition.as_ref() else {
            continue;
        };
        summary.problems_with_sr += 1;
        summary.total_reviews += sr.review_history.len();
        easiness_sum += sr.easiness;

        let skip = sr.review_history.len().saturating_sub(RECENT_REVIEW_LIMIT);
        recent.extend(sr.review_history.iter().skip(skip).map(|event| RecentReview {
            problem_id: record.id.clone(),
            problem_title: record.title.clone(),
            review_date: event.date,
            quality: event.quality,
            action: event.action.clone(),
        }));

        if let Some(next_review) = sr.next_review {
            if next_review <= now {
                if next_review.date_naive() == today {
                    summary.todays_revisions += 1;
                } else {
                    summary.overdue_revisions += 1;
                }
            }
        }
    }

    if summary.problems_with_sr > 0 {
        let mean = easiness_sum / summary.problems_with_sr as f64;
        summary.average_easiness = (mean * 100.0).round() / 100.0;
    }

    // Newest first; undated events sink to the end.
    recent.sort_by(|a, b| b.review_date.cmp(&a.review_date));
    recent.truncate(RECENT_REVIEW_LIMIT);
    summary.recent_reviews = recent;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crate::records::{ReviewEvent, SpacedRepetition};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 24, 15, 0, 0).unwrap()
    }

    fn event(hours_ago: i64) -> ReviewEvent {
        ReviewEvent {
            date: Some(now() - Duration::hours(hours_ago)),
            quality: Some(4),
            action: "reviewed".to_string(),
            interval: Some(1),
        }
    }

    fn tracked(id: &str, easiness: f64, next_review: Option<DateTime<Utc>>, history: Vec<ReviewEvent>) -> PracticeRecord {
        let mut record = PracticeRecord::new(id, "u", id);
        record.spaced_repetition = Some(SpacedRepetition {
            easiness,
            next_review,
            review_history: history,
            ..Default::default()
        });
        record
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize_spaced_repetition(&[], now());
        assert_eq!(summary, SpacedRepetitionSummary::default());
    }

    #[test]
    fn test_due_and_overdue_counts() {
        let records = vec![
            tracked("today", 2.5, Some(now() - Duration::hours(2)), vec![]),
            tracked("overdue", 2.0, Some(now() - Duration::days(3)), vec![]),
            tracked("later_today", 2.2, Some(now() + Duration::hours(2)), vec![]),
            tracked("future", 1.3, Some(now() + Duration::days(4)), vec![]),
            PracticeRecord::new("plain", "u", "plain"),
        ];
        let summary = summarize_spaced_repetition(&records, now());
        assert_eq!(summary.total_problems, 5);
        assert_eq!(summary.problems_with_sr, 4);
        assert_eq!(summary.todays_revisions, 1);
        assert_eq!(summary.overdue_revisions, 1);
        assert_eq!(summary.average_easiness, 2.0);
    }

    #[test]
    fn test_recent_reviews_sorted_and_capped() {
        let many: Vec<_> = (0..12).map(|h| event(h + 10)).collect();
        let records = vec![
            tracked("a", 2.5, None, many),
            tracked("b", 2.5, None, vec![event(1), ReviewEvent { date: None, ..event(0) }]),
        ];
        let summary = summarize_spaced_repetition(&records, now());
        assert_eq!(summary.total_reviews, 14);
        assert_eq!(summary.recent_reviews.len(), 10);
        assert_eq!(summary.recent_reviews[0].problem_id, "b");
        assert!(summary
            .recent_reviews
            .windows(2)
            .all(|w| w[0].review_date >= w[1].review_date));
    }
}
