use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::records::{Difficulty, PracticeRecord};
use crate::temporal::days_between;

pub const RECENT_ACTIVITY_LIMIT: usize = 5;
pub const RECENT_TAG_LIMIT: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecentActivityEntry {
    pub id: String,
    pub title: String,
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
    pub time_ago: String,
    pub retry_later: bool,
}

/// The most recently solved records, newest first.
pub fn recent_activity(records: &[PracticeRecord], today: NaiveDate) -> Vec<RecentActivityEntry> {
    let mut dated: Vec<(NaiveDate, &PracticeRecord)> = records
        .iter()
        .filter_map(|r| r.date_solved.map(|d| (d, r)))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    dated
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|(date, record)| RecentActivityEntry {
            id: record.id.clone(),
            title: record.title.clone(),
            difficulty: record.difficulty,
            tags: record.tags.iter().take(RECENT_TAG_LIMIT).cloned().collect(),
            time_ago: relative_label(days_between(date, today)),
            retry_later: record.retry_later,
        })
        .collect()
}

/// Future dates read as "Today".
pub fn relative_label(days_ago: i64) -> String {
    match days_ago {
        n if n <= 0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    }
}
