use std::collections::{HashMap, HashSet};
use serde::{Serialize, Deserialize};
use crate::records::{Difficulty, PracticeRecord};

pub const TOP_TAG_LIMIT: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DifficultyBreakdown {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicStats {
    pub total_problems: usize,
    pub retry_count: usize,
    pub total_active_days: usize,
    pub difficulty_breakdown: DifficultyBreakdown,
    pub most_used_tags: Vec<TagCount>,
    pub total_time_minutes: u64,
}

pub fn compute_basic_stats(records: &[PracticeRecord]) -> BasicStats {
    let mut breakdown = DifficultyBreakdown::default();
    let mut active_days = HashSet::new();
    let mut retry_count = 0;
    let mut total_time_minutes = 0u64;

    for record in records {
        if record.retry_later {
            retry_count += 1;
        }
        if let Some(date) = record.date_solved {
            active_days.insert(date);
        }
        match record.difficulty {
            Some(Difficulty::Easy) => breakdown.easy += 1,
            Some(Difficulty::Medium) => breakdown.medium += 1,
            Some(Difficulty::Hard) => breakdown.hard += 1,
            None => {}
        }
        total_time_minutes += u64::from(record.time_taken_min.unwrap_or(0));
    }

    BasicStats {
        total_problems: records.len(),
        retry_count,
        total_active_days: active_days.len(),
        difficulty_breakdown: breakdown,
        most_used_tags: most_used_tags(records, TOP_TAG_LIMIT),
        total_time_minutes,
    }
}

/// Tag frequencies, highest first; equal counts keep first-seen order.
pub fn most_used_tags(records: &[PracticeRecord], limit: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tag in records.iter().flat_map(|r| r.tags.iter()) {
        match index.get(tag.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(tag.as_str(), counts.len());
                counts.push(TagCount { tag: tag.clone(), count: 1 });
            }
        }
    }

    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_basic_counts() {
        let records = vec![
            PracticeRecord::new("1", "u", "A").with_difficulty(Difficulty::Easy).solved_on(day(1)).flagged_for_retry(true),
            PracticeRecord::new("2", "u", "B").with_difficulty(Difficulty::Hard).solved_on(day(1)),
            PracticeRecord::new("3", "u", "C").with_difficulty(Difficulty::Hard).solved_on(day(2)).flagged_for_retry(true),
            PracticeRecord::new("4", "u", "D"),
        ];
        let stats = compute_basic_stats(&records);
        assert_eq!(stats.total_problems, 4);
        assert_eq!(stats.retry_count, 2);
        assert_eq!(stats.total_active_days, 2);
        assert_eq!(stats.difficulty_breakdown, DifficultyBreakdown { easy: 1, medium: 0, hard: 2 });
    }

    #[test]
    fn test_undated_records_still_counted() {
        let records = vec![
            PracticeRecord::new("1", "u", "A"),
            PracticeRecord::new("2", "u", "B"),
        ];
        let stats = compute_basic_stats(&records);
        assert_eq!(stats.total_problems, 2);
        assert_eq!(stats.total_active_days, 0);
    }

    #[test]
    fn test_top_tags_ties_keep_first_seen() {
        let records = vec![
            PracticeRecord::new("1", "u", "A").with_tags(["DP", "Array"]),
            PracticeRecord::new("2", "u", "B").with_tags(["Graph", "Array"]),
            PracticeRecord::new("3", "u", "C").with_tags(["BFS", "Graph", "Stack", "Queue", "Heap"]),
        ];
        let tags = most_used_tags(&records, 5);
        let names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(names, vec!["Array", "Graph", "DP", "BFS", "Stack"]);
        assert_eq!(tags[0].count, 2);
    }

    #[test]
    fn test_total_time_minutes() {
        let mut a = PracticeRecord::new("1", "u", "A");
        a.time_taken_min = Some(25);
        let b = PracticeRecord::new("2", "u", "B");
        assert_eq!(compute_basic_stats(&[a, b]).total_time_minutes, 25);
    }
}
