use std::collections::HashMap;
use chrono::{Duration, NaiveDate};
use serde::{Serialize, Deserialize};
use crate::records::PracticeRecord;

/// Days before today covered by the heatmap; today is included on top.
pub const HEATMAP_WINDOW_DAYS: i64 = 365;
pub const MAX_LEVEL: usize = 4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub count: usize,
    pub level: usize,
}

/// Dense daily activity series from `today - 365` through `today`.
pub fn generate_activity_heatmap(records: &[PracticeRecord], today: NaiveDate) -> Vec<HeatmapDay> {
    let start = today - Duration::days(HEATMAP_WINDOW_DAYS);

    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for date in records.iter().filter_map(|r| r.date_solved) {
        if date >= start && date <= today {
            *counts.entry(date).or_insert(0) += 1;
        }
    }

    start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| {
            let count = counts.get(&date).copied().unwrap_or(0);
            HeatmapDay {
                date,
                count,
                level: count.min(MAX_LEVEL),
            }
        })
        .collect()
}
