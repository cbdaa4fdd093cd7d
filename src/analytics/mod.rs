pub mod stats;
pub mod weakness;
pub mod heatmap;
pub mod recent;
pub mod spaced;

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::records::PracticeRecord;

pub use stats::{compute_basic_stats, BasicStats, DifficultyBreakdown, TagCount};
pub use weakness::{detect_weaknesses, WeaknessEntry};
pub use heatmap::{generate_activity_heatmap, HeatmapDay};
pub use recent::{recent_activity, RecentActivityEntry};
pub use spaced::{summarize_spaced_repetition, RecentReview, SpacedRepetitionSummary};

/// The four record-set aggregates. Each is a pure function of the records and
/// `today`; none depends on another.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AnalyticsPayload {
    pub basic_stats: BasicStats,
    pub weaknesses: Vec<WeaknessEntry>,
    pub activity_heatmap: Vec<HeatmapDay>,
    pub recent_activity: Vec<RecentActivityEntry>,
}

pub fn compute_analytics(records: &[PracticeRecord], today: NaiveDate) -> AnalyticsPayload {
    AnalyticsPayload {
        basic_stats: compute_basic_stats(records),
        weaknesses: detect_weaknesses(records),
        activity_heatmap: generate_activity_heatmap(records, today),
        recent_activity: recent_activity(records, today),
    }
}
