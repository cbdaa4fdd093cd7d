use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::analytics::{compute_analytics, BasicStats, HeatmapDay, RecentActivityEntry, WeaknessEntry};
use crate::error::LeetspaceError;
use crate::records::PracticeRecord;
use crate::revision::lock::LockKey;
use crate::revision::{suggest_todays_revision, RevisionSuggestion};
use crate::state::app::AppState;

/// Test/dev-only knobs for one dashboard read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Shift applied to the rotation's day index.
    #[serde(default)]
    pub day_offset: Option<i64>,
    /// Show the suggestion even if today is locked. Never persisted.
    #[serde(default)]
    pub ignore_lock: bool,
}

/// The query after the config gate: what this read will actually honour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub day_offset: i64,
    pub ignore_lock: bool,
}

impl ResolvedQuery {
    pub fn is_override(&self) -> bool {
        self.day_offset != 0 || self.ignore_lock
    }
}

impl DashboardQuery {
    pub fn resolve(&self, allow_dev_overrides: bool) -> ResolvedQuery {
        let requested = ResolvedQuery {
            day_offset: self.day_offset.unwrap_or(0),
            ignore_lock: self.ignore_lock,
        };
        if allow_dev_overrides || !requested.is_override() {
            return requested;
        }
        tracing::warn!(
            day_offset = requested.day_offset,
            ignore_lock = requested.ignore_lock,
            "Dev overrides are disabled, ignoring"
        );
        ResolvedQuery::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DashboardResponse {
    pub basic_stats: BasicStats,
    pub weaknesses: Vec<WeaknessEntry>,
    pub todays_revision: Option<RevisionSuggestion>,
    pub todays_revision_locked: bool,
    pub activity_heatmap: Vec<HeatmapDay>,
    pub recent_activity: Vec<RecentActivityEntry>,
}

impl DashboardResponse {
    /// The canonical response for an owner with no records.
    pub fn empty(locked: bool) -> Self {
        DashboardResponse {
            basic_stats: BasicStats::default(),
            weaknesses: Vec::new(),
            todays_revision: None,
            todays_revision_locked: locked,
            activity_heatmap: Vec::new(),
            recent_activity: Vec::new(),
        }
    }
}

/// Compose the dashboard from an already loaded record set and lock state.
/// The scheduler only runs when its answer will be shown.
pub fn assemble_dashboard(
    records: &[PracticeRecord],
    today: NaiveDate,
    locked: bool,
    query: ResolvedQuery,
) -> DashboardResponse {
    if records.is_empty() {
        return DashboardResponse::empty(locked);
    }

    let analytics = compute_analytics(records, today);
    let todays_revision = if locked && !query.ignore_lock {
        None
    } else {
        suggest_todays_revision(records, today, query.day_offset)
    };

    DashboardResponse {
        basic_stats: analytics.basic_stats,
        weaknesses: analytics.weaknesses,
        todays_revision,
        todays_revision_locked: locked,
        activity_heatmap: analytics.activity_heatmap,
        recent_activity: analytics.recent_activity,
    }
}

/// Load, check the lock, assemble. Any store failure fails the whole read.
pub async fn build_dashboard(
    state: &AppState,
    owner: &str,
    query: DashboardQuery,
) -> Result<DashboardResponse, LeetspaceError> {
    let resolved = query.resolve(state.config.allow_dev_overrides);
    let today = state.clock.today();

    let records = state.records.load_records(owner).await
        .map_err(|e| e.with_context(format!("loading records for {}", owner)))?;

    let key = LockKey::new(owner, today);
    let locked = state.locks.is_locked(&key).await
        .map_err(|e| e.with_context(format!("checking lock {}", key)))?;

    if resolved.is_override() {
        state.metrics.record_override();
    }

    let response = assemble_dashboard(&records, today, locked, resolved);
    tracing::info!(
        owner = %owner,
        date = %key.date_key(),
        record_count = records.len(),
        locked = locked,
        has_suggestion = response.todays_revision.is_some(),
        "Dashboard assembled"
    );
    Ok(response)
}
