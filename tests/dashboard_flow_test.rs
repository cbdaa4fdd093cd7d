use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use leetspace_lib::config::EngineConfig;
use leetspace_lib::dashboard::DashboardQuery;
use leetspace_lib::error::LeetspaceError;
use leetspace_lib::records::store::InMemoryRecordStore;
use leetspace_lib::records::{Difficulty, PracticeRecord};
use leetspace_lib::revision::lock::{DailyLockStore, InMemoryLockStore, LockKey, RevisionLock};
use leetspace_lib::routes;
use leetspace_lib::state::app::AppState;
use leetspace_lib::temporal::{day_index, Clock, FixedClock};
use std::sync::atomic::{AtomicI64, Ordering};

/// First date on or after 2025-06-01 whose day index is a multiple of 4.
fn aligned_today() -> NaiveDate {
    let mut date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    while day_index(date) % 4 != 0 {
        date += Duration::days(1);
    }
    date
}

fn four_retry_records(owner: &str, today: NaiveDate) -> Vec<PracticeRecord> {
    let specs = [
        ("p1", "Two Sum", Difficulty::Easy, 10, "Array"),
        ("p2", "Group Anagrams", Difficulty::Medium, 5, "Hashmap"),
        ("p3", "Word Ladder", Difficulty::Hard, 2, "BFS"),
        ("p4", "Subsets", Difficulty::Medium, 1, "Backtracking"),
    ];
    specs
        .iter()
        .map(|(id, title, difficulty, days_ago, tag)| {
            PracticeRecord::new(*id, owner, *title)
                .with_difficulty(*difficulty)
                .with_tags([*tag])
                .solved_on(today - Duration::days(*days_ago))
                .flagged_for_retry(true)
        })
        .collect()
}

fn state_with(records: Vec<PracticeRecord>, today: NaiveDate, allow_dev_overrides: bool) -> AppState {
    let config = EngineConfig {
        allow_dev_overrides,
        ..EngineConfig::default()
    };
    AppState::in_memory(Arc::new(FixedClock::on(today)), config)
        .with_records(Arc::new(InMemoryRecordStore::with_records(records)))
}

#[tokio::test]
async fn test_four_record_rotation() {
    let today = aligned_today();
    let state = state_with(four_retry_records("alice", today), today, false);

    let response = routes::get_dashboard(&state, "alice", DashboardQuery::default()).await.unwrap();

    assert!(response.weaknesses.is_empty());
    assert_eq!(response.activity_heatmap.len(), 366);
    assert_eq!(response.activity_heatmap.iter().filter(|d| d.count > 0).count(), 4);

    let pick = response.todays_revision.expect("unlocked day has a pick");
    assert_eq!(pick.id, "p1");
    assert_eq!(pick.queue_size, 4);
    assert_eq!(pick.queue_position, 0);
    assert_eq!(pick.priority_score, 10);
    assert!(!response.todays_revision_locked);
}

#[tokio::test]
async fn test_consecutive_day_indices_walk_the_queue() {
    let today = aligned_today();
    let state = state_with(four_retry_records("alice", today), today, true);
    let mut picks = Vec::new();
    for offset in 0..5 {
        let query = DashboardQuery { day_offset: Some(offset), ignore_lock: false };
        let response = routes::get_dashboard(&state, "alice", query).await.unwrap();
        picks.push(response.todays_revision.unwrap().id);
    }
    assert_eq!(picks, vec!["p1", "p2", "p3", "p4", "p1"]);
}

#[tokio::test]
async fn test_lock_hides_then_unlock_restores() {
    let today = aligned_today();
    let state = state_with(four_retry_records("alice", today), today, false);

    let before = routes::get_dashboard(&state, "alice", DashboardQuery::default()).await.unwrap();

    let status = routes::lock_today(&state, "alice").await.unwrap();
    assert!(status.locked);
    assert_eq!(status.date, today.format("%Y-%m-%d").to_string());

    let locked = routes::get_dashboard(&state, "alice", DashboardQuery::default()).await.unwrap();
    assert!(locked.todays_revision.is_none());
    assert!(locked.todays_revision_locked);
    assert_eq!(locked.basic_stats, before.basic_stats);

    let status = routes::unlock_today(&state, "alice").await.unwrap();
    assert!(!status.locked);

    let after = routes::get_dashboard(&state, "alice", DashboardQuery::default()).await.unwrap();
    assert_eq!(after.todays_revision, before.todays_revision);
    assert!(!after.todays_revision_locked);
}

#[tokio::test]
async fn test_lock_twice_keeps_one_lock() {
    let today = aligned_today();
    let locks = Arc::new(InMemoryLockStore::new());
    let state = state_with(Vec::new(), today, false).with_locks(locks.clone());

    routes::lock_today(&state, "alice").await.unwrap();
    routes::lock_today(&state, "alice").await.unwrap();
    assert_eq!(locks.len(), 1);

    // Unlocking twice is fine too.
    routes::unlock_today(&state, "alice").await.unwrap();
    routes::unlock_today(&state, "alice").await.unwrap();
    assert!(locks.is_empty());
}

#[tokio::test]
async fn test_locks_are_per_owner() {
    let today = aligned_today();
    let mut records = four_retry_records("alice", today);
    records.extend(four_retry_records("bob", today));
    let state = state_with(records, today, false);

    routes::lock_today(&state, "alice").await.unwrap();

    let alice = routes::get_dashboard(&state, "alice", DashboardQuery::default()).await.unwrap();
    let bob = routes::get_dashboard(&state, "bob", DashboardQuery::default()).await.unwrap();
    assert!(alice.todays_revision_locked);
    assert!(!bob.todays_revision_locked);
    assert!(bob.todays_revision.is_some());
}

#[tokio::test]
async fn test_empty_owner_gets_canonical_response() {
    let state = state_with(Vec::new(), aligned_today(), false);
    let response = routes::get_dashboard(&state, "nobody", DashboardQuery::default()).await.unwrap();
    assert_eq!(response.basic_stats.total_problems, 0);
    assert!(response.todays_revision.is_none());
    assert!(response.activity_heatmap.is_empty());
    assert!(response.recent_activity.is_empty());
}

#[tokio::test]
async fn test_missing_owner_is_rejected() {
    let state = state_with(Vec::new(), aligned_today(), false);
    let err = routes::get_dashboard(&state, "  ", DashboardQuery::default()).await.unwrap_err();
    assert_eq!(err.stage, "identity");
    assert_eq!(state.metrics.snapshot().errors_total, 1);
}

#[tokio::test]
async fn test_overrides_ignored_unless_enabled() {
    let today = aligned_today();
    let query = DashboardQuery { day_offset: Some(1), ignore_lock: true };

    let gated = state_with(four_retry_records("alice", today), today, false);
    routes::lock_today(&gated, "alice").await.unwrap();
    let response = routes::get_dashboard(&gated, "alice", query).await.unwrap();
    assert!(response.todays_revision.is_none());
    assert_eq!(gated.metrics.snapshot().overrides_applied, 0);

    let open = state_with(four_retry_records("alice", today), today, true);
    routes::lock_today(&open, "alice").await.unwrap();
    let response = routes::get_dashboard(&open, "alice", query).await.unwrap();
    let pick = response.todays_revision.expect("bypass shows the pick");
    assert_eq!(pick.queue_position, 1);
    assert_eq!(pick.id, "p2");
    assert!(response.todays_revision_locked);
    assert_eq!(open.metrics.snapshot().overrides_applied, 1);

    // Bypassing never clears the stored lock.
    let plain = routes::get_dashboard(&open, "alice", DashboardQuery::default()).await.unwrap();
    assert!(plain.todays_revision.is_none());
}

struct FailingLockStore;

#[async_trait]
impl DailyLockStore for FailingLockStore {
    async fn lock(&self, _key: &LockKey, _locked_at: DateTime<Utc>) -> Result<RevisionLock, LeetspaceError> {
        Err(LeetspaceError::new("lock store offline", "lock_store"))
    }

    async fn unlock(&self, _key: &LockKey) -> Result<bool, LeetspaceError> {
        Err(LeetspaceError::new("lock store offline", "lock_store"))
    }

    async fn get(&self, _key: &LockKey) -> Result<Option<RevisionLock>, LeetspaceError> {
        Err(LeetspaceError::new("lock store offline", "lock_store"))
    }
}

#[tokio::test]
async fn test_lock_store_failure_fails_the_read() {
    let today = aligned_today();
    let state = state_with(four_retry_records("alice", today), today, false)
        .with_locks(Arc::new(FailingLockStore));

    let err = routes::get_dashboard(&state, "alice", DashboardQuery::default()).await.unwrap_err();
    assert_eq!(err.stage, "lock_store");
    assert!(err.context.unwrap().contains("alice"));

    assert!(routes::lock_today(&state, "alice").await.is_err());
    assert_eq!(state.metrics.snapshot().errors_total, 2);
}

/// Advances two seconds on every read, starting one second before midnight.
struct SteppingClock {
    start: DateTime<Utc>,
    reads: AtomicI64,
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let reads = self.reads.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(reads * 2)
    }
}

#[tokio::test]
async fn test_lock_timestamp_matches_lock_date_at_midnight() {
    let today = aligned_today();
    let just_before_midnight = (today + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap().and_utc()
        - Duration::seconds(1);
    let clock = Arc::new(SteppingClock { start: just_before_midnight, reads: AtomicI64::new(0) });
    let locks = Arc::new(InMemoryLockStore::new());
    let state = AppState::in_memory(clock, EngineConfig::default()).with_locks(locks.clone());

    let status = routes::lock_today(&state, "alice").await.unwrap();
    assert_eq!(status.date, today.format("%Y-%m-%d").to_string());

    let lock = locks.get(&LockKey::new("alice", today)).await.unwrap().expect("lock stored under its date");
    assert_eq!(lock.locked_at.date_naive(), lock.date);
}
