use serde::{Serialize, Deserialize};
use crate::analytics::{summarize_spaced_repetition, SpacedRepetitionSummary};
use crate::dashboard::{build_dashboard, DashboardQuery, DashboardResponse};
use crate::error::LeetspaceError;
use crate::records::PracticeRecord;
use crate::revision::lock::LockKey;
use crate::revision::review::{apply_review, skip_review};
use crate::seed;
use crate::state::app::AppState;

/// Result of a lock or unlock call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    pub locked: bool,
    pub date: String,
}

/// The identity provider hands us the owner; a blank one means the caller is
/// not authenticated.
fn require_owner(owner: &str) -> Result<&str, LeetspaceError> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(LeetspaceError::new("Missing authenticated owner", "identity"));
    }
    Ok(owner)
}

fn observe<T>(state: &AppState, route: &'static str, result: Result<T, LeetspaceError>) -> Result<T, LeetspaceError> {
    if let Err(ref e) = result {
        state.metrics.record_error();
        tracing::error!(route = route, stage = %e.stage, error = %e, "Request failed");
    }
    result
}

pub async fn get_dashboard(
    state: &AppState,
    owner: &str,
    query: DashboardQuery,
) -> Result<DashboardResponse, LeetspaceError> {
    let result = async {
        let owner = require_owner(owner)?;
        let response = build_dashboard(state, owner, query).await?;
        state.metrics.record_dashboard(response.todays_revision_locked);
        Ok::<_, LeetspaceError>(response)
    }
    .await;
    observe(state, "dashboard", result)
}

/// Commit today's pick. Repeating the call keeps a single lock.
pub async fn lock_today(state: &AppState, owner: &str) -> Result<LockStatus, LeetspaceError> {
    let result = async {
        let owner = require_owner(owner)?;
        // One clock read, so `locked_at` always falls on the key's date.
        let now = state.clock.now();
        let key = LockKey::new(owner, now.date_naive());
        let lock = state.locks.lock(&key, now).await?;
        state.metrics.record_lock();
        tracing::info!(owner = %owner, date = %key.date_key(), locked_at = %lock.locked_at, "Revision locked");
        Ok::<_, LeetspaceError>(LockStatus { locked: true, date: key.date_key() })
    }
    .await;
    observe(state, "lock_today", result)
}

/// Drop today's lock. Unlocking an unlocked day is not an error.
pub async fn unlock_today(state: &AppState, owner: &str) -> Result<LockStatus, LeetspaceError> {
    let result = async {
        let owner = require_owner(owner)?;
        let key = LockKey::new(owner, state.clock.today());
        let removed = state.locks.unlock(&key).await?;
        state.metrics.record_unlock();
        tracing::info!(owner = %owner, date = %key.date_key(), removed = removed, "Revision unlocked");
        Ok::<_, LeetspaceError>(LockStatus { locked: false, date: key.date_key() })
    }
    .await;
    observe(state, "unlock_today", result)
}

pub async fn get_spaced_repetition(
    state: &AppState,
    owner: &str,
) -> Result<SpacedRepetitionSummary, LeetspaceError> {
    let result = async {
        let owner = require_owner(owner)?;
        let records = state.records.load_records(owner).await?;
        Ok::<_, LeetspaceError>(summarize_spaced_repetition(&records, state.clock.now()))
    }
    .await;
    observe(state, "spaced_repetition", result)
}

async fn find_record(state: &AppState, owner: &str, record_id: &str) -> Result<PracticeRecord, LeetspaceError> {
    state
        .records
        .load_records(owner)
        .await?
        .into_iter()
        .find(|r| r.id == record_id)
        .ok_or_else(|| LeetspaceError::not_found(format!("record {}", record_id)))
}

/// Grade a review (quality 0-5) and store the new review state.
pub async fn review_problem(
    state: &AppState,
    owner: &str,
    record_id: &str,
    quality: u8,
) -> Result<PracticeRecord, LeetspaceError> {
    let result = async {
        let owner = require_owner(owner)?;
        let record = find_record(state, owner, record_id).await?;
        let next = apply_review(record.spaced_repetition.as_ref(), quality, state.clock.now())?;
        let updated = state.records.update_spaced_repetition(owner, record_id, next).await?;
        state.metrics.record_review();
        tracing::info!(owner = %owner, record_id = %record_id, quality = quality, "Review recorded");
        Ok::<_, LeetspaceError>(updated)
    }
    .await;
    observe(state, "review", result)
}

pub async fn skip_revision(
    state: &AppState,
    owner: &str,
    record_id: &str,
) -> Result<PracticeRecord, LeetspaceError> {
    let result = async {
        let owner = require_owner(owner)?;
        let record = find_record(state, owner, record_id).await?;
        let next = skip_review(record.spaced_repetition.as_ref(), state.clock.now());
        let updated = state.records.update_spaced_repetition(owner, record_id, next).await?;
        state.metrics.record_review();
        tracing::info!(owner = %owner, record_id = %record_id, "Revision skipped");
        Ok::<_, LeetspaceError>(updated)
    }
    .await;
    observe(state, "skip", result)
}

/// Insert deterministic demo records for `owner`. Returns how many were new.
pub async fn seed_demo_records(
    state: &AppState,
    owner: &str,
    count: usize,
    seed_value: u64,
) -> Result<usize, LeetspaceError> {
    let result = async {
        let owner = require_owner(owner)?;
        let records = seed::generate_records(owner, count, seed_value, state.clock.today());
        let inserted = state.records.insert_records(owner, records).await?;
        tracing::info!(owner = %owner, requested = count, inserted = inserted, "Demo records seeded");
        Ok::<_, LeetspaceError>(inserted)
    }
    .await;
    observe(state, "seed", result)
}
