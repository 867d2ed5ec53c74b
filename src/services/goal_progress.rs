//! Goal progress calculator.
//!
//! A goal's progress is the share of the owner's mood entries at or above
//! the goal's target mood, counted against a fixed window of
//! [`FULL_PROGRESS_ENTRIES`] entries and capped at 100.
//!
//! Progress is recomputed from scratch on every call and written back one
//! goal at a time. The writes are not transactional: when one fails the
//! goal keeps its previous value and the remaining goals are still written.

use serde_json::json;

use crate::models::goal::{Goal, ProgressSync};
use crate::models::mood::MoodEntry;
use crate::store::{
    decode_all, encode, Collection, DocumentStore, Fields, Query, StoreResult,
};

/// Qualifying entries needed to reach 100%.
pub const FULL_PROGRESS_ENTRIES: usize = 10;

pub fn qualifying_entries(goal: &Goal, entries: &[MoodEntry]) -> usize {
    entries
        .iter()
        .filter(|e| e.user_id == goal.user_id && e.mood_level >= goal.target_mood)
        .count()
}

pub fn compute_progress(goal: &Goal, entries: &[MoodEntry]) -> f64 {
    let matched = qualifying_entries(goal, entries) as f64;
    (matched / FULL_PROGRESS_ENTRIES as f64 * 100.0).min(100.0)
}

/// Recompute and persist progress for every goal owned by `uid`.
///
/// A failed read is returned as an error and nothing is written. A failed
/// write is logged and reported in [`ProgressSync::failed`].
pub async fn sync_goal_progress(store: &dyn DocumentStore, uid: &str) -> StoreResult<ProgressSync> {
    let entries: Vec<MoodEntry> = decode_all(
        Collection::Moods,
        store
            .list(Collection::Moods, &Query::owned_by(uid))
            .await?,
    );
    let goals: Vec<Goal> = decode_all(
        Collection::Goals,
        store
            .list(Collection::Goals, &Query::owned_by(uid).order_by_asc("createdAt"))
            .await?,
    );

    let mut synced = Vec::with_capacity(goals.len());
    let mut failed = Vec::new();

    for mut goal in goals {
        let progress = compute_progress(&goal, &entries);
        match store
            .update(Collection::Goals, &goal.id, progress_patch(progress))
            .await
        {
            Ok(()) => goal.progress = progress,
            Err(e) => {
                tracing::warn!(
                    user_id = %uid,
                    goal_id = %goal.id,
                    error = %e,
                    "Failed to persist goal progress"
                );
                failed.push(goal.id.clone());
            }
        }
        synced.push(goal);
    }

    tracing::debug!(
        user_id = %uid,
        goals = synced.len(),
        failed = failed.len(),
        entries = entries.len(),
        "Goal progress recomputed"
    );

    Ok(ProgressSync {
        goals: synced,
        failed,
    })
}

/// Recompute after a mood or goal mutation that has already succeeded.
/// Failures are logged only; the mutation stands.
pub async fn sync_after_change(store: &dyn DocumentStore, uid: &str) {
    if let Err(e) = sync_goal_progress(store, uid).await {
        tracing::warn!(user_id = %uid, error = %e, "Goal progress sync failed after change");
    }
}

fn progress_patch(progress: f64) -> Fields {
    let mut patch = Fields::new();
    patch.insert("progress".into(), json!(progress));
    patch
}

/// Store a new goal with zero progress and return it with its id.
pub async fn insert_goal(store: &dyn DocumentStore, mut goal: Goal) -> StoreResult<Goal> {
    goal.progress = 0.0;
    goal.id = store.create(Collection::Goals, encode(&goal)?).await?;
    Ok(goal)
}
