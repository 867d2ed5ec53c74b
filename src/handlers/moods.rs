use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::{
    normalize_category, normalize_note, CreateMoodRequest, MoodEntry, UpdateMoodRequest,
};
use crate::models::timestamp;
use crate::services::goal_progress::sync_after_change;
use crate::services::mood_stats::{summarize, MoodSummary};
use crate::store::{self, decode_all, encode, Collection, Fields, Query};
use crate::AppState;

async fn fetch_owned(state: &AppState, uid: &str, id: &str) -> AppResult<MoodEntry> {
    store::get_owned::<MoodEntry>(state.store.as_ref(), Collection::Moods, id, uid)
        .await?
        .ok_or(AppError::NotFound("Mood entry not found".into()))
}

async fn fetch_history(state: &AppState, uid: &str) -> AppResult<Vec<MoodEntry>> {
    let docs = state
        .store
        .list(
            Collection::Moods,
            &Query::owned_by(uid).order_by_desc("timestamp"),
        )
        .await?;
    Ok(decode_all(Collection::Moods, docs))
}

/// History: the caller's entries, newest first.
pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    Ok(Json(fetch_history(&state, &auth_user.uid).await?))
}

pub async fn get_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<String>,
) -> AppResult<Json<MoodEntry>> {
    Ok(Json(fetch_owned(&state, &auth_user.uid, &mood_id).await?))
}

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()?;

    let mut entry = MoodEntry {
        id: String::new(),
        user_id: auth_user.uid.clone(),
        mood_level: body.mood,
        category: normalize_category(body.category.as_deref()),
        note: normalize_note(body.note.as_deref()),
        timestamp: body.timestamp.unwrap_or_else(Utc::now),
    };
    entry.id = state
        .store
        .create(Collection::Moods, encode(&entry)?)
        .await?;

    tracing::info!(user_id = %auth_user.uid, mood_id = %entry.id, "Mood entry saved");
    sync_after_change(state.store.as_ref(), &auth_user.uid).await;

    Ok(Json(entry))
}

/// Full-record edit. Fields left out of the body keep their stored value.
pub async fn update_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<String>,
    Json(body): Json<UpdateMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()?;
    if body.is_empty() {
        return Err(AppError::Validation("Nothing to update".into()));
    }

    fetch_owned(&state, &auth_user.uid, &mood_id).await?;

    let mut patch = Fields::new();
    if let Some(mood) = body.mood {
        patch.insert("mood".into(), json!(mood));
    }
    if let Some(category) = body.category.as_deref() {
        patch.insert("category".into(), json!(normalize_category(Some(category))));
    }
    if let Some(note) = body.note.as_deref() {
        patch.insert("note".into(), json!(normalize_note(Some(note))));
    }
    if let Some(ts) = body.timestamp {
        patch.insert("timestamp".into(), json!(timestamp::format(&ts)));
    }

    state
        .store
        .update(Collection::Moods, &mood_id, patch)
        .await?;
    let updated = fetch_owned(&state, &auth_user.uid, &mood_id).await?;

    tracing::info!(user_id = %auth_user.uid, mood_id = %mood_id, "Mood entry updated");
    sync_after_change(state.store.as_ref(), &auth_user.uid).await;

    Ok(Json(updated))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    fetch_owned(&state, &auth_user.uid, &mood_id).await?;

    if !state.store.delete(Collection::Moods, &mood_id).await? {
        return Err(AppError::NotFound("Mood entry not found".into()));
    }

    tracing::info!(user_id = %auth_user.uid, mood_id = %mood_id, "Mood entry deleted");
    sync_after_change(state.store.as_ref(), &auth_user.uid).await;

    Ok(Json(json!({ "deleted": true, "id": mood_id })))
}

/// Home screen data: average, advice and the chart series.
pub async fn mood_summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MoodSummary>> {
    let entries = fetch_history(&state, &auth_user.uid).await?;
    Ok(Json(summarize(&entries)))
}
