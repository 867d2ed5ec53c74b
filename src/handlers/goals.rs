use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::goal::{CreateGoalRequest, Goal, ProgressSync, DEFAULT_TARGET_MOOD};
use crate::models::mood::normalize_note;
use crate::services::goal_progress::{insert_goal, sync_goal_progress};
use crate::store::{self, Collection};
use crate::AppState;

/// Goals with freshly recomputed progress.
pub async fn list_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Goal>>> {
    let sync = sync_goal_progress(state.store.as_ref(), &auth_user.uid).await?;
    Ok(Json(sync.goals))
}

pub async fn sync_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ProgressSync>> {
    let sync = sync_goal_progress(state.store.as_ref(), &auth_user.uid).await?;
    Ok(Json(sync))
}

pub async fn get_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<String>,
) -> AppResult<Json<Goal>> {
    let goal = store::get_owned::<Goal>(
        state.store.as_ref(),
        Collection::Goals,
        &goal_id,
        &auth_user.uid,
    )
    .await?
    .ok_or(AppError::NotFound("Goal not found".into()))?;

    Ok(Json(goal))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateGoalRequest>,
) -> AppResult<Json<Goal>> {
    body.validate()?;
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Goal title is required".into()));
    }

    let goal = insert_goal(
        state.store.as_ref(),
        Goal {
            id: String::new(),
            user_id: auth_user.uid.clone(),
            title: title.to_string(),
            description: normalize_note(body.description.as_deref()),
            target_mood: body.target_mood.unwrap_or(DEFAULT_TARGET_MOOD),
            progress: 0.0,
            created_at: Utc::now(),
        },
    )
    .await?;
    tracing::info!(user_id = %auth_user.uid, goal_id = %goal.id, "Goal created");

    // Existing entries may already count toward the new goal.
    let goal = match sync_goal_progress(state.store.as_ref(), &auth_user.uid).await {
        Ok(sync) => sync
            .goals
            .into_iter()
            .find(|g| g.id == goal.id)
            .unwrap_or(goal),
        Err(e) => {
            tracing::warn!(user_id = %auth_user.uid, error = %e, "Goal progress sync failed after change");
            goal
        }
    };

    Ok(Json(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    store::get_owned::<Goal>(
        state.store.as_ref(),
        Collection::Goals,
        &goal_id,
        &auth_user.uid,
    )
    .await?
    .ok_or(AppError::NotFound("Goal not found".into()))?;

    if !state.store.delete(Collection::Goals, &goal_id).await? {
        return Err(AppError::NotFound("Goal not found".into()));
    }

    tracing::info!(user_id = %auth_user.uid, goal_id = %goal_id, "Goal deleted");
    Ok(Json(serde_json::json!({ "deleted": true, "id": goal_id })))
}
