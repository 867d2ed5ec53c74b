use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::category::{category_options, Category, CreateCategoryRequest};
use crate::store::{self, decode_all, encode, Collection, Query};
use crate::AppState;

async fn fetch_categories(state: &AppState, uid: &str) -> AppResult<Vec<Category>> {
    let docs = state
        .store
        .list(
            Collection::Categories,
            &Query::owned_by(uid).order_by_asc("createdAt"),
        )
        .await?;
    Ok(decode_all(Collection::Categories, docs))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(fetch_categories(&state, &auth_user.uid).await?))
}

/// Names for the mood form's category picker.
pub async fn list_category_options(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<String>>> {
    let categories = fetch_categories(&state, &auth_user.uid).await?;
    Ok(Json(category_options(&categories)))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCategoryRequest>,
) -> AppResult<Json<Category>> {
    body.validate()?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }

    let mut category = Category {
        id: String::new(),
        user_id: auth_user.uid.clone(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    category.id = state
        .store
        .create(Collection::Categories, encode(&category)?)
        .await?;

    Ok(Json(category))
}

/// Mood entries keep whatever category name they were saved with.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(category_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    store::get_owned::<Category>(
        state.store.as_ref(),
        Collection::Categories,
        &category_id,
        &auth_user.uid,
    )
    .await?
    .ok_or(AppError::NotFound("Category not found".into()))?;

    if !state
        .store
        .delete(Collection::Categories, &category_id)
        .await?
    {
        return Err(AppError::NotFound("Category not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true, "id": category_id })))
}
