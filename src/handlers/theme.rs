use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::models::theme::ThemeResponse;
use crate::AppState;

pub async fn get_theme(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Json<ThemeResponse> {
    Json(state.themes.mode(&auth_user.uid).await.into())
}

pub async fn toggle_theme(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Json<ThemeResponse> {
    let mode = state.themes.toggle(&auth_user.uid).await;
    tracing::debug!(user_id = %auth_user.uid, ?mode, "Theme toggled");
    Json(mode.into())
}
