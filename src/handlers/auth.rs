use axum::{Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::models::user::UserProfile;

/// The signed-in user, for the greeting on the home screen.
pub async fn me(Extension(auth_user): Extension<AuthUser>) -> Json<UserProfile> {
    Json(auth_user.into())
}
