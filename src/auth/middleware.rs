use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::models::user::UserProfile;
use crate::AppState;

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl From<UserProfile> for AuthUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            uid: profile.uid,
            display_name: profile.display_name,
            email: profile.email,
        }
    }
}

impl From<AuthUser> for UserProfile {
    fn from(user: AuthUser) -> Self {
        Self {
            uid: user.uid,
            display_name: user.display_name,
            email: user.email,
        }
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(bearer.token(), &state.config)?;
    let profile = UserProfile::from(token_data.claims);
    if profile.uid.is_empty() {
        return Err(AppError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser::from(profile));
    Ok(next.run(req).await)
}
