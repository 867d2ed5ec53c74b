//! Verification of identity-provider tokens.
//!
//! Sign-in happens at the identity provider; this service only checks the
//! HS256 bearer token it hands out and reads the user from its claims.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::user::UserProfile;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The provider's uid; the partition key for all user data.
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl From<Claims> for UserProfile {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            display_name: claims.name.filter(|n| !n.is_empty()),
            email: claims.email.filter(|e| !e.is_empty()),
        }
    }
}

/// Mint a token the way the identity provider does. Used by tests and local tooling.
pub fn create_identity_token(profile: &UserProfile, ttl_secs: i64, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: profile.uid.clone(),
        name: profile.display_name.clone(),
        email: profile.email.clone(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
        iss: config.identity_issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.identity_jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create identity token: {}", e)))
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    if let Some(issuer) = &config.identity_issuer {
        validation.set_issuer(&[issuer]);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.identity_jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected identity token");
        AppError::Unauthorized
    })
}
