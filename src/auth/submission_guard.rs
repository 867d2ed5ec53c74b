use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::AppState;

/// Largest body the guard will buffer to fingerprint a submission.
const MAX_BODY_BYTES: usize = 64 * 1024;
/// Prune expired keys once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Remembers recent submissions so a double-tapped "save" is only applied once.
/// In-memory, per instance.
#[derive(Clone)]
pub struct SubmissionGuard {
    seen: Arc<Mutex<HashMap<String, Instant>>>,
    window: Duration,
}

impl SubmissionGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            seen: Arc::new(Mutex::new(HashMap::new())),
            window,
        }
    }

    /// Record `key`. Returns Err(retry_after) if it was already seen within the window.
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        let mut seen = self.seen.lock().await;
        let now = Instant::now();

        if seen.len() > PRUNE_THRESHOLD {
            let window = self.window;
            seen.retain(|_, at| now.duration_since(*at) < window);
        }

        if let Some(at) = seen.get(key) {
            let elapsed = now.duration_since(*at);
            if elapsed < self.window {
                return Err(self.window - elapsed);
            }
        }

        seen.insert(key.to_string(), now);
        Ok(())
    }

    /// Drop `key` so the same submission may be retried at once.
    pub async fn forget(&self, key: &str) {
        self.seen.lock().await.remove(key);
    }
}

/// SHA-256 over everything that makes two submissions "the same".
pub fn fingerprint(uid: &str, method: &Method, path: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uid.as_bytes());
    hasher.update([0]);
    hasher.update(method.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(path.as_bytes());
    hasher.update([0]);
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}

/// Rejects a repeat of the same mutating request from the same user within
/// the guard window. Must run inside `require_auth`.
pub async fn reject_duplicate_submissions(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(req).await);
    }

    let uid = req
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.uid.clone())
        .ok_or(AppError::Unauthorized)?;
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let explicit_key = req
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (key, req) = match explicit_key {
        Some(k) => (format!("{uid}:{method}:{path}:{k}"), req),
        None => {
            let (parts, body) = req.into_parts();
            let bytes = body::to_bytes(body, MAX_BODY_BYTES)
                .await
                .map_err(|_| AppError::Validation("Request body too large".into()))?;
            let key = fingerprint(&uid, &method, &path, &bytes);
            (key, Request::from_parts(parts, Body::from(bytes)))
        }
    };

    if let Err(retry_after) = state.submissions.check(&key).await {
        tracing::warn!(
            user_id = %uid,
            path = %path,
            retry_after_ms = retry_after.as_millis() as u64,
            "Duplicate submission rejected"
        );
        return Err(AppError::Conflict("Duplicate submission".into()));
    }

    let response = next.run(req).await;
    if !response.status().is_success() {
        state.submissions.forget(&key).await;
    }
    Ok(response)
}
