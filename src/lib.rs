use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use auth::submission_guard::SubmissionGuard;
use config::Config;
use services::theme::ThemeRegistry;
use store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<Config>,
    pub themes: ThemeRegistry,
    pub submissions: SubmissionGuard,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            themes: ThemeRegistry::new(config.default_theme),
            submissions: SubmissionGuard::new(Duration::from_millis(config.submission_window_ms)),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    // Saves that a double tap would duplicate. Toggles and recomputes repeat on purpose.
    let submission_routes = Router::new()
        .route("/api/moods", post(handlers::moods::create_mood))
        .route("/api/moods/:id", put(handlers::moods::update_mood))
        .route("/api/goals", post(handlers::goals::create_goal))
        .route("/api/categories", post(handlers::categories::create_category))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::submission_guard::reject_duplicate_submissions,
        ));

    // The guard reads `AuthUser`, so auth wraps everything below.
    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        // Moods
        .route("/api/moods", get(handlers::moods::list_moods))
        .route("/api/moods/summary", get(handlers::moods::mood_summary))
        .route("/api/moods/:id", get(handlers::moods::get_mood))
        .route("/api/moods/:id", delete(handlers::moods::delete_mood))
        // Goals
        .route("/api/goals", get(handlers::goals::list_goals))
        .route("/api/goals/sync", post(handlers::goals::sync_goals))
        .route("/api/goals/:id", get(handlers::goals::get_goal))
        .route("/api/goals/:id", delete(handlers::goals::delete_goal))
        // Categories
        .route("/api/categories", get(handlers::categories::list_categories))
        .route(
            "/api/categories/options",
            get(handlers::categories::list_category_options),
        )
        .route(
            "/api/categories/:id",
            delete(handlers::categories::delete_category),
        )
        // Theme
        .route("/api/theme", get(handlers::theme::get_theme))
        .route("/api/theme/toggle", post(handlers::theme::toggle_theme))
        .merge(submission_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins: Vec<axum::http::HeaderValue> = Vec::new();
    match config.frontend_url.parse::<axum::http::HeaderValue>() {
        Ok(origin) => origins.push(origin),
        Err(_) => tracing::warn!(url = %config.frontend_url, "Ignoring invalid FRONTEND_URL"),
    }
    // In dev, also allow LAN access (e.g. the app running on a phone)
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static(auth::submission_guard::IDEMPOTENCY_KEY_HEADER),
        ])
        .allow_credentials(true)
}
