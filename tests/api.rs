use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use moodtrack_api::auth::jwt::create_identity_token;
use moodtrack_api::config::Config;
use moodtrack_api::models::user::UserProfile;
use moodtrack_api::services::mood_stats::{MAINTAIN_ADVICE, POSITIVE_ADVICE};
use moodtrack_api::store::MemoryStore;
use moodtrack_api::{router, AppState};

const SECRET: &str = "integration-secret";

fn app() -> Router {
    router(AppState::new(
        Arc::new(MemoryStore::new()),
        Config::for_secret(SECRET),
    ))
}

fn token(uid: &str) -> String {
    let profile = UserProfile {
        uid: uid.into(),
        display_name: Some(format!("User {uid}")),
        email: Some(format!("{uid}@example.com")),
    };
    create_identity_token(&profile, 3600, &Config::for_secret(SECRET)).unwrap()
}

struct Call<'a> {
    method: Method,
    uri: &'a str,
    token: Option<String>,
    body: Option<Value>,
    idempotency_key: Option<&'a str>,
}

impl<'a> Call<'a> {
    fn new(method: Method, uri: &'a str) -> Self {
        Self {
            method,
            uri,
            token: None,
            body: None,
            idempotency_key: None,
        }
    }

    fn as_user(mut self, uid: &str) -> Self {
        self.token = Some(token(uid));
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn idempotency_key(mut self, key: &'a str) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    async fn send(self, app: &Router) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(key) = self.idempotency_key {
            builder = builder.header("idempotency-key", key);
        }
        let request = match self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

async fn record_mood(app: &Router, uid: &str, mood: i32, day: u32) -> Value {
    let (status, body) = Call::new(Method::POST, "/api/moods")
        .as_user(uid)
        .json(json!({
            "mood": mood,
            "category": "Work",
            "timestamp": format!("2024-03-{day:02}T10:00:00Z"),
        }))
        .send(app)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = Call::new(Method::GET, "/health").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = Call::new(Method::GET, "/readyz").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["store"], "ok");
}

#[tokio::test]
async fn api_requires_a_valid_token() {
    let app = app();
    let (status, body) = Call::new(Method::GET, "/api/moods").send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 401);

    let mut call = Call::new(Method::GET, "/api/moods");
    call.token = Some("not-a-jwt".into());
    let (status, _) = call.send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_identity_profile() {
    let app = app();
    let (status, body) = Call::new(Method::GET, "/api/me").as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], "u1");
    assert_eq!(body["displayName"], "User u1");
    assert_eq!(body["email"], "u1@example.com");
}

#[tokio::test]
async fn history_is_own_entries_newest_first() {
    let app = app();
    record_mood(&app, "u1", 4, 1).await;
    record_mood(&app, "u1", 9, 3).await;
    record_mood(&app, "u2", 7, 2).await;
    record_mood(&app, "u1", 6, 2).await;

    let (status, body) = Call::new(Method::GET, "/api/moods").as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    let moods: Vec<i64> = entries.iter().map(|e| e["mood"].as_i64().unwrap()).collect();
    assert_eq!(moods, vec![9, 6, 4]);
    assert!(entries.iter().all(|e| e["userId"] == "u1"));
    assert_eq!(entries[0]["timestamp"], "2024-03-03T10:00:00.000Z");
}

#[tokio::test]
async fn mood_defaults_and_validation() {
    let app = app();
    let (status, body) = Call::new(Method::POST, "/api/moods")
        .as_user("u1")
        .json(json!({ "mood": 5, "note": "   " }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "General");
    assert!(body["note"].is_null());
    assert!(body["timestamp"].is_string());

    let (status, _) = Call::new(Method::POST, "/api/moods")
        .as_user("u1")
        .json(json!({ "mood": 0 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = Call::new(Method::POST, "/api/moods")
        .as_user("u1")
        .json(json!({ "mood": 11 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn edit_merges_fields_and_respects_ownership() {
    let app = app();
    let entry = record_mood(&app, "u1", 3, 5).await;
    let uri = format!("/api/moods/{}", entry["id"].as_str().unwrap());

    let (status, body) = Call::new(Method::PUT, &uri)
        .as_user("u1")
        .json(json!({ "mood": 8, "note": "better after lunch" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mood"], 8);
    assert_eq!(body["note"], "better after lunch");
    assert_eq!(body["category"], "Work");
    assert_eq!(body["timestamp"], "2024-03-05T10:00:00.000Z");

    let (status, _) = Call::new(Method::GET, &uri).as_user("u2").send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = Call::new(Method::PUT, &uri)
        .as_user("u2")
        .json(json!({ "mood": 1 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = Call::new(Method::DELETE, &uri).as_user("u2").send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = Call::new(Method::DELETE, &uri).as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
    let (status, _) = Call::new(Method::GET, &uri).as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn goal_progress_caps_at_one_hundred() {
    let app = app();
    let (status, goal) = Call::new(Method::POST, "/api/goals")
        .as_user("u1")
        .json(json!({ "title": "Stay positive", "targetMood": 7 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["progress"], 0.0);

    for (day, mood) in [8, 9, 3, 7, 8, 8, 9, 8, 8, 8, 8].into_iter().enumerate() {
        record_mood(&app, "u1", mood, day as u32 + 1).await;
    }

    let (status, body) = Call::new(Method::GET, "/api/goals").as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    let goals = body.as_array().unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0]["progress"], 100.0);

    let uri = format!("/api/goals/{}", goal["id"].as_str().unwrap());
    let (_, stored) = Call::new(Method::GET, &uri).as_user("u1").send(&app).await;
    assert_eq!(stored["progress"], 100.0);
}

#[tokio::test]
async fn goal_progress_follows_mood_changes() {
    let app = app();
    let mut ids = Vec::new();
    for (day, mood) in [5, 6, 5, 7, 5].into_iter().enumerate() {
        let entry = record_mood(&app, "u1", mood, day as u32 + 1).await;
        ids.push(entry["id"].as_str().unwrap().to_string());
    }
    // Another user's high moods never count
    record_mood(&app, "u2", 10, 9).await;

    let (status, goal) = Call::new(Method::POST, "/api/goals")
        .as_user("u1")
        .json(json!({ "title": "Steady", "targetMood": 5 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["progress"], 50.0);

    let (status, _) = Call::new(Method::DELETE, &format!("/api/moods/{}", ids[0]))
        .as_user("u1")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, sync) = Call::new(Method::POST, "/api/goals/sync")
        .as_user("u1")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sync["goals"][0]["progress"], 40.0);
    assert_eq!(sync["failed"], json!([]));

    // Unchanged data, same result
    let (_, again) = Call::new(Method::GET, "/api/goals").as_user("u1").send(&app).await;
    assert_eq!(again[0]["progress"], 40.0);
}

#[tokio::test]
async fn goal_without_matches_has_zero_progress() {
    let app = app();
    for (day, mood) in [5, 6, 7].into_iter().enumerate() {
        record_mood(&app, "u1", mood, day as u32 + 1).await;
    }
    let (_, goal) = Call::new(Method::POST, "/api/goals")
        .as_user("u1")
        .json(json!({ "title": "Elated", "targetMood": 9 }))
        .send(&app)
        .await;
    assert_eq!(goal["progress"], 0.0);
}

#[tokio::test]
async fn goal_input_rules() {
    let app = app();
    let (status, _) = Call::new(Method::POST, "/api/goals")
        .as_user("u1")
        .json(json!({ "title": "   " }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = Call::new(Method::POST, "/api/goals")
        .as_user("u1")
        .json(json!({ "title": "Too high", "targetMood": 12 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, goal) = Call::new(Method::POST, "/api/goals")
        .as_user("u1")
        .json(json!({ "title": "  Default target  " }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["title"], "Default target");
    assert_eq!(goal["targetMood"], 7);

    let uri = format!("/api/goals/{}", goal["id"].as_str().unwrap());
    let (status, _) = Call::new(Method::DELETE, &uri).as_user("u2").send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = Call::new(Method::DELETE, &uri).as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_a_category_keeps_mood_labels() {
    let app = app();
    let (status, category) = Call::new(Method::POST, "/api/categories")
        .as_user("u1")
        .json(json!({ "name": "  Sleep " }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["name"], "Sleep");

    let (_, options) = Call::new(Method::GET, "/api/categories/options")
        .as_user("u1")
        .send(&app)
        .await;
    assert_eq!(options, json!(["Work", "Family", "Health", "Sleep"]));

    let (_, entry) = Call::new(Method::POST, "/api/moods")
        .as_user("u1")
        .json(json!({ "mood": 6, "category": "Sleep" }))
        .send(&app)
        .await;

    let uri = format!("/api/categories/{}", category["id"].as_str().unwrap());
    let (status, _) = Call::new(Method::DELETE, &uri).as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);

    let (_, categories) = Call::new(Method::GET, "/api/categories")
        .as_user("u1")
        .send(&app)
        .await;
    assert_eq!(categories, json!([]));

    let mood_uri = format!("/api/moods/{}", entry["id"].as_str().unwrap());
    let (_, stored) = Call::new(Method::GET, &mood_uri).as_user("u1").send(&app).await;
    assert_eq!(stored["category"], "Sleep");
}

#[tokio::test]
async fn empty_category_name_is_rejected() {
    let app = app();
    let (status, _) = Call::new(Method::POST, "/api/categories")
        .as_user("u1")
        .json(json!({ "name": "  " }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_submission_is_rejected() {
    let app = app();
    let body = json!({ "mood": 7, "category": "Family" });

    let (status, _) = Call::new(Method::POST, "/api/moods")
        .as_user("u1")
        .json(body.clone())
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, error) = Call::new(Method::POST, "/api/moods")
        .as_user("u1")
        .json(body.clone())
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"]["message"], "Duplicate submission");

    // Same body from another user is a different submission
    let (status, _) = Call::new(Method::POST, "/api/moods")
        .as_user("u2")
        .json(body)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = Call::new(Method::GET, "/api/moods").as_user("u1").send(&app).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn idempotency_key_identifies_submissions() {
    let app = app();
    let (status, _) = Call::new(Method::POST, "/api/categories")
        .as_user("u1")
        .json(json!({ "name": "Hobbies" }))
        .idempotency_key("tap-1")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = Call::new(Method::POST, "/api/categories")
        .as_user("u1")
        .json(json!({ "name": "Hobbies again" }))
        .idempotency_key("tap-1")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = Call::new(Method::POST, "/api/categories")
        .as_user("u1")
        .json(json!({ "name": "Hobbies" }))
        .idempotency_key("tap-2")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn failed_submission_can_be_retried_at_once() {
    let app = app();
    let body = json!({ "name": "" });
    for _ in 0..2 {
        let (status, _) = Call::new(Method::POST, "/api/categories")
            .as_user("u1")
            .json(body.clone())
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn summary_reports_average_and_advice() {
    let app = app();
    let (status, empty) = Call::new(Method::GET, "/api/moods/summary")
        .as_user("u1")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["count"], 0);
    assert_eq!(empty["average"], "N/A");
    assert_eq!(empty["advice"], MAINTAIN_ADVICE);
    assert_eq!(empty["chart"]["values"], json!([]));

    record_mood(&app, "u1", 9, 2).await;
    record_mood(&app, "u1", 8, 1).await;
    record_mood(&app, "u1", 8, 3).await;

    let (_, summary) = Call::new(Method::GET, "/api/moods/summary")
        .as_user("u1")
        .send(&app)
        .await;
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["average"], 8.3);
    assert_eq!(summary["advice"], POSITIVE_ADVICE);
    assert_eq!(
        summary["chart"]["labels"],
        json!(["2024-03-01", "2024-03-02", "2024-03-03"])
    );
    assert_eq!(summary["chart"]["values"], json!([8, 9, 8]));
}

#[tokio::test]
async fn theme_toggle_is_per_user() {
    let app = app();
    let (status, theme) = Call::new(Method::GET, "/api/theme").as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(theme["mode"], "light");

    let (_, toggled) = Call::new(Method::POST, "/api/theme/toggle")
        .as_user("u1")
        .send(&app)
        .await;
    assert_eq!(toggled["mode"], "dark");
    assert_eq!(toggled["isDarkMode"], true);
    assert_eq!(toggled["palette"]["background"], "#111318");

    let (_, other) = Call::new(Method::GET, "/api/theme").as_user("u2").send(&app).await;
    assert_eq!(other["mode"], "light");
}

#[tokio::test]
async fn theme_toggles_back_and_forth_in_quick_succession() {
    let app = app();
    let mut modes = Vec::new();
    for _ in 0..3 {
        let (status, theme) = Call::new(Method::POST, "/api/theme/toggle")
            .as_user("u1")
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK, "{theme}");
        modes.push(theme["mode"].clone());
    }
    assert_eq!(modes, vec![json!("dark"), json!("light"), json!("dark")]);
}

#[tokio::test]
async fn goal_sync_can_be_repeated() {
    let app = app();
    record_mood(&app, "u1", 8, 1).await;
    let (status, _) = Call::new(Method::POST, "/api/goals")
        .as_user("u1")
        .json(json!({ "title": "Stay upbeat", "targetMood": 7 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..2 {
        let (status, sync) = Call::new(Method::POST, "/api/goals/sync")
            .as_user("u1")
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK, "{sync}");
        assert_eq!(sync["goals"][0]["progress"], 10.0);
    }
}

#[tokio::test]
async fn repeated_delete_reports_not_found() {
    let app = app();
    let created = record_mood(&app, "u1", 6, 4).await;
    let uri = format!("/api/moods/{}", created["id"].as_str().unwrap());

    let (status, _) = Call::new(Method::DELETE, &uri).as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = Call::new(Method::DELETE, &uri).as_user("u1").send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
