use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    routing::get,
};
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use reino::config::Config;

/// Seeded by the initial migration.
const ADMIN_HANDLE: &str = "admin";
const ADMIN_PASSWORD: &str = "ChangeMe1!";

/// Motto served by the profile mock; tests update it after registration once
/// they know the issued code.
#[derive(Clone, Default)]
struct MockMotto(Arc<Mutex<String>>);

impl MockMotto {
    fn set(&self, motto: &str) {
        *self.0.lock().unwrap() = motto.to_string();
    }
}

async fn profile_handler(State(motto): State<MockMotto>) -> Json<serde_json::Value> {
    let motto = motto.0.lock().unwrap().clone();
    Json(serde_json::json!({
        "name": "mock",
        "motto": motto,
    }))
}

/// Serves a stand-in for the public profile API on a random local port.
async fn spawn_profile_mock() -> (String, MockMotto) {
    let motto = MockMotto::default();
    let app = Router::new()
        .route("/api/public/users", get(profile_handler))
        .with_state(motto.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), motto)
}

/// A base URL nothing listens on, for the "verifier offline" scenarios.
async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn test_config(habbo_base: &str) -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps the in-memory database shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.habbo.base_url = habbo_base.to_string();
    config.habbo.request_timeout_seconds = 2;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app(habbo_base: &str) -> Router {
    let state = reino::api::create_app_state_from_config(test_config(habbo_base))
        .await
        .expect("Failed to create app state");
    reino::api::router(state)
}

fn session_cookie(response: &axum::http::Response<axum::body::Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("id="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
    cookie: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn get_with_cookie(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

async fn register(app: &Router, handle: &str, password: &str) -> (StatusCode, serde_json::Value) {
    let response = post_json(
        app,
        "/api/auth/register",
        &serde_json::json!({ "handle": handle, "password": password }),
        None,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn register_rejects_bad_input() {
    let (base, _motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    // Empty fields
    let (status, _) = register(&app, "", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Handle too short
    let (status, body) = register(&app, "ab", "Str0ng!pwd").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("between 3 and 50"));

    // Handle with forbidden characters
    let (status, body) = register(&app, "bad handle", "Str0ng!pwd").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("letters"));

    // Weak password (no symbol)
    let (status, body) = register(&app, "Kael", "Abcdefg1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn register_verify_and_login_flow() {
    let (base, motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    let (status, body) = register(&app, "Kael", "Str0ng!pwd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let code = body["data"]["verification_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 7);
    assert!(code.starts_with("RH"));
    assert!(code[2..].chars().all(|c| c.is_ascii_digit()));

    // Cannot log in before verification
    let response = post_json(
        &app,
        "/api/auth/login",
        &serde_json::json!({ "handle": "Kael", "password": "Str0ng!pwd" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Motto without the code: verification fails, state unchanged
    motto.set("just vibes");
    let response = post_json(
        &app,
        "/api/auth/verify",
        &serde_json::json!({ "handle": "Kael" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains(&code));

    // Motto containing the code: verified, auto-logged-in as member
    motto.set(&format!("royal guard {code} at your service"));
    let response = post_json(
        &app,
        "/api/auth/verify",
        &serde_json::json!({ "handle": "Kael" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("verification should establish a session");
    let body = body_json(response).await;
    assert_eq!(body["data"]["handle"], "Kael");
    assert_eq!(body["data"]["role"], "member");

    let response = get_with_cookie(&app, "/api/auth/session", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["handle"], "Kael");

    // Second verification attempt is a conflict, not a silent success
    let response = post_json(
        &app,
        "/api/auth/verify",
        &serde_json::json!({ "handle": "Kael" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Normal login now works
    let response = post_json(
        &app,
        "/api/auth/login",
        &serde_json::json!({ "handle": "Kael", "password": "Str0ng!pwd" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());
}

#[tokio::test]
async fn duplicate_handle_is_a_conflict() {
    let (base, _motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    let (status, _) = register(&app, "Kael", "Str0ng!pwd").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = register(&app, "Kael", "0ther!Pwd").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_registrations_one_winner() {
    let (base, _motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    let (first, second) = tokio::join!(
        register(&app, "Kael", "Str0ng!pwd"),
        register(&app, "Kael", "Str0ng!pwd"),
    );

    let statuses = [first.0, second.0];
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::OK).count(),
        1,
        "exactly one registration should win: {statuses:?}"
    );
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CONFLICT)
            .count(),
        1,
        "the loser should see a duplicate conflict: {statuses:?}"
    );
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (base, motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    let (_, body) = register(&app, "Kael", "Str0ng!pwd").await;
    let code = body["data"]["verification_code"].as_str().unwrap().to_string();
    motto.set(&code);
    let response = post_json(
        &app,
        "/api/auth/verify",
        &serde_json::json!({ "handle": "Kael" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let wrong_password = post_json(
        &app,
        "/api/auth/login",
        &serde_json::json!({ "handle": "Kael", "password": "Wr0ng!pwd" }),
        None,
    )
    .await;
    let unknown_handle = post_json(
        &app,
        "/api/auth/login",
        &serde_json::json!({ "handle": "Nobody", "password": "Wr0ng!pwd" }),
        None,
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_handle.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(wrong_password).await,
        body_json(unknown_handle).await
    );
}

#[tokio::test]
async fn verifier_offline_is_retryable() {
    let base = dead_base_url().await;
    let app = spawn_app(&base).await;

    let (status, _) = register(&app, "Kael", "Str0ng!pwd").await;
    assert_eq!(status, StatusCode::OK);

    let response = post_json(
        &app,
        "/api/auth/verify",
        &serde_json::json!({ "handle": "Kael" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // Account state is untouched: still unverified, still cannot log in
    let response = post_json(
        &app,
        "/api/auth/login",
        &serde_json::json!({ "handle": "Kael", "password": "Str0ng!pwd" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_unknown_handle_is_not_found() {
    let (base, _motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    let response = post_json(
        &app,
        "/api/auth/verify",
        &serde_json::json!({ "handle": "Nobody" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let (base, _motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    // No active session is not an error
    let response = post_json(&app, "/api/auth/logout", &serde_json::json!({}), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/api/auth/login",
        &serde_json::json!({ "handle": ADMIN_HANDLE, "password": ADMIN_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap();

    let response = post_json(
        &app,
        "/api/auth/logout",
        &serde_json::json!({}),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with_cookie(&app, "/api/auth/session", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn check_session_without_session_is_401() {
    let (base, _motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    let response = get_with_cookie(&app, "/api/auth/session", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn full_content_payload() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "main_title": "Welcome",
            "main_description": "A community for retro hotel fans",
            "feature_1": "Events",
            "feature_2": "Rare trading",
            "feature_3": "Room contests",
            "footer_text": "See you in the lobby",
        }
    })
}

#[tokio::test]
async fn content_editing_is_role_gated() {
    let (base, motto) = spawn_profile_mock().await;
    let app = spawn_app(&base).await;

    // Public read works without a session
    let response = get_with_cookie(&app, "/api/content", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // No session: 401
    let response = post_json(&app, "/api/content", &full_content_payload(), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Member session: 403, and the body reveals nothing but the denial
    let (_, body) = register(&app, "Kael", "Str0ng!pwd").await;
    let code = body["data"]["verification_code"].as_str().unwrap().to_string();
    motto.set(&code);
    let response = post_json(
        &app,
        "/api/auth/verify",
        &serde_json::json!({ "handle": "Kael" }),
        None,
    )
    .await;
    let member_cookie = session_cookie(&response).unwrap();

    let response = post_json(
        &app,
        "/api/content",
        &full_content_payload(),
        Some(&member_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Insufficient permission");

    // Administrator session: allowed
    let response = post_json(
        &app,
        "/api/auth/login",
        &serde_json::json!({ "handle": ADMIN_HANDLE, "password": ADMIN_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let admin_cookie = session_cookie(&response).unwrap();

    let response = post_json(
        &app,
        "/api/content",
        &full_content_payload(),
        Some(&admin_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Missing required field rejected
    let mut partial = full_content_payload();
    partial["data"]
        .as_object_mut()
        .unwrap()
        .remove("footer_text");
    let response = post_json(&app, "/api/content", &partial, Some(&admin_cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The edit is visible on the public read
    let response = get_with_cookie(&app, "/api/content", None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["main_title"], "Welcome");
}
