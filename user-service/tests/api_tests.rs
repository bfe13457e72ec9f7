mod common;

use auth::Claims;
use auth::JwtHandler;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use user_service::domain::user::models::Username;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "wonderland",
            "full_name": "Alice Liddell"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["full_name"], "Alice Liddell");
    assert_eq!(body["data"]["active"], true);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;

    app.register("alice", "wonderland").await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "looking-glass"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_invalid_input() {
    let app = TestApp::spawn().await;

    for (payload, fragment) in [
        (
            json!({"username": "al", "email": "alice@example.com", "password": "wonderland"}),
            "minimum 3 characters",
        ),
        (
            json!({"username": "alice", "email": "not-an-email", "password": "wonderland"}),
            "email",
        ),
        (
            json!({"username": "alice", "email": "alice@example.com", "password": ""}),
            "password",
        ),
    ] {
        let response = app
            .post("/auth/register")
            .json(&payload)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        assert!(body["data"]["message"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains(fragment));
    }
}

#[tokio::test]
async fn test_token_success() {
    let app = TestApp::spawn().await;
    app.register("alice", "wonderland").await;

    let response = app.request_token("alice", "wonderland").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 30 * 60);

    let token = body["access_token"].as_str().expect("access_token missing");
    let claims = app.jwt_handler.decode(token).expect("Token should decode");
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.lifetime(), Duration::minutes(30));
}

#[tokio::test]
async fn test_token_wrong_password_and_unknown_user_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("alice", "wonderland").await;

    let wrong_password = app.request_token("alice", "looking-glass").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.headers()["www-authenticate"],
        "Bearer"
    );
    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();

    let unknown_user = app.request_token("bob", "wonderland").await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user: serde_json::Value = unknown_user.json().await.unwrap();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(
        wrong_password["data"]["message"],
        "Incorrect username or password"
    );
}

#[tokio::test]
async fn test_token_unsupported_grant_type() {
    let app = TestApp::spawn().await;
    app.register("alice", "wonderland").await;

    let response = app
        .post("/auth/token")
        .form(&[
            ("grant_type", "client_credentials"),
            ("username", "alice"),
            ("password", "wonderland"),
        ])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_me_with_token() {
    let app = TestApp::spawn().await;
    let token = app.login("alice", "wonderland").await;

    let response = app
        .get_authenticated("/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["identifier"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["active"], true);
}

#[tokio::test]
async fn test_read_me_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/users/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Could not validate credentials");
}

#[tokio::test]
async fn test_read_me_with_rejected_tokens() {
    let app = TestApp::spawn().await;
    app.register("alice", "wonderland").await;

    let expired = app
        .jwt_handler
        .issue_claims(
            Claims::issued_at("alice", Utc::now() - Duration::hours(2), Duration::minutes(30))
                .unwrap(),
        )
        .unwrap();
    let foreign = JwtHandler::new(b"another-secret-key-that-is-at-least-32-bytes")
        .issue("alice", Duration::minutes(5))
        .unwrap();

    for token in ["garbage", expired.as_str(), foreign.as_str()] {
        let response = app
            .get_authenticated("/users/me", token)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
    }
}

#[tokio::test]
async fn test_read_me_inactive_account() {
    let app = TestApp::spawn().await;
    let token = app.login("alice", "wonderland").await;

    let username = Username::new("alice".to_string()).unwrap();
    assert!(app.repository.set_active(&username, false).await);

    let response = app
        .get_authenticated("/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Inactive user");
}

#[tokio::test]
async fn test_read_me_deleted_account() {
    let app = TestApp::spawn().await;
    let token = app.login("alice", "wonderland").await;

    let username = Username::new("alice".to_string()).unwrap();
    app.repository.remove(&username).await;

    let response = app
        .get_authenticated("/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_read_my_items() {
    let app = TestApp::spawn().await;
    let token = app.login("alice", "wonderland").await;

    let response = app
        .get_authenticated("/users/me/items", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"][0]["item_id"], 1);
    assert_eq!(body["data"][0]["owner"]["identifier"], "alice");
}
