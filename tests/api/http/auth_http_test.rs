//! Auth API HTTP tests

use super::{build_test_router, get, post, register, register_body, TestAppState};
use axum::http::StatusCode;
use house_broker::domain::{AuthResponse, UserDto};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_register_returns_token_and_public_user() {
    let app = build_test_router(TestAppState::new());

    let response = post(
        &app,
        "/api/auth/register",
        None,
        &register_body("Broker@Example.com", "Broker"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("passwordHash").is_none());
    let auth: AuthResponse = serde_json::from_value(response.body).unwrap();
    assert!(!auth.token.is_empty());
    assert_eq!(auth.user.email, "broker@example.com");
    assert_eq!(auth.user.role, "Broker");
    assert_eq!(auth.user.full_name, "Test User");
}

#[tokio::test]
async fn test_register_duplicate_email_fails_without_second_record() {
    let state = TestAppState::new();
    let user_repo = state.user_repo.clone();
    let app = build_test_router(state);

    register(&app, "dup@example.com", "HouseSeeker").await;
    let response = post(
        &app,
        "/api/auth/register",
        None,
        &register_body("DUP@example.com", "Broker"),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        json!("User with this email already exists")
    );
    assert_eq!(user_repo.count().await, 1);
}

#[tokio::test]
async fn test_register_invalid_input_lists_errors() {
    let app = build_test_router(TestAppState::new());

    let response = post(
        &app,
        "/api/auth/register",
        None,
        &json!({
            "email": "not-an-email",
            "password": "short",
            "firstName": "",
            "lastName": "User",
            "role": "Admin",
        }),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = response.body["errors"].as_array().unwrap();
    assert!(errors.len() >= 3);
}

#[tokio::test]
async fn test_login_round_trip_and_me() {
    let app = build_test_router(TestAppState::new());
    let registered = register(&app, "seeker@example.com", "HouseSeeker").await;

    let response = post(
        &app,
        "/api/auth/login",
        None,
        &json!({ "email": "SEEKER@example.com", "password": "Secret1!" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let auth: AuthResponse = serde_json::from_value(response.body).unwrap();
    assert_eq!(auth.user.id, registered.user.id);

    let me = get(&app, "/api/auth/me", Some(&auth.token)).await;
    assert_eq!(me.status, StatusCode::OK);
    let user: UserDto = serde_json::from_value(me.body).unwrap();
    assert_eq!(user.email, "seeker@example.com");
    assert_eq!(user.role, "HouseSeeker");
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = build_test_router(TestAppState::new());
    register(&app, "seeker@example.com", "HouseSeeker").await;

    let wrong = post(
        &app,
        "/api/auth/login",
        None,
        &json!({ "email": "seeker@example.com", "password": "Wrong1!" }),
    )
    .await;
    let unknown = post(
        &app,
        "/api/auth/login",
        None,
        &json!({ "email": "ghost@example.com", "password": "Secret1!" }),
    )
    .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], unknown.body["message"]);
}

#[tokio::test]
async fn test_login_inactive_account_is_unauthorized() {
    let state = TestAppState::new();
    let user_repo = state.user_repo.clone();
    let app = build_test_router(state);
    register(&app, "gone@example.com", "Broker").await;
    user_repo.deactivate("gone@example.com").await;

    let response = post(
        &app,
        "/api/auth/login",
        None,
        &json!({ "email": "gone@example.com", "password": "Secret1!" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_missing_fields_is_bad_request() {
    let app = build_test_router(TestAppState::new());

    let response = post(&app, "/api/auth/login", None, &json!({ "email": "a@b.com" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        json!("Email and password are required")
    );
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = build_test_router(TestAppState::new());

    let missing = get(&app, "/api/auth/me", None).await;
    let garbage = get(&app, "/api/auth/me", Some("not.a.token")).await;

    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], json!("unauthorized"));
}

#[tokio::test]
async fn test_me_for_unknown_user_is_not_found() {
    let state = TestAppState::new();
    // Token signed by the same key for a user that was never stored
    let other = TestAppState::new();
    let other_app = build_test_router(other);
    let registered = register(&other_app, "elsewhere@example.com", "Broker").await;

    let app = build_test_router(state);
    let response = get(&app, "/api/auth/me", Some(&registered.token)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
