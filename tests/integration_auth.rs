mod common;

use axum::http::StatusCode;
use serde_json::json;

use artistry_auth::verify_token;
use artistry_config::JwtConfig;
use artistry_models::UserRole;
use common::test_app;

#[tokio::test]
async fn test_issue_token_success() {
    let app = test_app();

    let (status, body) = app
        .post("/jwt", None, json!({ "email": "painter@artistry.io" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["expiresIn"], 3600);

    let token = body["data"]["token"].as_str().unwrap();
    let claims = verify_token(token, &app.jwt_config).unwrap();
    assert_eq!(claims.email, "painter@artistry.io");
}

#[tokio::test]
async fn test_issue_token_invalid_email() {
    let app = test_app();

    let (status, body) = app.post("/jwt", None, json!({ "email": "painter" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_issue_token_missing_email() {
    let app = test_app();

    let (status, body) = app.post("/jwt", None, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email is required");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = test_app();

    let (status, body) = app.get("/my-classes", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn test_protected_route_with_non_bearer_header() {
    let app = test_app();

    let (status, body) = app.get_with_authorization("/users", "Token abc").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");
    assert_eq!(body["message"], "Invalid authorization header format");
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let app = test_app();

    let (status, body) = app.get("/select-class", Some("not.a.jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let app = test_app();
    app.create_identity("admin@artistry.io", UserRole::Admin).await;

    let forged = artistry_auth::create_token(
        "admin@artistry.io",
        &JwtConfig {
            secret: "some-other-secret-entirely".to_string(),
            expiry_seconds: 3600,
        },
    )
    .unwrap();

    let (status, body) = app.get("/users", Some(&forged)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn test_unknown_identity_is_distinct_from_wrong_role() {
    let app = test_app();

    let stranger = app.token("stranger@artistry.io");
    let (status, body) = app.get("/users", Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "unknown_identity");

    let (_, student_token) = app.login_as(UserRole::Student).await;
    let (status, body) = app.get("/users", Some(&student_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app();

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Artistry Academia server is running");

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
