/// Integration tests for the Chainstack API
///
/// These drive the full router end to end:
/// - Token issuance through the client credentials grant
/// - Bearer authorization and capability checks
/// - Quota-gated resource creation and per-user isolation
/// - User administration

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chainstack_shared::quota::Quota;
use chrono::Duration;
use common::{TestContext, ADMIN_EMAIL, ADMIN_PASSWORD};
use serde_json::json;
use tower::Service as _;

#[tokio::test]
async fn test_health_reports_store_status() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.store.set_failing(true);
    let (status, body) = ctx.get("/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_token_issued_for_admin() {
    let ctx = TestContext::new();
    ctx.create_user(ADMIN_EMAIL, ADMIN_PASSWORD, true, Quota::Unlimited)
        .await;

    let (status, body) = ctx
        .post_form(
            "/token",
            "grant_type=client_credentials&client_id=admin@email.com&client_secret=adminpassword",
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["scope"], "resources,users");
    assert_eq!(body["access_token"].as_str().unwrap().len(), 40);
}

#[tokio::test]
async fn test_token_scope_for_regular_user() {
    let ctx = TestContext::new();
    ctx.create_user("user@email.com", "userpassword", false, Quota::Unlimited)
        .await;

    let (status, body) = ctx
        .post_form(
            "/token",
            "grant_type=client_credentials&client_id=USER@Email.com&client_secret=userpassword",
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scope"], "resources");
}

#[tokio::test]
async fn test_token_request_errors() {
    let ctx = TestContext::new();
    ctx.create_user(ADMIN_EMAIL, ADMIN_PASSWORD, true, Quota::Unlimited)
        .await;

    let cases = [
        ("", StatusCode::BAD_REQUEST, "invalid grant type: ''"),
        (
            "grant_type=password&client_id=admin@email.com&client_secret=adminpassword",
            StatusCode::BAD_REQUEST,
            "invalid grant type: 'password'",
        ),
        (
            "grant_type=client_credentials&client_id=%20%20&client_secret=adminpassword",
            StatusCode::BAD_REQUEST,
            "client_id is required",
        ),
        (
            "grant_type=client_credentials&client_id=admin@email.com",
            StatusCode::BAD_REQUEST,
            "client_secret is required",
        ),
        (
            "grant_type=client_credentials&client_id=admin@email.com&client_secret=wrongpassword",
            StatusCode::UNAUTHORIZED,
            "invalid credentials",
        ),
        (
            "grant_type=client_credentials&client_id=nobody@email.com&client_secret=adminpassword",
            StatusCode::UNAUTHORIZED,
            "invalid credentials",
        ),
    ];

    for (form, expected_status, expected_message) in cases {
        let (status, body) = ctx.post_form("/token", form).await;
        assert_eq!(status, expected_status, "form: {}", form);
        assert_eq!(body["message"], expected_message, "form: {}", form);
    }

    assert_eq!(ctx.store.token_count(), 0);
}

#[tokio::test]
async fn test_missing_or_malformed_token_is_denied() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/resources", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "access denied");

    let (status, _) = ctx.get("/resources", Some("not-a-real-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/resources")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_denied() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user_with_token("user@email.com", Quota::Unlimited).await;

    ctx.clock.advance(Duration::seconds(3599));
    let (status, _) = ctx.get("/resources", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    ctx.clock.advance(Duration::seconds(1));
    let (status, body) = ctx.get("/resources", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "access denied");
}

#[tokio::test]
async fn test_regular_user_cannot_manage_users() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user_with_token("user@email.com", Quota::Unlimited).await;

    let (status, body) = ctx.get("/users", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "access denied");

    let (status, _) = ctx
        .request(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({"email": "other@email.com", "password": "otherpassword"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resource_lifecycle() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user_with_token("user@email.com", Quota::Unlimited).await;

    let (status, created) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let key = created["key"].as_str().unwrap().to_string();
    assert_eq!(created["created_at"], "2024-01-01T00:00:00Z");
    assert!(created.get("user_id").is_none());

    let (status, listed) = ctx.get("/resources", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["key"], key.as_str());

    let uri = format!("/resources/{}", key);
    let (status, fetched) = ctx.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = ctx.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = ctx.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "access denied");
}

#[tokio::test]
async fn test_resources_are_isolated_per_user() {
    let ctx = TestContext::new();
    let (_, alice) = ctx.user_with_token("alice@email.com", Quota::Unlimited).await;
    let (_, bob) = ctx.user_with_token("bob@email.com", Quota::Unlimited).await;

    let (_, created) = ctx
        .request(Method::POST, "/resources", Some(&alice), None)
        .await;
    let uri = format!("/resources/{}", created["key"].as_str().unwrap());

    let (status, listed) = ctx.get("/resources", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, body) = ctx.get(&uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "access denied");

    let (status, _) = ctx.request(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.get(&uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_quota_limits_resource_creation() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user_with_token("user@email.com", Quota::Limited(1)).await;

    let (status, created) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "resource quota exceeded");

    // Freeing the slot allows another creation
    let uri = format!("/resources/{}", created["key"].as_str().unwrap());
    ctx.request(Method::DELETE, &uri, Some(&token), None).await;

    let (status, _) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_zero_quota_blocks_all_creation() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user_with_token("user@email.com", Quota::Limited(0)).await;

    let (status, body) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "resource quota exceeded");
}

#[tokio::test]
async fn test_admin_creates_and_lists_users() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let (status, created) = ctx
        .request(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({"email": " New@Email.com ", "password": "newpassword", "quota": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "new@email.com");
    assert_eq!(created["admin"], false);
    assert_eq!(created["quota"], 5);
    assert!(created.get("password_hash").is_none());

    let (status, listed) = ctx.get("/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["email"], ADMIN_EMAIL);
    assert!(listed[0].get("quota").is_none());
    assert_eq!(listed[1], created);

    let uri = format!("/users/{}", created["id"]);
    let (status, fetched) = ctx.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // The new user can sign in with the registered password
    let user_token = ctx.token_for("new@email.com", "newpassword").await;
    let (status, _) = ctx.get("/resources", Some(&user_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_user_rejections() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({"email": "not-an-email", "password": "longenough"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");
    assert_eq!(
        body["message"],
        "invalid email: 'not-an-email' is not a valid email"
    );

    let (status, body) = ctx
        .request(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({"email": "short@email.com", "password": "short"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "password");

    let (status, body) = ctx
        .request(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({"email": "ADMIN@email.com", "password": "anotherpassword"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    for uri in ["/users/999", "/users/abc"] {
        let (status, body) = ctx.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri: {}", uri);
        assert_eq!(body["message"], "user not found");
    }

    let (status, _) = ctx
        .request(
            Method::PUT,
            "/users/999/quota",
            Some(&token),
            Some(json!({"quota": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(Method::DELETE, "/users/999", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quota_update_takes_effect() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (user, token) = ctx.user_with_token("user@email.com", Quota::Limited(1)).await;
    let quota_uri = format!("/users/{}/quota", user.id);

    ctx.request(Method::POST, "/resources", Some(&token), None)
        .await;
    let (status, _) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = ctx
        .request(Method::PUT, &quota_uri, Some(&admin), Some(json!({"quota": 2})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quota"], 2);

    let (status, _) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, updated) = ctx
        .request(Method::PUT, &quota_uri, Some(&admin), Some(json!({"quota": null})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated.get("quota").is_none());

    let (status, _) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_deleted_user_loses_resources() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let (user, token) = ctx.user_with_token("user@email.com", Quota::Unlimited).await;

    ctx.request(Method::POST, "/resources", Some(&token), None)
        .await;

    let uri = format!("/users/{}", user.id);
    let (status, _) = ctx.request(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The outstanding token still authenticates until it expires, but the
    // account's resources are gone and no new ones can be created.
    let (status, listed) = ctx.get("/resources", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, body) = ctx
        .request(Method::POST, "/resources", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "access denied");
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user_with_token("user@email.com", Quota::Unlimited).await;

    ctx.store.set_failing(true);

    let (status, body) = ctx.get("/resources", Some(&token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");

    let (status, _) = ctx
        .post_form(
            "/token",
            "grant_type=client_credentials&client_id=user@email.com&client_secret=userpassword",
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
