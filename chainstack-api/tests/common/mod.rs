/// Common test utilities for integration tests
///
/// Every context runs the full router over a fresh in-memory store and a
/// manually driven clock, so no database is needed.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chainstack_api::app::{build_router, AppState};
use chainstack_api::config::Config;
use chainstack_shared::accounts::AccountService;
use chainstack_shared::clock::ManualClock;
use chainstack_shared::models::{NewUser, UserIdentity};
use chainstack_shared::quota::Quota;
use chainstack_shared::store::MemoryStore;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;

pub const ADMIN_EMAIL: &str = "admin@email.com";
pub const ADMIN_PASSWORD: &str = "adminpassword";

pub const USER_PASSWORD: &str = "userpassword";

/// Test context containing the router and its backing doubles
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub accounts: AccountService,
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));

        let state = AppState::new(store.clone(), clock.clone(), Config::default());
        let accounts = state.accounts.clone();

        Self {
            store,
            clock,
            accounts,
            app: build_router(state),
        }
    }

    /// Registers a user directly through the account service
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        admin: bool,
        quota: Quota,
    ) -> UserIdentity {
        self.accounts
            .create_user(NewUser {
                email: email.to_string(),
                password: password.to_string(),
                admin,
                quota,
            })
            .await
            .unwrap()
    }

    /// Creates the admin fixture and returns a token for it
    pub async fn admin_token(&self) -> String {
        self.create_user(ADMIN_EMAIL, ADMIN_PASSWORD, true, Quota::Unlimited)
            .await;
        self.token_for(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Creates a regular user and returns it with a token
    pub async fn user_with_token(&self, email: &str, quota: Quota) -> (UserIdentity, String) {
        let user = self.create_user(email, USER_PASSWORD, false, quota).await;
        let token = self.token_for(email, USER_PASSWORD).await;
        (user, token)
    }

    /// Exchanges credentials for an access token via `POST /token`
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let form = format!(
            "grant_type=client_credentials&client_id={}&client_secret={}",
            email, password
        );
        let (status, body) = self.post_form("/token", &form).await;
        assert_eq!(status, StatusCode::OK, "token request failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Sends a form-encoded POST
    pub async fn post_form(&self, uri: &str, form: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Sends a request with an optional bearer token and JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }
}
