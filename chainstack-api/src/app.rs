/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use chainstack_api::{app::AppState, config::Config};
/// use chainstack_shared::clock::SystemClock;
/// use chainstack_shared::store::PgStore;
/// use std::sync::Arc;
///
/// # async fn example(store: PgStore) -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(store), Arc::new(SystemClock), config);
/// let app = chainstack_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    routing::{get, post, put},
    Router,
};
use chainstack_shared::accounts::AccountService;
use chainstack_shared::auth::{AuthorizationGate, CredentialVerifier, TokenManager};
use chainstack_shared::clock::Clock;
use chainstack_shared::resources::ResourceService;
use chainstack_shared::store::Store;
use std::sync::Arc;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each handler via Axum's `State` extractor. Every field is an
/// `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Backing store, used directly only for health checks
    pub store: Arc<dyn Store>,

    pub credentials: CredentialVerifier,
    pub tokens: TokenManager,
    pub gate: AuthorizationGate,
    pub accounts: AccountService,
    pub resources: ResourceService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires every component over one store and clock
    pub fn new<S: Store + 'static>(store: Arc<S>, clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            credentials: CredentialVerifier::new(store.clone()),
            tokens: TokenManager::new(store.clone(), clock.clone()),
            gate: AuthorizationGate::new(store.clone(), clock.clone()),
            accounts: AccountService::new(store.clone()),
            resources: ResourceService::new(store.clone(), clock),
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health
/// ├── POST   /token               # client credentials grant
/// ├── GET    /resources           # capability: resources
/// ├── POST   /resources
/// ├── GET    /resources/:key
/// ├── DELETE /resources/:key
/// ├── GET    /users               # capability: users
/// ├── POST   /users
/// ├── GET    /users/:id
/// ├── DELETE /users/:id
/// └── PUT    /users/:id/quota
/// ```
///
/// Authorization is enforced per handler by the `Authorized<C>` extractor.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let timeout = state.config.request_timeout();

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/token", post(routes::token::issue_token))
        .route(
            "/resources",
            get(routes::resources::list_resources).post(routes::resources::create_resource),
        )
        .route(
            "/resources/:key",
            get(routes::resources::get_resource).delete(routes::resources::delete_resource),
        )
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .route("/users/:id/quota", put(routes::users::update_quota))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
