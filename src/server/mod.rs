//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::jwt::JwtManager;
use crate::middleware::{normalize_error_response, ObservabilityLayer, SanitizedMakeSpan};
use crate::openapi;
use crate::repository::{property::PropertyRepositoryImpl, user::UserRepositoryImpl};
use crate::service::{AuthService, PropertyService};
use crate::state::HasServices;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub auth_service: Arc<AuthService<UserRepositoryImpl>>,
    pub property_service: Arc<PropertyService<PropertyRepositoryImpl, UserRepositoryImpl>>,
    pub jwt_manager: JwtManager,
}

impl HasServices for AppState {
    type UserRepo = UserRepositoryImpl;
    type PropertyRepo = PropertyRepositoryImpl;

    fn config(&self) -> &Config {
        &self.config
    }

    fn auth_service(&self) -> &AuthService<Self::UserRepo> {
        &self.auth_service
    }

    fn property_service(&self) -> &PropertyService<Self::PropertyRepo, Self::UserRepo> {
        &self.property_service
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    async fn check_ready(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.db_pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Readiness check failed");
                false
            }
        }
    }
}

impl AppState {
    pub fn new(config: Config, db_pool: MySqlPool) -> Self {
        let jwt_manager = JwtManager::new(config.jwt.clone());

        let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
        let property_repo = Arc::new(PropertyRepositoryImpl::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(user_repo.clone(), jwt_manager.clone()));
        let property_service = Arc::new(PropertyService::new(property_repo, user_repo));

        Self {
            config: Arc::new(config),
            db_pool,
            auth_service,
            property_service,
            jwt_manager,
        }
    }
}

/// Run the server
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    let http_addr = config.http_addr();
    let metrics_enabled = prometheus_handle.is_some();
    let state = AppState::new(config, db_pool);

    let mut app = build_router(state);
    if metrics_enabled {
        app = app.merge(api::metrics::metrics_router(prometheus_handle));
    }

    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Build the HTTP router with generic state type
///
/// Works with both the production `AppState` and test states that
/// implement `HasServices`.
pub fn build_router<S: HasServices>(state: S) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        // Auth
        .route("/api/auth/register", post(api::auth::register::<S>))
        .route("/api/auth/login", post(api::auth::login::<S>))
        .route("/api/auth/me", get(api::auth::me::<S>))
        // Properties
        .route(
            "/api/properties",
            get(api::property::list::<S>).post(api::property::create::<S>),
        )
        .route("/api/properties/search", post(api::property::search::<S>))
        .route(
            "/api/properties/broker/{broker_id}",
            get(api::property::list_by_broker::<S>),
        )
        .route(
            "/api/properties/{id}",
            get(api::property::get::<S>)
                .put(api::property::update::<S>)
                .delete(api::property::delete::<S>),
        )
        .layer(axum::middleware::from_fn(normalize_error_response))
        .layer(TraceLayer::new_for_http().make_span_with(SanitizedMakeSpan))
        .layer(ObservabilityLayer)
        .layer(cors)
        .with_state(state)
}
