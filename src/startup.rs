use crate::auth::{check, login, logout, signup};
use crate::config::{Amendment, Config};
use crate::db::{self, MemoryStore, PgStore, Store};
use crate::middleware::require_session;
use crate::votes::{amendment, check_vote, submit_vote};
use axum::{
    Json, Router,
    extract::Extension,
    http::{
        Method, StatusCode,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub amendment: Arc<Amendment>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, amendment: Amendment, bcrypt_cost: u32) -> Self {
        AppState {
            store,
            amendment: Arc::new(amendment),
            bcrypt_cost,
        }
    }

    /// Connects to Postgres when a database URL is configured, otherwise
    /// falls back to the in-process store.
    pub async fn from_config(config: &Config) -> Result<Self, sqlx::Error> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let pool = db::init_db(url, config.db_max_connections).await?;
                info!("connected to postgres. {}", db::pool_stats(&pool));
                Arc::new(PgStore::new(pool))
            }
            None => {
                warn!("DATABASE_URL not set, votes are kept in memory and lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(AppState::new(
            store,
            config.amendment.clone(),
            config.bcrypt_cost,
        ))
    }
}

pub fn router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/logout", post(logout))
        .route("/check", get(check))
        .route_layer(middleware::from_fn(require_session))
        .route("/signup", post(signup))
        .route("/login", post(login));

    let vote_routes = Router::new()
        .route("/", post(submit_vote))
        .route("/check", get(check_vote))
        .route_layer(middleware::from_fn(require_session))
        .route("/amendment", get(amendment));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/vote", vote_routes)
        .fallback(handler_404)
        .layer(Extension(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, ACCEPT, AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })))
}
