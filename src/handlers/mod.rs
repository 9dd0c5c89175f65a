pub mod extract;
pub mod players;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::jwt_auth_middleware;
use crate::services::PlayerService;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub players: PlayerService,
    pub store: Arc<dyn RecordStore>,
}

/// Full application router over an injected record store. Player routes sit
/// behind bearer-token auth; the banner and health probe stay public.
pub fn app(store: Arc<dyn RecordStore>) -> Router {
    let state = AppState { players: PlayerService::new(store.clone()), store };

    Router::new()
        .merge(player_routes())
        .route("/", get(root))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn player_routes() -> Router<AppState> {
    Router::new()
        .route("/players", get(players::list).post(players::create))
        .route(
            "/players/:id",
            get(players::get).put(players::update).delete(players::delete),
        )
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Courtside API",
            "version": version,
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "players": "/players[/:id] (protected, GET/POST/PUT/DELETE, GET supports ?days=N)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "ok" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": {
                    "code": "CONFIGURATION_ERROR",
                    "message": "record store unavailable",
                },
                "data": { "status": "degraded", "timestamp": now, "store_error": e.to_string() }
            })),
        ),
    }
}
