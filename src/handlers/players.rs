use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::extract::{Json, Query};
use crate::handlers::AppState;
use crate::models::{CreatePlayerRequest, UpdatePlayerRequest};

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    /// Trailing window in days; filters the returned series to the most
    /// recent entries, newest first. Clamped to [1, 365].
    pub days: Option<u32>,
}

/// POST /players - Create a player with an optional initial series
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreatePlayerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let player = state.players.create(payload).await?;
    Ok((StatusCode::CREATED, axum::Json(json!({ "success": true, "data": player }))))
}

/// GET /players - List all players
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let players = state.players.list().await?;
    Ok(axum::Json(json!({ "success": true, "data": players })))
}

/// GET /players/:id - Get one player, optionally windowed via ?days=N
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PlayerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let player = state.players.get(id, query.days).await?;
    Ok(axum::Json(json!({ "success": true, "data": player })))
}

/// PUT /players/:id - Patch attributes and/or mutate the series
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlayerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let player = state.players.update(id, payload).await?;
    Ok(axum::Json(json!({ "success": true, "data": player })))
}

/// DELETE /players/:id - Remove a player and its series
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.players.delete(id).await?;
    Ok(axum::Json(json!({ "success": true, "message": "player deleted" })))
}
