use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{middleware, Json, Router};
use http::StatusCode;
use serde_json::json;

use crate::auth::context::{self, RequestContext};
use crate::errors::{AppError, AppJson};
use crate::models::{AddItemRequest, CreateWatchlistRequest, WatchlistItem, WatchlistResponse};
use crate::services::watchlist_service;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_watchlists).post(create_watchlist))
        .route("/:id", get(get_watchlist).delete(delete_watchlist))
        .route("/:id/items", post(add_item))
        .route("/:id/items/:symbol", delete(remove_item))
        .route_layer(middleware::from_fn_with_state(state, context::require_login))
}

async fn list_watchlists(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = ctx.require_user()?;
    let watchlists = watchlist_service::list(&state.pool, user_id).await?;
    Ok(Json(json!({ "watchlists": watchlists })))
}

async fn get_watchlist(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<WatchlistResponse>, AppError> {
    let user_id = ctx.require_user()?;
    let watchlist = watchlist_service::get(&state.pool, user_id, id).await?;
    Ok(Json(watchlist))
}

async fn create_watchlist(
    State(state): State<AppState>,
    ctx: RequestContext,
    AppJson(payload): AppJson<CreateWatchlistRequest>,
) -> Result<(StatusCode, Json<WatchlistResponse>), AppError> {
    let user_id = ctx.require_user()?;
    let watchlist =
        watchlist_service::create(&state.pool, user_id, payload.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(watchlist)))
}

async fn delete_watchlist(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = ctx.require_user()?;
    watchlist_service::delete(&state.pool, user_id, id).await?;
    Ok(Json(json!({ "message": "Watchlist deleted" })))
}

async fn add_item(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<AddItemRequest>,
) -> Result<Json<WatchlistItem>, AppError> {
    let user_id = ctx.require_user()?;
    let item =
        watchlist_service::add_symbol(&state.pool, user_id, id, payload.symbol.as_deref()).await?;
    Ok(Json(item))
}

async fn remove_item(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((id, symbol)): Path<(i64, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = ctx.require_user()?;
    watchlist_service::remove_symbol(&state.pool, user_id, id, &symbol).await?;
    Ok(Json(json!({ "message": "Symbol removed" })))
}
