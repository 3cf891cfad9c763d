use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;
use tracing::info;

use crate::auth::context::{self, RequestContext};
use crate::errors::{AppError, AppJson};
use crate::external::quote_provider::Quote;
use crate::models::{TradeRequest, UserResponse};
use crate::services::trading_service;
use crate::state::AppState;
use crate::validate;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/buy", post(buy))
        .route("/sell", post(sell))
        .route("/transactions", get(transactions))
        .route("/quote/:symbol", get(quote))
        .route_layer(middleware::from_fn_with_state(state, context::require_login))
}

async fn buy(
    State(state): State<AppState>,
    ctx: RequestContext,
    AppJson(payload): AppJson<TradeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = ctx.require_user()?;
    let order = validate::validate_trade(&payload)?;

    info!("🛒 User {} buying {} {}", user_id, order.quantity, order.symbol);
    let user = trading_service::buy(&state.pool, user_id, order).await?;
    Ok(Json(user))
}

async fn sell(
    State(state): State<AppState>,
    ctx: RequestContext,
    AppJson(payload): AppJson<TradeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = ctx.require_user()?;
    let order = validate::validate_trade(&payload)?;

    info!("🏷️ User {} selling {} {}", user_id, order.quantity, order.symbol);
    let user = trading_service::sell(&state.pool, user_id, order).await?;
    Ok(Json(user))
}

async fn transactions(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = ctx.require_user()?;
    let transactions = trading_service::history(&state.pool, user_id).await?;
    Ok(Json(json!({ "transactions": transactions })))
}

async fn quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, AppError> {
    let symbol = symbol.to_uppercase();
    let quote = state.quotes.quote(&symbol).await?;
    Ok(Json(quote))
}
