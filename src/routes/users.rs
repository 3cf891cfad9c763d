use axum::extract::{Path, State};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::json;

use crate::auth::context;
use crate::errors::AppError;
use crate::models::UserResponse;
use crate::services::auth_service;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route_layer(middleware::from_fn_with_state(state, context::require_login))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let users = auth_service::list_users(&state.pool).await?;
    Ok(Json(json!({ "users": users })))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_service::get_user(&state.pool, id).await?;
    Ok(Json(user))
}
