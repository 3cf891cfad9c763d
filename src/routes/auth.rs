use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::auth::context::RequestContext;
use crate::auth::cookies;
use crate::errors::{AppError, AppJson};
use crate::models::{LoginRequest, SignupRequest, UserResponse};
use crate::services::auth_service;
use crate::state::AppState;
use crate::validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(whoami))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/signup", post(signup))
        .route("/unauthorized", get(unauthorized))
}

/// Session restore for the frontend. Anonymous callers get the errors body
/// with a 200; the frontend uses this on boot to detect logged-out state
/// without tripping its error interceptors.
///
/// `pub(crate)` so the app router can alias the trailing-slash spelling,
/// which nesting alone does not cover.
pub(crate) async fn whoami(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    match ctx.current_user_id {
        Some(user_id) => {
            let user = auth_service::enriched_user(&state.pool, user_id).await?;
            Ok(Json(user).into_response())
        }
        None => Ok(Json(json!({ "errors": ["Unauthorized"] })).into_response()),
    }
}

async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(HeaderMap, Json<UserResponse>), AppError> {
    let credentials = validate::validate_login(&payload)?;
    let user = auth_service::login(&state.pool, credentials).await?;

    let session_id = state.sessions.login(user.id);
    let enriched = auth_service::enriched_user(&state.pool, user.id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookies::session_cookie(&session_id, &state.config));
    Ok((headers, Json(enriched)))
}

/// Idempotent: with or without a live session the response is the same and
/// the cookie is cleared either way.
async fn logout(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> (HeaderMap, Json<serde_json::Value>) {
    if let Some(session_id) = &ctx.session_id {
        state.sessions.logout(session_id);
    }
    info!("👋 User logged out");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookies::clear_session_cookie(&state.config));
    (headers, Json(json!({ "message": "User logged out" })))
}

async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<(HeaderMap, Json<UserResponse>), AppError> {
    let fields = validate::validate_signup(&payload)?;
    let user = auth_service::signup(&state.pool, fields).await?;

    // A fresh account is logged in immediately.
    let session_id = state.sessions.login(user.id);
    let enriched = auth_service::enriched_user(&state.pool, user.id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookies::session_cookie(&session_id, &state.config));
    Ok((headers, Json(enriched)))
}

/// Fixed rejection target for anonymous requests to protected routes.
async fn unauthorized() -> AppError {
    AppError::Unauthorized
}
