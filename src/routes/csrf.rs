use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restore", get(restore))
}

/// Hand the SPA a usable CSRF pair after a hard refresh. The body starts
/// empty; the response layer sets the token cookie and injects the matching
/// `csrf_token` field, exactly as it does for every other JSON response.
async fn restore() -> Json<serde_json::Value> {
    Json(json!({}))
}
