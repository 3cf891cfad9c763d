use axum::extract::{Path, State};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::json;
use tracing::info;

use crate::auth::context;
use crate::errors::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(company_news))
        .route_layer(middleware::from_fn_with_state(state, context::require_login))
}

async fn company_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let symbol = symbol.to_uppercase();
    info!("📰 Fetching news for {}", symbol);

    let news = state.quotes.company_news(&symbol).await?;
    Ok(Json(json!({ "news": news })))
}
