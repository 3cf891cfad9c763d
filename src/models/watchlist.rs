use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Watchlist {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchlistItem {
    pub id: i64,
    pub watchlist_id: i64,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}

/// Watchlist with its symbols flattened in, the shape the frontend renders.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistResponse {
    pub id: i64,
    pub name: String,
    pub symbols: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl WatchlistResponse {
    pub fn assemble(watchlist: Watchlist, symbols: Vec<String>) -> Self {
        Self {
            id: watchlist.id,
            name: watchlist.name,
            symbols,
            created_at: watchlist.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWatchlistRequest {
    pub name: Option<String>,
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemRequest {
    pub symbol: Option<String>,
    pub csrf_token: Option<String>,
}
