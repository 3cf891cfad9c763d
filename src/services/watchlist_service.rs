use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use crate::db::watchlist_queries;
use crate::errors::AppError;
use crate::models::{Watchlist, WatchlistItem, WatchlistResponse};
use crate::validate::ValidationErrors;

/// All of a user's watchlists with their symbols, fetched in two round
/// trips rather than one query per list.
pub async fn list(pool: &PgPool, user_id: i64) -> Result<Vec<WatchlistResponse>, AppError> {
    let watchlists = watchlist_queries::fetch_for_user(pool, user_id).await?;
    let ids: Vec<i64> = watchlists.iter().map(|w| w.id).collect();

    let mut symbols_by_list: HashMap<i64, Vec<String>> = HashMap::new();
    for (watchlist_id, symbol) in watchlist_queries::symbols_for_watchlists(pool, &ids).await? {
        symbols_by_list.entry(watchlist_id).or_default().push(symbol);
    }

    Ok(watchlists
        .into_iter()
        .map(|w| {
            let symbols = symbols_by_list.remove(&w.id).unwrap_or_default();
            WatchlistResponse::assemble(w, symbols)
        })
        .collect())
}

pub async fn get(pool: &PgPool, user_id: i64, id: i64) -> Result<WatchlistResponse, AppError> {
    let watchlist = owned_watchlist(pool, user_id, id).await?;
    let symbols = watchlist_queries::symbols_for_watchlists(pool, &[id])
        .await?
        .into_iter()
        .map(|(_, symbol)| symbol)
        .collect();
    Ok(WatchlistResponse::assemble(watchlist, symbols))
}

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    name: Option<&str>,
) -> Result<WatchlistResponse, AppError> {
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => {
            let mut errors = ValidationErrors::new();
            errors.add("name", "This field is required.");
            return Err(errors.into());
        }
    };

    let watchlist = watchlist_queries::insert(pool, user_id, name).await?;
    info!("📋 User {} created watchlist {}", user_id, watchlist.id);
    Ok(WatchlistResponse::assemble(watchlist, Vec::new()))
}

pub async fn delete(pool: &PgPool, user_id: i64, id: i64) -> Result<(), AppError> {
    let deleted = watchlist_queries::delete(pool, id, user_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    info!("🗑️ User {} deleted watchlist {}", user_id, id);
    Ok(())
}

pub async fn add_symbol(
    pool: &PgPool,
    user_id: i64,
    id: i64,
    symbol: Option<&str>,
) -> Result<WatchlistItem, AppError> {
    owned_watchlist(pool, user_id, id).await?;

    let symbol = match symbol.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_uppercase(),
        _ => {
            let mut errors = ValidationErrors::new();
            errors.add("symbol", "This field is required.");
            return Err(errors.into());
        }
    };

    match watchlist_queries::add_item(pool, id, &symbol).await? {
        Some(item) => Ok(item),
        None => {
            let mut errors = ValidationErrors::new();
            errors.add("symbol", "Symbol is already on this watchlist.");
            Err(errors.into())
        }
    }
}

pub async fn remove_symbol(
    pool: &PgPool,
    user_id: i64,
    id: i64,
    symbol: &str,
) -> Result<(), AppError> {
    owned_watchlist(pool, user_id, id).await?;

    let removed = watchlist_queries::remove_item(pool, id, &symbol.to_uppercase()).await?;
    if removed == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Ownership gate shared by every per-watchlist operation.
async fn owned_watchlist(pool: &PgPool, user_id: i64, id: i64) -> Result<Watchlist, AppError> {
    watchlist_queries::fetch_one(pool, id, user_id)
        .await?
        .ok_or(AppError::NotFound)
}
