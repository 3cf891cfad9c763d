use sqlx::PgPool;

use crate::models::{Watchlist, WatchlistItem};

pub async fn fetch_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Watchlist>, sqlx::Error> {
    sqlx::query_as::<_, Watchlist>(
        "SELECT id, user_id, name, created_at
         FROM watchlists
         WHERE user_id = $1
         ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Fetch one watchlist scoped to its owner; another user's id behaves like a
/// missing watchlist.
pub async fn fetch_one(
    pool: &PgPool,
    id: i64,
    user_id: i64,
) -> Result<Option<Watchlist>, sqlx::Error> {
    sqlx::query_as::<_, Watchlist>(
        "SELECT id, user_id, name, created_at
         FROM watchlists
         WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, user_id: i64, name: &str) -> Result<Watchlist, sqlx::Error> {
    sqlx::query_as::<_, Watchlist>(
        "INSERT INTO watchlists (user_id, name)
         VALUES ($1, $2)
         RETURNING id, user_id, name, created_at",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM watchlists WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Symbols for a batch of watchlists in one round trip, as
/// `(watchlist_id, symbol)` pairs.
pub async fn symbols_for_watchlists(
    pool: &PgPool,
    watchlist_ids: &[i64],
) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String)>(
        "SELECT watchlist_id, symbol
         FROM watchlist_items
         WHERE watchlist_id = ANY($1)
         ORDER BY created_at",
    )
    .bind(watchlist_ids)
    .fetch_all(pool)
    .await
}

/// Add a symbol to a watchlist. Returns `None` when the symbol is already on
/// the list; the unique constraint decides, not a read-then-write.
pub async fn add_item(
    pool: &PgPool,
    watchlist_id: i64,
    symbol: &str,
) -> Result<Option<WatchlistItem>, sqlx::Error> {
    sqlx::query_as::<_, WatchlistItem>(
        "INSERT INTO watchlist_items (watchlist_id, symbol)
         VALUES ($1, $2)
         ON CONFLICT (watchlist_id, symbol) DO NOTHING
         RETURNING id, watchlist_id, symbol, created_at",
    )
    .bind(watchlist_id)
    .bind(symbol)
    .fetch_optional(pool)
    .await
}

pub async fn remove_item(
    pool: &PgPool,
    watchlist_id: i64,
    symbol: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM watchlist_items WHERE watchlist_id = $1 AND symbol = $2")
        .bind(watchlist_id)
        .bind(symbol)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
