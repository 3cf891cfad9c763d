use bigdecimal::BigDecimal;
use sqlx::{PgConnection, PgPool};

use crate::models::Asset;

pub async fn fetch_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Asset>, sqlx::Error> {
    sqlx::query_as::<_, Asset>(
        "SELECT id, user_id, symbol, quantity, avg_price, created_at, updated_at
         FROM assets
         WHERE user_id = $1
         ORDER BY symbol",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Load one position for update inside an order transaction. The row lock
/// keeps two concurrent orders on the same symbol from both reading the
/// pre-trade quantity.
pub async fn lock_position(
    conn: &mut PgConnection,
    user_id: i64,
    symbol: &str,
) -> Result<Option<Asset>, sqlx::Error> {
    sqlx::query_as::<_, Asset>(
        "SELECT id, user_id, symbol, quantity, avg_price, created_at, updated_at
         FROM assets
         WHERE user_id = $1 AND symbol = $2
         FOR UPDATE",
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_optional(conn)
    .await
}

pub async fn insert_position(
    conn: &mut PgConnection,
    user_id: i64,
    symbol: &str,
    quantity: i64,
    avg_price: &BigDecimal,
) -> Result<Asset, sqlx::Error> {
    sqlx::query_as::<_, Asset>(
        "INSERT INTO assets (user_id, symbol, quantity, avg_price)
         VALUES ($1, $2, $3, $4)
         RETURNING id, user_id, symbol, quantity, avg_price, created_at, updated_at",
    )
    .bind(user_id)
    .bind(symbol)
    .bind(quantity)
    .bind(avg_price)
    .fetch_one(conn)
    .await
}

pub async fn update_position(
    conn: &mut PgConnection,
    id: i64,
    quantity: i64,
    avg_price: &BigDecimal,
) -> Result<Asset, sqlx::Error> {
    sqlx::query_as::<_, Asset>(
        "UPDATE assets
         SET quantity = $2, avg_price = $3, updated_at = NOW()
         WHERE id = $1
         RETURNING id, user_id, symbol, quantity, avg_price, created_at, updated_at",
    )
    .bind(id)
    .bind(quantity)
    .bind(avg_price)
    .fetch_one(conn)
    .await
}
