use bigdecimal::BigDecimal;
use sqlx::{PgConnection, PgPool};

use crate::models::Transaction;

pub async fn fetch_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        "SELECT id, user_id, symbol, side, quantity, price, created_at
         FROM transactions
         WHERE user_id = $1
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    user_id: i64,
    symbol: &str,
    side: &str,
    quantity: i64,
    price: &BigDecimal,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        "INSERT INTO transactions (user_id, symbol, side, quantity, price)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, user_id, symbol, side, quantity, price, created_at",
    )
    .bind(user_id)
    .bind(symbol)
    .bind(side)
    .bind(quantity)
    .bind(price)
    .fetch_one(conn)
    .await
}
