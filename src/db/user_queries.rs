use bigdecimal::BigDecimal;
use sqlx::{PgConnection, PgPool};

use crate::models::{NewUser, User};

pub async fn fetch_one(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, username, email, hashed_password, buying_power, created_at
         FROM users
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, username, email, hashed_password, buying_power, created_at
         FROM users
         ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, username, email, hashed_password, buying_power, created_at
         FROM users
         WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

pub async fn insert(pool: &PgPool, input: NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (first_name, last_name, username, email, hashed_password, buying_power)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, first_name, last_name, username, email, hashed_password, buying_power, created_at",
    )
    .bind(input.first_name)
    .bind(input.last_name)
    .bind(input.username)
    .bind(input.email)
    .bind(input.hashed_password)
    .bind(input.buying_power)
    .fetch_one(pool)
    .await
}

/// Withdraw cash inside an order transaction. Returns `None` when the user
/// does not exist or the balance cannot cover the amount; the guard and the
/// update are a single statement so concurrent orders cannot overdraw.
pub async fn debit_buying_power(
    conn: &mut PgConnection,
    user_id: i64,
    amount: &BigDecimal,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET buying_power = buying_power - $2
         WHERE id = $1 AND buying_power >= $2
         RETURNING id, first_name, last_name, username, email, hashed_password, buying_power, created_at",
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(conn)
    .await
}

/// Deposit sale proceeds inside an order transaction.
pub async fn credit_buying_power(
    conn: &mut PgConnection,
    user_id: i64,
    amount: &BigDecimal,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET buying_power = buying_power + $2
         WHERE id = $1
         RETURNING id, first_name, last_name, username, email, hashed_password, buying_power, created_at",
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(conn)
    .await
}
