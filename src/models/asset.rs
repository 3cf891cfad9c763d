use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user's holding in a single ticker, carried at the volume-weighted
/// average acquisition price. A quantity of zero means the position was sold
/// out; the row stays so the average survives if the user buys back in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub quantity: i64,
    pub avg_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
