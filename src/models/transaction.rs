use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

// Ledger entry for an executed order. Rows are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub side: String,
    pub quantity: i64,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Raw order body; validation turns this into a `TradeOrder`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub symbol: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<BigDecimal>,
    pub csrf_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Side::Buy).unwrap(), "buy");
        assert_eq!(serde_json::to_value(Side::Sell).unwrap(), "sell");
        assert_eq!(Side::Buy.as_str(), "buy");
    }
}
