use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Asset;

/// Account row as stored. The password hash never leaves the server, so it
/// is excluded from serialization outright.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub buying_power: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a freshly validated signup. The password is already
/// hashed by the time this struct exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub buying_power: BigDecimal,
}

/// The user payload the frontend works with: public account fields plus the
/// holdings keyed by symbol and their combined cost basis.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub buying_power: BigDecimal,
    pub assets: BTreeMap<String, Asset>,
    #[serde(rename = "totalStock")]
    pub total_stock: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Combine an account row with its materialized holdings.
    ///
    /// `totalStock` is the acquisition cost of everything held, quantity
    /// times average price summed over all symbols, not a live market value.
    pub fn enrich(user: User, assets: Vec<Asset>) -> Self {
        let mut by_symbol = BTreeMap::new();
        let mut total_stock = BigDecimal::from(0);
        for asset in assets {
            total_stock += BigDecimal::from(asset.quantity) * &asset.avg_price;
            by_symbol.insert(asset.symbol.clone(), asset);
        }
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            buying_power: user.buying_power,
            assets: by_symbol,
            total_stock,
            created_at: user.created_at,
        }
    }
}

/// Raw login body. Every field is optional so that validation, not
/// deserialization, decides what is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub buying_power: Option<BigDecimal>,
    pub csrf_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            buying_power: BigDecimal::from(10_000),
            created_at: Utc::now(),
        }
    }

    fn holding(id: i64, symbol: &str, quantity: i64, avg_price: i64) -> Asset {
        Asset {
            id,
            user_id: 1,
            symbol: symbol.into(),
            quantity,
            avg_price: BigDecimal::from(avg_price),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn enrich_totals_cost_basis_over_all_holdings() {
        let assets = vec![holding(1, "AAPL", 2, 100), holding(2, "TSLA", 1, 50)];
        let response = UserResponse::enrich(sample_user(), assets);
        assert_eq!(response.total_stock, BigDecimal::from(250));
        assert_eq!(response.assets.len(), 2);
        assert_eq!(response.assets["AAPL"].quantity, 2);
    }

    #[test]
    fn enrich_with_no_holdings_totals_zero() {
        let response = UserResponse::enrich(sample_user(), vec![]);
        assert_eq!(response.total_stock, BigDecimal::from(0));
        assert!(response.assets.is_empty());
    }

    #[test]
    fn serialized_user_never_exposes_the_password_hash() {
        let response = UserResponse::enrich(sample_user(), vec![holding(1, "AAPL", 2, 100)]);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["totalStock"], "200");
        assert_eq!(json["email"], "ada@example.com");

        let row = serde_json::to_value(sample_user()).unwrap();
        assert!(row.get("hashed_password").is_none());
    }
}
