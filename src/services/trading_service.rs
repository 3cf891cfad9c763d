use bigdecimal::BigDecimal;
use sqlx::PgPool;
use tracing::info;

use crate::db::{asset_queries, transaction_queries, user_queries};
use crate::errors::AppError;
use crate::models::{Asset, Side, Transaction, UserResponse};
use crate::services::auth_service;
use crate::validate::{TradeOrder, ValidationErrors};

/// Average acquisition price after buying `quantity` more shares at `price`
/// on top of an existing position. Volume-weighted, exact decimal math.
fn weighted_average(
    old_quantity: i64,
    old_avg: &BigDecimal,
    quantity: i64,
    price: &BigDecimal,
) -> BigDecimal {
    let old_cost = BigDecimal::from(old_quantity) * old_avg;
    let new_cost = BigDecimal::from(quantity) * price;
    (old_cost + new_cost) / BigDecimal::from(old_quantity + quantity)
}

fn order_rejected(field: &str, message: &str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, message);
    errors.into()
}

/// Execute a buy: debit cash, fold the shares into the position at the
/// volume-weighted average, and append a ledger entry. One transaction, so
/// a failure at any step leaves nothing half-applied.
///
/// Lock order is position row before user row; `sell` acquires in the same
/// order.
pub async fn buy(pool: &PgPool, user_id: i64, order: TradeOrder) -> Result<UserResponse, AppError> {
    let cost = BigDecimal::from(order.quantity) * &order.price;

    let mut tx = pool.begin().await?;

    let position = asset_queries::lock_position(&mut tx, user_id, &order.symbol).await?;

    if user_queries::debit_buying_power(&mut tx, user_id, &cost)
        .await?
        .is_none()
    {
        return Err(order_rejected(
            "buying_power",
            "Insufficient buying power for this order.",
        ));
    }

    match position {
        Some(position) => {
            let avg = weighted_average(
                position.quantity,
                &position.avg_price,
                order.quantity,
                &order.price,
            );
            asset_queries::update_position(
                &mut tx,
                position.id,
                position.quantity + order.quantity,
                &avg,
            )
            .await?;
        }
        None => {
            asset_queries::insert_position(
                &mut tx,
                user_id,
                &order.symbol,
                order.quantity,
                &order.price,
            )
            .await
            .map_err(map_position_conflict)?;
        }
    }

    transaction_queries::insert(
        &mut tx,
        user_id,
        &order.symbol,
        Side::Buy.as_str(),
        order.quantity,
        &order.price,
    )
    .await?;

    tx.commit().await?;

    info!(
        "💸 User {} bought {} {} @ {}",
        user_id, order.quantity, order.symbol, order.price
    );

    auth_service::enriched_user(pool, user_id).await
}

/// Decide a sell against the locked position: it must exist and cover the
/// requested quantity. Returns the position with the share count left after
/// the sale; zero is valid and keeps the row.
fn check_sell(position: Option<Asset>, quantity: i64) -> Result<(Asset, i64), AppError> {
    match position {
        None => Err(order_rejected(
            "symbol",
            "You do not own any shares of this stock.",
        )),
        Some(position) if position.quantity < quantity => Err(order_rejected(
            "quantity",
            "You cannot sell more shares than you own.",
        )),
        Some(position) => {
            let remaining = position.quantity - quantity;
            Ok((position, remaining))
        }
    }
}

/// Execute a sell: shrink the position, credit the proceeds, and append a
/// ledger entry. Selling never moves the average price; a position sold down
/// to zero keeps its row.
pub async fn sell(pool: &PgPool, user_id: i64, order: TradeOrder) -> Result<UserResponse, AppError> {
    let mut tx = pool.begin().await?;

    let position = asset_queries::lock_position(&mut tx, user_id, &order.symbol).await?;
    let (position, remaining) = check_sell(position, order.quantity)?;

    asset_queries::update_position(&mut tx, position.id, remaining, &position.avg_price).await?;

    let proceeds = BigDecimal::from(order.quantity) * &order.price;
    if user_queries::credit_buying_power(&mut tx, user_id, &proceeds)
        .await?
        .is_none()
    {
        return Err(AppError::Unauthorized);
    }

    transaction_queries::insert(
        &mut tx,
        user_id,
        &order.symbol,
        Side::Sell.as_str(),
        order.quantity,
        &order.price,
    )
    .await?;

    tx.commit().await?;

    info!(
        "💰 User {} sold {} {} @ {}",
        user_id, order.quantity, order.symbol, order.price
    );

    auth_service::enriched_user(pool, user_id).await
}

pub async fn history(pool: &PgPool, user_id: i64) -> Result<Vec<Transaction>, AppError> {
    transaction_queries::fetch_for_user(pool, user_id)
        .await
        .map_err(AppError::Db)
}

/// Two concurrent first buys of the same symbol can both miss the existing
/// position and race to insert it; the unique index turns the loser into a
/// retryable rejection instead of a server fault.
fn map_position_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            return order_rejected("symbol", "Position changed concurrently, retry the order.");
        }
    }
    AppError::Db(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn held_position(quantity: i64, avg_price: i64) -> Asset {
        Asset {
            id: 1,
            user_id: 7,
            symbol: "AAPL".into(),
            quantity,
            avg_price: BigDecimal::from(avg_price),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rejection_messages(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_messages(),
            other => panic!("expected a validation rejection, got {:?}", other),
        }
    }

    #[test]
    fn weighted_average_blends_lots_by_volume() {
        let avg = weighted_average(2, &BigDecimal::from(100), 2, &BigDecimal::from(200));
        assert_eq!(avg, BigDecimal::from(150));

        let avg = weighted_average(1, &BigDecimal::from(100), 3, &BigDecimal::from(300));
        assert_eq!(avg, BigDecimal::from(250));
    }

    #[test]
    fn weighted_average_handles_fractional_prices() {
        let avg = weighted_average(
            1,
            &BigDecimal::from_str("10.50").unwrap(),
            1,
            &BigDecimal::from_str("11.50").unwrap(),
        );
        assert_eq!(avg, BigDecimal::from(11));
    }

    #[test]
    fn rebuying_a_sold_out_position_takes_the_new_price() {
        let avg = weighted_average(0, &BigDecimal::from(75), 4, &BigDecimal::from(120));
        assert_eq!(avg, BigDecimal::from(120));
    }

    #[test]
    fn selling_an_unheld_symbol_is_rejected() {
        let err = check_sell(None, 1).unwrap_err();
        assert_eq!(
            rejection_messages(err),
            vec!["symbol : You do not own any shares of this stock."]
        );
    }

    #[test]
    fn overselling_is_rejected() {
        let err = check_sell(Some(held_position(3, 100)), 5).unwrap_err();
        assert_eq!(
            rejection_messages(err),
            vec!["quantity : You cannot sell more shares than you own."]
        );
    }

    #[test]
    fn selling_out_leaves_a_zero_share_row_with_the_average_intact() {
        let (position, remaining) = check_sell(Some(held_position(3, 100)), 3).unwrap();
        assert_eq!(remaining, 0);
        assert_eq!(position.avg_price, BigDecimal::from(100));
    }

    #[test]
    fn partial_sells_reduce_the_share_count() {
        let (_, remaining) = check_sell(Some(held_position(5, 100)), 2).unwrap();
        assert_eq!(remaining, 3);
    }
}
