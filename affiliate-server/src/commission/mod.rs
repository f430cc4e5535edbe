//! Commission lifecycle
//!
//! Order events that create affiliate earnings and move them from pending
//! to paid. Reaching `withdrawn` is left to the settlement engine.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AffiliateEarning, EarningCreate, EarningStatus, Order, OrderStatus};
use shared::util::MAX_TIMESTAMP_MILLIS;
use sqlx::SqlitePool;

use crate::db::repository::{earning, order, user};

async fn load_order(pool: &SqlitePool, order_id: i64) -> AppResult<Order> {
    order::find_by_id(pool, order_id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
    })
}

async fn transition_order(
    pool: &SqlitePool,
    order_id: i64,
    next: OrderStatus,
    delivered_at: Option<i64>,
) -> AppResult<Order> {
    let current = load_order(pool, order_id).await?;
    if !current.status.can_transition_to(next) {
        return Err(AppError::business_rule(
            ErrorCode::InvalidOrderTransition,
            format!("Order {} cannot move from {} to {}", current.order_number, current.status, next),
        ));
    }
    order::update_status(pool, order_id, next, delivered_at).await?;
    tracing::info!(order_id = order_id, from = %current.status, to = %next, "Order status changed");
    load_order(pool, order_id).await
}

/// Record the commission an affiliate earns on a referred order
pub async fn record_referral(
    pool: &SqlitePool,
    order_id: i64,
    affiliate_uid: &str,
    product_name: &str,
    commission_amount: Decimal,
) -> AppResult<AffiliateEarning> {
    if commission_amount <= Decimal::ZERO {
        return Err(AppError::business_rule(
            ErrorCode::InvalidCommissionAmount,
            format!("Commission must be positive, got {commission_amount}"),
        ));
    }

    let affiliate = user::find_by_uid(pool, affiliate_uid).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::UserNotFound, format!("User {affiliate_uid} not found"))
    })?;
    if !affiliate.is_affiliate {
        return Err(AppError::business_rule(
            ErrorCode::NotAffiliate,
            format!("User {affiliate_uid} is not an affiliate"),
        ));
    }

    let referred = load_order(pool, order_id).await?;
    let created = earning::create(
        pool,
        EarningCreate {
            affiliate_uid: affiliate.uid,
            order_id,
            order_number: referred.order_number,
            product_name: product_name.to_string(),
            commission_amount,
        },
    )
    .await?;

    tracing::info!(
        affiliate_uid = %created.affiliate_uid,
        order_id = order_id,
        earning_id = created.id,
        amount = %created.commission_amount,
        "Referral commission recorded"
    );
    Ok(created)
}

/// Confirm an order; its pending earnings become paid
///
/// Returns the number of earnings moved to paid.
pub async fn confirm_order(pool: &SqlitePool, order_id: i64) -> AppResult<u64> {
    transition_order(pool, order_id, OrderStatus::Confirmed, None).await?;
    let paid = earning::transition_for_order(pool, order_id, EarningStatus::Pending, EarningStatus::Paid).await?;
    tracing::info!(order_id = order_id, earnings = paid, "Order confirmed, commissions paid");
    Ok(paid)
}

pub async fn mark_shipped(pool: &SqlitePool, order_id: i64) -> AppResult<Order> {
    transition_order(pool, order_id, OrderStatus::Shipped, None).await
}

/// Mark an order delivered at `delivered_at` (Unix millis)
///
/// Starts the return window that holds back its earnings.
pub async fn mark_delivered(pool: &SqlitePool, order_id: i64, delivered_at: i64) -> AppResult<Order> {
    if !(0..=MAX_TIMESTAMP_MILLIS).contains(&delivered_at) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Delivery time {delivered_at} is out of range"),
        ));
    }
    transition_order(pool, order_id, OrderStatus::Delivered, Some(delivered_at)).await
}

/// Cancel an order; earnings still pending are never paid
pub async fn cancel_order(pool: &SqlitePool, order_id: i64) -> AppResult<Order> {
    transition_order(pool, order_id, OrderStatus::Cancelled, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use shared::models::{OrderCreate, OrderItem, UserCreate};

    async fn seed(pool: &SqlitePool) -> i64 {
        for (uid, is_affiliate) in [("aff-1", true), ("shopper", false)] {
            user::create(
                pool,
                UserCreate {
                    uid: uid.into(),
                    display_name: uid.into(),
                    email: None,
                    is_affiliate,
                    payout_info: None,
                },
            )
            .await
            .unwrap();
        }
        order::create(
            pool,
            OrderCreate {
                order_number: "PM-77".into(),
                customer_uid: "shopper".into(),
                items: vec![OrderItem {
                    product_name: "Lungi".into(),
                    quantity: 2,
                    price: Decimal::from(450),
                    return_policy: 3,
                }],
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_referral_then_confirm_pays_commission() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;

        let created = record_referral(&pool, order_id, "aff-1", "Lungi", Decimal::from(45))
            .await
            .unwrap();
        assert_eq!(created.status, EarningStatus::Pending);
        assert_eq!(created.order_number, "PM-77");

        assert_eq!(confirm_order(&pool, order_id).await.unwrap(), 1);
        let stored = earning::find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, EarningStatus::Paid);
    }

    #[tokio::test]
    async fn test_referral_validation() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;

        let zero = record_referral(&pool, order_id, "aff-1", "Lungi", Decimal::ZERO).await;
        assert_eq!(zero.unwrap_err().code, ErrorCode::InvalidCommissionAmount);

        let unknown = record_referral(&pool, order_id, "ghost", "Lungi", Decimal::ONE).await;
        assert_eq!(unknown.unwrap_err().code, ErrorCode::UserNotFound);

        let shopper = record_referral(&pool, order_id, "shopper", "Lungi", Decimal::ONE).await;
        assert_eq!(shopper.unwrap_err().code, ErrorCode::NotAffiliate);

        let no_order = record_referral(&pool, 1, "aff-1", "Lungi", Decimal::ONE).await;
        assert_eq!(no_order.unwrap_err().code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn test_delivery_sets_timestamp() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        confirm_order(&pool, order_id).await.unwrap();
        mark_shipped(&pool, order_id).await.unwrap();

        let delivered = mark_delivered(&pool, order_id, 1_770_000_000_000).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(delivered.delivered_at, Some(1_770_000_000_000));
    }

    #[tokio::test]
    async fn test_delivery_time_out_of_range_is_rejected() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        confirm_order(&pool, order_id).await.unwrap();

        for delivered_at in [-1, MAX_TIMESTAMP_MILLIS + 1, i64::MAX - 1_000] {
            let err = mark_delivered(&pool, order_id, delivered_at).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        }
        let stored = order::find_by_id(&pool, order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.delivered_at, None);

        let delivered = mark_delivered(&pool, order_id, MAX_TIMESTAMP_MILLIS).await.unwrap();
        assert_eq!(delivered.delivered_at, Some(MAX_TIMESTAMP_MILLIS));
    }

    #[tokio::test]
    async fn test_invalid_transitions_are_rejected() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;

        let early = mark_delivered(&pool, order_id, 0).await;
        assert_eq!(early.unwrap_err().code, ErrorCode::InvalidOrderTransition);

        confirm_order(&pool, order_id).await.unwrap();
        mark_delivered(&pool, order_id, 0).await.unwrap();
        let late = cancel_order(&pool, order_id).await;
        assert_eq!(late.unwrap_err().code, ErrorCode::InvalidOrderTransition);
    }

    #[tokio::test]
    async fn test_cancelled_order_leaves_commission_pending() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        let created = record_referral(&pool, order_id, "aff-1", "Lungi", Decimal::from(45))
            .await
            .unwrap();

        cancel_order(&pool, order_id).await.unwrap();
        assert_eq!(
            confirm_order(&pool, order_id).await.unwrap_err().code,
            ErrorCode::InvalidOrderTransition
        );
        let stored = earning::find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, EarningStatus::Pending);
    }
}
