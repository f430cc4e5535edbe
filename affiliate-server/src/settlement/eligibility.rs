//! Earning eligibility
//!
//! A paid earning may be withdrawn once its order is delivered and the
//! longest item return window has fully elapsed.

use shared::models::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    OrderMissing,
    NotDelivered(OrderStatus),
    MissingDeliveredAt,
    /// Return window still open until the given instant (millis)
    ReturnWindowOpen { until: i64 },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Judge the order behind an earning at instant `now`
///
/// With a positive return window the instant must be strictly after
/// `delivered_at + max_return_days`; with none the order is eligible as
/// soon as it is delivered.
pub fn check(order: Option<&Order>, now: i64) -> Eligibility {
    let Some(order) = order else {
        return Eligibility::OrderMissing;
    };
    if order.status != OrderStatus::Delivered {
        return Eligibility::NotDelivered(order.status);
    }
    if order.delivered_at.is_none() {
        return Eligibility::MissingDeliveredAt;
    }
    if order.max_return_days() == 0 {
        return Eligibility::Eligible;
    }

    // A window ending past the i64 range never closes
    let until = order.return_window_ends_at().unwrap_or(i64::MAX);
    if now > until {
        Eligibility::Eligible
    } else {
        Eligibility::ReturnWindowOpen { until }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::OrderItem;
    use shared::util::DAY_MILLIS;

    const T: i64 = 1_770_000_000_000;

    fn order(status: OrderStatus, delivered_at: Option<i64>, policies: &[i32]) -> Order {
        Order {
            id: 1,
            order_number: "PM-1".into(),
            customer_uid: "cust-1".into(),
            status,
            total: Decimal::from(100),
            delivered_at,
            created_at: 0,
            items: policies
                .iter()
                .map(|&return_policy| OrderItem {
                    product_name: "Gamchha".into(),
                    quantity: 1,
                    price: Decimal::from(100),
                    return_policy,
                })
                .collect(),
        }
    }

    #[test]
    fn test_missing_order() {
        assert_eq!(check(None, T), Eligibility::OrderMissing);
    }

    #[test]
    fn test_undelivered_statuses_are_ineligible() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
        ] {
            let o = order(status, Some(T), &[0]);
            assert_eq!(check(Some(&o), T + DAY_MILLIS), Eligibility::NotDelivered(status));
        }
    }

    #[test]
    fn test_delivered_without_timestamp() {
        let o = order(OrderStatus::Delivered, None, &[0]);
        assert_eq!(check(Some(&o), T), Eligibility::MissingDeliveredAt);
    }

    #[test]
    fn test_no_return_policy_is_immediately_eligible() {
        let o = order(OrderStatus::Delivered, Some(T), &[0, 0]);
        assert!(check(Some(&o), T).is_eligible());

        let no_items = order(OrderStatus::Delivered, Some(T), &[]);
        assert!(check(Some(&no_items), T).is_eligible());
    }

    #[test]
    fn test_return_window_boundary_is_strict() {
        let o = order(OrderStatus::Delivered, Some(T), &[3, 7]);
        let end = T + 7 * DAY_MILLIS;

        assert_eq!(check(Some(&o), end), Eligibility::ReturnWindowOpen { until: end });
        assert!(!check(Some(&o), end - 1).is_eligible());
        assert!(check(Some(&o), end + 1_000).is_eligible());
    }

    #[test]
    fn test_far_future_delivery_keeps_window_open() {
        let o = order(OrderStatus::Delivered, Some(i64::MAX - 1_000), &[7]);
        assert_eq!(check(Some(&o), 0), Eligibility::ReturnWindowOpen { until: i64::MAX });
        assert_eq!(
            check(Some(&o), i64::MAX),
            Eligibility::ReturnWindowOpen { until: i64::MAX }
        );
    }

    #[test]
    fn test_negative_policies_count_as_zero() {
        let o = order(OrderStatus::Delivered, Some(T), &[-3]);
        assert!(check(Some(&o), T).is_eligible());
    }
}
