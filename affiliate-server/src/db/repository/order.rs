//! Order Repository

use super::{RepoError, RepoResult};
use crate::core::MAX_ID_BATCH;
use shared::models::{Order, OrderCreate, OrderItem, OrderStatus};
use shared::money::{parse_amount, to_storage};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_uid: String,
    status: OrderStatus,
    total: String,
    delivered_at: Option<i64>,
    created_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i64,
    product_name: String,
    quantity: i32,
    price: String,
    return_policy: i32,
}

impl OrderItemRow {
    fn into_item(self) -> RepoResult<OrderItem> {
        Ok(OrderItem {
            product_name: self.product_name,
            quantity: self.quantity,
            price: parse_amount(&self.price)?,
            return_policy: self.return_policy,
        })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> RepoResult<Order> {
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_uid: self.customer_uid,
            status: self.status,
            total: parse_amount(&self.total)?,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
            items,
        })
    }
}

/// Insert an order with its line items in one transaction
pub async fn create(pool: &SqlitePool, data: OrderCreate) -> RepoResult<Order> {
    if data.items.is_empty() {
        return Err(RepoError::Validation("order has no items".into()));
    }
    if data.items.iter().any(|item| item.quantity <= 0) {
        return Err(RepoError::Validation("item quantity must be positive".into()));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let total = data.total();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO orders (id, order_number, customer_uid, status, total, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(&data.order_number)
    .bind(&data.customer_uid)
    .bind(OrderStatus::Pending)
    .bind(to_storage(total))
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in &data.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_name, quantity, price, return_policy) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(to_storage(item.price))
        .bind(item.return_policy)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(Order {
        id,
        order_number: data.order_number,
        customer_uid: data.customer_uid,
        status: OrderStatus::Pending,
        total,
        delivered_at: None,
        created_at: now,
        items: data.items,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    Ok(find_by_ids(pool, &[id]).await?.into_iter().next())
}

/// Load orders (with items) for one `IN (...)` batch
///
/// Ids that do not exist are simply absent from the result. At most
/// `MAX_ID_BATCH` ids are accepted per call.
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Order>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    if ids.len() > MAX_ID_BATCH {
        return Err(RepoError::Validation(format!(
            "at most {MAX_ID_BATCH} ids per lookup, got {}",
            ids.len()
        )));
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, order_number, customer_uid, status, total, delivered_at, created_at \
         FROM orders WHERE id IN (",
    );
    let mut sep = qb.separated(", ");
    for id in ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(") ORDER BY id");
    let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT order_id, product_name, quantity, price, return_policy \
         FROM order_items WHERE order_id IN (",
    );
    let mut sep = qb.separated(", ");
    for id in ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(") ORDER BY id");
    let item_rows: Vec<OrderItemRow> = qb.build_query_as().fetch_all(pool).await?;

    let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for row in item_rows {
        let order_id = row.order_id;
        items_by_order
            .entry(order_id)
            .or_default()
            .push(row.into_item()?);
    }

    rows.into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}

/// Write a new status; `delivered_at` is set only when provided
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: OrderStatus,
    delivered_at: Option<i64>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, delivered_at = COALESCE(?2, delivered_at) WHERE id = ?3",
    )
    .bind(status)
    .bind(delivered_at)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use rust_decimal::Decimal;

    fn item(name: &str, price: i64, return_policy: i32) -> OrderItem {
        OrderItem {
            product_name: name.into(),
            quantity: 1,
            price: Decimal::from(price),
            return_policy,
        }
    }

    fn new_order(number: &str) -> OrderCreate {
        OrderCreate {
            order_number: number.into(),
            customer_uid: "cust-1".into(),
            items: vec![item("Panjabi", 1200, 7), item("Tupi", 150, 3)],
        }
    }

    #[tokio::test]
    async fn test_create_and_find_with_items() {
        let pool = test_pool().await;
        let created = create(&pool, new_order("PM-1001")).await.unwrap();
        assert_eq!(created.total, Decimal::from(1350));

        let found = find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.items.len(), 2);
        assert_eq!(found.max_return_days(), 7);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_order() {
        let pool = test_pool().await;
        let empty = OrderCreate {
            items: vec![],
            ..new_order("PM-1")
        };
        assert!(matches!(create(&pool, empty).await, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_missing_and_enforces_limit() {
        let pool = test_pool().await;
        let a = create(&pool, new_order("PM-A")).await.unwrap();
        let b = create(&pool, new_order("PM-B")).await.unwrap();

        let found = find_by_ids(&pool, &[a.id, 42, b.id]).await.unwrap();
        let mut ids: Vec<i64> = found.iter().map(|o| o.id).collect();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
        assert!(found.iter().all(|o| o.items.len() == 2));

        assert!(find_by_ids(&pool, &[]).await.unwrap().is_empty());

        let too_many: Vec<i64> = (0..=MAX_ID_BATCH as i64).collect();
        assert!(matches!(
            find_by_ids(&pool, &too_many).await,
            Err(RepoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_status_keeps_delivered_at() {
        let pool = test_pool().await;
        let order = create(&pool, new_order("PM-1")).await.unwrap();

        update_status(&pool, order.id, OrderStatus::Delivered, Some(5_000))
            .await
            .unwrap();
        update_status(&pool, order.id, OrderStatus::Delivered, None)
            .await
            .unwrap();

        let found = find_by_id(&pool, order.id).await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Delivered);
        assert_eq!(found.delivered_at, Some(5_000));

        let missing = update_status(&pool, 1, OrderStatus::Cancelled, None).await;
        assert!(matches!(missing, Err(RepoError::NotFound(_))));
    }
}
