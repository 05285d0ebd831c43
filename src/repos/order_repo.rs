use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Order {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: f64,
}

/// Insert an order and its items in one transaction; returns the order id.
pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    total_amount: f64,
    items: &[NewOrderItem],
) -> RepoResult<Uuid> {
    let mut tx = db.begin().await?;

    let (order_id,): (Uuid,) = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO "order" (user_id, total_amount)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(total_amount)
    .fetch_one(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            r#"
            INSERT INTO "order_item" (id, order_id, product_id, quantity, price, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(order_id)
}

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, user_id, status, total_amount, created_at
        FROM "order"
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, quantity, price, created_at
            FROM "order_item"
            WHERE order_id = $1
            "#,
        )
        .bind(row.id)
        .fetch_all(db)
        .await?;

        orders.push(Order { order: row, items });
    }

    Ok(orders)
}

/// Cancel an order only while it is still pending. Cancelling an order in
/// any other state is a silent no-op.
pub async fn cancel_if_pending(db: &PgPool, order_id: Uuid) -> RepoResult<()> {
    sqlx::query(
        r#"
        UPDATE "order"
        SET status = 'cancelled', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(order_id)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn update_status(db: &PgPool, order_id: Uuid, status: &str) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE "order"
        SET status = $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2
        "#,
    )
    .bind(status)
    .bind(order_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
