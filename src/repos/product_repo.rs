use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub units_in_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create(
    db: &PgPool,
    name: &str,
    description: Option<&str>,
    price: f64,
    units_in_stock: i32,
) -> RepoResult<ProductRow> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        INSERT INTO "product" (id, name, description, price, units_in_stock, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        RETURNING id, name, description, price, units_in_stock, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(units_in_stock)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, product_id: Uuid) -> RepoResult<Option<ProductRow>> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, price, units_in_stock, created_at, updated_at
        FROM "product"
        WHERE id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn list(db: &PgPool) -> RepoResult<Vec<ProductRow>> {
    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, price, units_in_stock, created_at, updated_at
        FROM "product"
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn update(
    db: &PgPool,
    product_id: Uuid,
    name: &str,
    description: Option<&str>,
    price: f64,
    units_in_stock: i32,
) -> RepoResult<Option<ProductRow>> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        UPDATE "product"
        SET name = $2, description = $3, price = $4, units_in_stock = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, description, price, units_in_stock, created_at, updated_at
        "#,
    )
    .bind(product_id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(units_in_stock)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, product_id: Uuid) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM "product"
        WHERE id = $1
        "#,
    )
    .bind(product_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
