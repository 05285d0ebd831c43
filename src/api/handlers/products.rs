use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::dto::MessageResponse;
use crate::api::dto::products::ProductPayload;
use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::repos::product_repo::{self, ProductRow};
use crate::services::auth::roles::Capability;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub error: bool,
    pub product: ProductRow,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub error: bool,
    pub products: Vec<ProductRow>,
}

pub async fn create_product(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductResponse>, AppError> {
    ctx.require(Capability::ProductCreate)?;
    payload.validate().map_err(AppError::bad_request)?;

    let product = product_repo::create(
        &state.db,
        payload.name.trim(),
        payload.description.as_deref(),
        payload.price,
        payload.units_in_stock,
    )
    .await?;

    info!(product_id = %product.id, "product created");
    Ok(Json(ProductResponse {
        error: false,
        product,
    }))
}

pub async fn list_products(
    State(state): State<AppState>,
    ctx: AuthCtx,
) -> Result<Response, AppError> {
    ctx.require(Capability::ProductRead)?;

    let products = product_repo::list(&state.db).await?;
    if products.is_empty() {
        return Ok(Json(MessageResponse {
            error: false,
            msg: "no products found",
        })
        .into_response());
    }

    Ok(Json(ProductListResponse {
        error: false,
        products,
    })
    .into_response())
}

pub async fn get_product(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    ctx.require(Capability::ProductRead)?;

    let product = product_repo::get(&state.db, product_id)
        .await?
        .ok_or(AppError::not_found("product"))?;

    Ok(Json(ProductResponse {
        error: false,
        product,
    }))
}

pub async fn update_product(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductResponse>, AppError> {
    ctx.require(Capability::ProductUpdate)?;
    payload.validate().map_err(AppError::bad_request)?;

    let product = product_repo::update(
        &state.db,
        product_id,
        payload.name.trim(),
        payload.description.as_deref(),
        payload.price,
        payload.units_in_stock,
    )
    .await?
    .ok_or(AppError::not_found("product"))?;

    info!(product_id = %product.id, "product updated");
    Ok(Json(ProductResponse {
        error: false,
        product,
    }))
}

pub async fn delete_product(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Path(product_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.require(Capability::ProductDelete)?;

    let deleted = product_repo::delete(&state.db, product_id).await?;
    if !deleted {
        return Err(AppError::not_found("product"));
    }

    info!(product_id = %product_id, "product deleted");
    Ok(Json(MessageResponse {
        error: false,
        msg: "product deleted successfully",
    }))
}
