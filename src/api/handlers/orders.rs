use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::dto::MessageResponse;
use crate::api::dto::orders::{OrderPayload, OrderUpdatePayload};
use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::repos::order_repo::{self, NewOrderItem, Order};
use crate::repos::product_repo;
use crate::services::auth::roles::Capability;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    pub error: bool,
    pub msg: &'static str,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub error: bool,
    pub orders: Vec<Order>,
}

pub async fn create_order(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Json(payload): Json<OrderPayload>,
) -> Result<Json<OrderCreatedResponse>, AppError> {
    ctx.require(Capability::OrderCreate)?;
    payload.validate().map_err(AppError::bad_request)?;

    // Every line is checked against the catalog before anything is written:
    // the quoted price must match and the stock must cover the quantity.
    let mut items = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let product = product_repo::get(&state.db, item.product_id)
            .await?
            .ok_or(AppError::not_found("product"))?;

        if item.quantity > product.units_in_stock {
            warn!(product_id = %product.id, "order quantity exceeds stock");
            return Err(AppError::bad_request(
                "product quantity greater than units in stock",
            ));
        }
        if (item.price - product.price).abs() > f64::EPSILON {
            warn!(product_id = %product.id, "order item price differs from product price");
            return Err(AppError::bad_request("item price differs from product price"));
        }

        items.push(NewOrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        });
    }

    let order_id = order_repo::create(&state.db, ctx.user_id, payload.total(), &items).await?;

    info!(order_id = %order_id, user_id = %ctx.user_id, "order placed");
    Ok(Json(OrderCreatedResponse {
        error: false,
        msg: "Order placed successfully",
        order_id,
    }))
}

pub async fn list_orders(
    State(state): State<AppState>,
    ctx: AuthCtx,
) -> Result<Json<OrderListResponse>, AppError> {
    ctx.require(Capability::OrderRead)?;

    let orders = order_repo::list_for_user(&state.db, ctx.user_id).await?;
    Ok(Json(OrderListResponse {
        error: false,
        orders,
    }))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Path(order_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.require(Capability::OrderCancel)?;

    order_repo::cancel_if_pending(&state.db, order_id).await?;

    info!(order_id = %order_id, user_id = %ctx.user_id, "order cancelled");
    Ok(Json(MessageResponse {
        error: false,
        msg: "Order cancelled successfully",
    }))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<OrderUpdatePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.require(Capability::OrderUpdate)?;
    payload.validate().map_err(AppError::bad_request)?;

    let updated = order_repo::update_status(&state.db, order_id, &payload.status).await?;
    if !updated {
        return Err(AppError::not_found("order"));
    }

    info!(order_id = %order_id, status = %payload.status, "order status updated");
    Ok(Json(MessageResponse {
        error: false,
        msg: "Order status updated successfully",
    }))
}
