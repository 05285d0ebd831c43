use axum::{
    Router,
    routing::{get, post, put},
};

use crate::api::handlers::{
    auth::{create_admin, login, logout, register, renew_token},
    health::health,
    orders::{cancel_order, create_order, list_orders, update_order_status},
    products::{create_product, delete_product, get_product, list_products, update_product},
};
use crate::middleware;
use crate::state::AppState;

/// Full URL space.
///
/// `/api/auth/*` is reachable without a session; everything else under
/// `/api` sits behind the cookie-authentication middleware, with
/// per-endpoint capability checks in the handlers.
pub fn routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/renew-token", post(renew_token))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}/cancel", put(cancel_order))
        .route("/api/orders/{id}/status", put(update_order_status));
    let protected = middleware::authenticate::apply(protected, state.clone());

    Router::new()
        .route("/_healthz", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/create-admin", post(create_admin))
        .merge(protected)
        .with_state(state)
}
