//! Route table for the order and product APIs

use crate::server::AppState;
use crate::server::{orders, products};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router with tracing and CORS layers applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route("/orders/{order_id}", get(orders::get_order_by_id))
        .route(
            "/orders/by-code/{order_code}",
            get(orders::get_order)
                .patch(orders::update_order_status)
                .delete(orders::cancel_order),
        )
        .route(
            "/orders/by-code/status-update/{order_code}",
            post(orders::apply_external_update),
        )
        .route("/orders/status/{order_code}", get(orders::get_order_status))
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products/{product_id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
