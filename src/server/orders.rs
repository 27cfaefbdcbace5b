//! HTTP handlers for the order lifecycle
//!
//! Routes:
//! - POST /orders - Create an order (201); commits only after the shipment
//!   provider confirmed
//! - GET /orders - List orders with skip/limit, newest updates first
//! - GET /orders/{order_id} - Lookup by internal id
//! - GET /orders/by-code/{order_code} - Full order aggregate
//! - PATCH /orders/by-code/{order_code} - Partial status update
//! - DELETE /orders/by-code/{order_code} - Cancel (soft status flip)
//! - POST /orders/by-code/status-update/{order_code} - Provider push;
//!   applies only the fields present in the payload
//! - GET /orders/status/{order_code} - Lightweight status projection

use crate::core::ShiplineResult;
use crate::server::AppState;
use crate::server::dto::{
    CreateOrderRequest, ListQuery, OrderResponse, OrderStatusResponse, UpdateOrderStatusRequest,
};
use crate::server::extract::ValidatedJson;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> ShiplineResult<Response> {
    let created = state.orders.create_order(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(created))).into_response())
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ShiplineResult<Json<Vec<OrderResponse>>> {
    let orders = state.orders.list(query.page()).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

pub async fn get_order_by_id(
    State(state): State<AppState>,
    Path(order_id): Path<uuid::Uuid>,
) -> ShiplineResult<Json<OrderResponse>> {
    let order = state.orders.get(&order_id).await?;
    Ok(Json(OrderResponse::from(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_code): Path<String>,
) -> ShiplineResult<Json<OrderResponse>> {
    let order = state.orders.get_by_code(&order_code).await?;
    Ok(Json(OrderResponse::from(order)))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_code): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> ShiplineResult<Json<OrderResponse>> {
    let updated = state
        .orders
        .update_order_status(&order_code, payload.into())
        .await?;
    Ok(Json(OrderResponse::from(updated)))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_code): Path<String>,
) -> ShiplineResult<Json<OrderResponse>> {
    let cancelled = state.orders.cancel_order(&order_code).await?;
    Ok(Json(OrderResponse::from(cancelled)))
}

/// Status pushes from the shipment provider land here. Same merge semantics
/// as the client PATCH, including the PENDING to CANCELLED gateway rule.
pub async fn apply_external_update(
    State(state): State<AppState>,
    Path(order_code): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> ShiplineResult<Json<OrderResponse>> {
    tracing::info!(%order_code, "external status update received");
    let updated = state
        .orders
        .update_order_status(&order_code, payload.into())
        .await?;
    Ok(Json(OrderResponse::from(updated)))
}

pub async fn get_order_status(
    State(state): State<AppState>,
    Path(order_code): Path<String>,
) -> ShiplineResult<Json<OrderStatusResponse>> {
    let order = state.orders.get_by_code(&order_code).await?;
    Ok(Json(OrderStatusResponse::from(&order.order)))
}
