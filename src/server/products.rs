//! HTTP handlers for the product catalog
//!
//! Routes:
//! - POST /products - Create a product (201)
//! - GET /products - List products with skip/limit
//! - GET /products/{product_id} - Get one product
//! - PATCH /products/{product_id} - Partial update
//! - DELETE /products/{product_id} - Hard delete (204)

use crate::core::ShiplineResult;
use crate::server::AppState;
use crate::server::dto::{
    CreateProductRequest, ListQuery, ProductResponse, UpdateProductRequest,
};
use crate::server::extract::ValidatedJson;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> ShiplineResult<Response> {
    let product = state.products.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))).into_response())
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ShiplineResult<Json<Vec<ProductResponse>>> {
    let products = state.products.list(query.page()).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ShiplineResult<Json<ProductResponse>> {
    let product = state.products.get(&product_id).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> ShiplineResult<Json<ProductResponse>> {
    let product = state.products.update(&product_id, payload.into()).await?;
    Ok(Json(ProductResponse::from(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ShiplineResult<StatusCode> {
    state.products.delete(&product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
