//! End-to-end tests of the HTTP surface
//!
//! These tests verify the complete flow from HTTP request to response,
//! including the exact status codes of the external contract:
//! 201 creates, 204 product delete, 400 validation and business rules,
//! 404 not found, 422 schema violations, 502 gateway failures.

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};
use shipline::core::model::{Order, OrderItem};
use shipline::gateway::{ShipmentGateway, ShipmentResponse};
use shipline::server::{AppState, build_router};
use shipline::service::{OrderService, ProductService};
use shipline::storage::{InMemoryOrderStore, InMemoryProductStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// Test server
// =============================================================================

/// Gateway double whose outcomes can be flipped mid-test.
struct ToggleGateway {
    submit_ok: AtomicBool,
    update_ok: AtomicBool,
}

impl ToggleGateway {
    fn accepting() -> Arc<Self> {
        Arc::new(Self {
            submit_ok: AtomicBool::new(true),
            update_ok: AtomicBool::new(true),
        })
    }
}

#[async_trait]
impl ShipmentGateway for ToggleGateway {
    async fn submit_order(&self, _order: &Order, _items: &[OrderItem]) -> Option<ShipmentResponse> {
        self.submit_ok
            .load(Ordering::SeqCst)
            .then(ShipmentResponse::default)
    }

    async fn update_status(&self, _order_code: &str, _status: &str) -> bool {
        self.update_ok.load(Ordering::SeqCst)
    }
}

fn server(gateway: Arc<ToggleGateway>) -> TestServer {
    let products = Arc::new(InMemoryProductStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let state = AppState::new(
        OrderService::new(orders, products.clone(), gateway),
        ProductService::new(products),
    );
    TestServer::new(build_router(state))
}

async fn create_product(server: &TestServer, name: &str, price: f64) -> Value {
    let response = server
        .post("/products")
        .json(&json!({"name": name, "price": price}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}

async fn create_order(server: &TestServer, product_id: &str, quantity: i64) -> Value {
    let response = server
        .post("/orders")
        .json(&json!({
            "customerName": "Anh Tran",
            "customerPhone": "0901234567",
            "items": [{"productId": product_id, "quantity": quantity}]
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_crud_round_trip() {
    let server = server(ToggleGateway::accepting());

    let created = create_product(&server, "Banh mi", 25000.0).await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["currency"], "VND");
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["stock"], 0);

    let fetched: Value = server.get(&format!("/products/{id}")).await.json();
    assert_eq!(fetched["name"], "Banh mi");

    let patched = server
        .patch(&format!("/products/{id}"))
        .json(&json!({"price": 30000.0, "stock": 5}))
        .await;
    patched.assert_status_ok();
    let patched: Value = patched.json();
    assert_eq!(patched["price"], 30000.0);
    assert_eq!(patched["stock"], 5);
    assert_eq!(patched["name"], "Banh mi");

    server
        .delete(&format!("/products/{id}"))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    server
        .get(&format!("/products/{id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_product_validation_failure_is_400_with_fields() {
    let server = server(ToggleGateway::accepting());
    let response = server
        .post("/products")
        .json(&json!({"name": "", "price": -5.0}))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["fields"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_body_is_422() {
    let server = server(ToggleGateway::accepting());
    let response = server
        .post("/products")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_PAYLOAD");
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let server = server(ToggleGateway::accepting());
    let response = server.get("/products/nope").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_creation_end_to_end() {
    let server = server(ToggleGateway::accepting());
    let product = create_product(&server, "Pho bo", 100.0).await;

    let order = create_order(&server, product["id"].as_str().unwrap(), 2).await;
    let code = order["orderCode"].as_str().unwrap();
    assert!(code.starts_with("ORD-"));
    assert_eq!(order["subtotal"], 200.0);
    assert_eq!(order["totalAmount"], 200.0);
    assert_eq!(order["orderStatus"], "PENDING");
    assert_eq!(order["paymentMethod"], "COD");
    assert_eq!(order["items"][0]["unitPrice"], 100.0);
    assert_eq!(order["items"][0]["totalPrice"], 200.0);

    let fetched: Value = server.get(&format!("/orders/by-code/{code}")).await.json();
    assert_eq!(fetched["id"], order["id"]);

    let id = order["id"].as_str().unwrap();
    let by_id: Value = server.get(&format!("/orders/{id}")).await.json();
    assert_eq!(by_id["orderCode"], *code);
}

#[tokio::test]
async fn test_gateway_down_returns_502_and_persists_nothing() {
    let gateway = ToggleGateway::accepting();
    let server = server(gateway.clone());
    let product = create_product(&server, "Pho bo", 100.0).await;
    gateway.submit_ok.store(false, Ordering::SeqCst);

    let response = server
        .post("/orders")
        .json(&json!({
            "customerName": "Anh Tran",
            "customerPhone": "0901234567",
            "items": [{"productId": product["id"], "quantity": 1}]
        }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["code"], "SHIPMENT_GATEWAY_FAILURE");

    let listed: Value = server.get("/orders").await.json();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_order_for_unknown_product_is_404() {
    let server = server(ToggleGateway::accepting());
    let response = server
        .post("/orders")
        .json(&json!({
            "customerName": "Anh Tran",
            "customerPhone": "0901234567",
            "items": [{"productId": "missing", "quantity": 1}]
        }))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_order_list_pagination() {
    let server = server(ToggleGateway::accepting());
    let product = create_product(&server, "Pho bo", 10.0).await;
    let product_id = product["id"].as_str().unwrap();
    for _ in 0..3 {
        create_order(&server, product_id, 1).await;
    }

    let page: Value = server.get("/orders?skip=1&limit=1").await.json();
    assert_eq!(page.as_array().unwrap().len(), 1);

    // Negative values are clamped, never a crash.
    let response = server.get("/orders?skip=-3&limit=-1").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_update_and_projection() {
    let server = server(ToggleGateway::accepting());
    let product = create_product(&server, "Pho bo", 10.0).await;
    let order = create_order(&server, product["id"].as_str().unwrap(), 1).await;
    let code = order["orderCode"].as_str().unwrap();

    let patched = server
        .patch(&format!("/orders/by-code/{code}"))
        .json(&json!({"orderStatus": "CONFIRMED", "paymentStatus": "PAID"}))
        .await;
    patched.assert_status_ok();
    let patched: Value = patched.json();
    assert_eq!(patched["orderStatus"], "CONFIRMED");
    assert_eq!(patched["paymentStatus"], "PAID");

    let status: Value = server.get(&format!("/orders/status/{code}")).await.json();
    assert_eq!(status["orderCode"], *code);
    assert_eq!(status["orderStatus"], "CONFIRMED");
    assert_eq!(status["paymentStatus"], "PAID");
    assert_eq!(status["shippingStatus"], "NOT_CREATED");
    // The projection is a summary, not the aggregate.
    assert!(status.get("items").is_none());
}

#[tokio::test]
async fn test_external_push_applies_partial_fields() {
    let server = server(ToggleGateway::accepting());
    let product = create_product(&server, "Pho bo", 10.0).await;
    let order = create_order(&server, product["id"].as_str().unwrap(), 1).await;
    let code = order["orderCode"].as_str().unwrap();

    let pushed = server
        .post(&format!("/orders/by-code/status-update/{code}"))
        .json(&json!({
            "shippingStatus": "DELIVERING",
            "shipper": {"name": "Binh Le", "vehicleType": "motorbike"}
        }))
        .await;
    pushed.assert_status_ok();
    let pushed: Value = pushed.json();
    assert_eq!(pushed["shippingStatus"], "DELIVERING");
    assert_eq!(pushed["shipper"]["name"], "Binh Le");
    assert_eq!(pushed["orderStatus"], "PENDING");
}

#[tokio::test]
async fn test_cancel_and_cancel_again() {
    let server = server(ToggleGateway::accepting());
    let product = create_product(&server, "Pho bo", 10.0).await;
    let order = create_order(&server, product["id"].as_str().unwrap(), 1).await;
    let code = order["orderCode"].as_str().unwrap();

    let cancelled = server.delete(&format!("/orders/by-code/{code}")).await;
    cancelled.assert_status_ok();
    let cancelled: Value = cancelled.json();
    assert_eq!(cancelled["orderStatus"], "CANCELLED");

    let again = server.delete(&format!("/orders/by-code/{code}")).await;
    again.assert_status_bad_request();
    let body: Value = again.json();
    assert_eq!(body["code"], "BUSINESS_RULE_VIOLATION");
}

#[tokio::test]
async fn test_cancel_with_gateway_down_is_502() {
    let gateway = ToggleGateway::accepting();
    let server = server(gateway.clone());
    let product = create_product(&server, "Pho bo", 10.0).await;
    let order = create_order(&server, product["id"].as_str().unwrap(), 1).await;
    let code = order["orderCode"].as_str().unwrap();
    gateway.update_ok.store(false, Ordering::SeqCst);

    server
        .delete(&format!("/orders/by-code/{code}"))
        .await
        .assert_status(axum::http::StatusCode::BAD_GATEWAY);

    let status: Value = server.get(&format!("/orders/status/{code}")).await.json();
    assert_eq!(status["orderStatus"], "PENDING");
}

#[tokio::test]
async fn test_unknown_order_is_404() {
    let server = server(ToggleGateway::accepting());
    server
        .get("/orders/by-code/ORD-00000000-000000-0000")
        .await
        .assert_status_not_found();
    server
        .get("/orders/status/ORD-00000000-000000-0000")
        .await
        .assert_status_not_found();
}
