//! Wire types for the HTTP surface
//!
//! Request bodies deserialize from camelCase JSON and carry `validator`
//! rules; responses serialize the domain model back out in camelCase.
//! Conversions into the domain input types live here so handlers stay thin.

use crate::core::model::{
    Customer, Order, OrderItem, OrderPatch, OrderWithItems, Product, ProductPatch, Shipper,
};
use crate::service::{NewOrder, NewOrderItem, NewProduct};
use crate::storage::Page;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// `skip`/`limit` query parameters shared by the list endpoints.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn page(&self) -> Page {
        let default = Page::default();
        Page {
            skip: self.skip.unwrap_or(default.skip),
            limit: self.limit.unwrap_or(default.limit),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: f64,
    pub currency: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: Option<i64>,
    pub status: Option<String>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
            currency: req.currency,
            stock: req.stock,
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: Option<f64>,
    pub currency: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: Option<i64>,
    pub status: Option<String>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(req: UpdateProductRequest) -> Self {
        ProductPatch {
            name: req.name,
            description: req.description,
            price: req.price,
            currency: req.currency,
            stock: req.stock,
            status: req.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub stock: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            currency: p.currency,
            stock: p.stock,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// Serialize is load-bearing: the list-level length rule reports the failing
// vec as an error param, which the derive serializes.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub customer_phone: String,
    #[validate(email(message = "must be a valid email address"))]
    pub customer_email: Option<String>,
    #[validate(length(min = 1, message = "must contain at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrder {
            customer: Customer {
                customer_id: req.customer_id.unwrap_or_default(),
                name: req.customer_name,
                phone: req.customer_phone,
                email: req.customer_email,
            },
            items: req
                .items
                .into_iter()
                .map(|item| NewOrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// Partial status update; absent fields keep their stored value. Used by
/// both the client PATCH path and the provider push path.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub order_status: Option<String>,
    pub payment_status: Option<String>,
    pub shipping_status: Option<String>,
    pub shipping_order_code: Option<String>,
    pub shipper: Option<Shipper>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub failed_reason: Option<String>,
}

impl From<UpdateOrderStatusRequest> for OrderPatch {
    fn from(req: UpdateOrderStatusRequest) -> Self {
        OrderPatch {
            order_status: req.order_status,
            payment_status: req.payment_status,
            shipping_status: req.shipping_status,
            shipping_order_code: req.shipping_order_code,
            shipper: req.shipper,
            estimated_delivery_time: req.estimated_delivery_time,
            delivered_at: req.delivered_at,
            failed_reason: req.failed_reason,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_code: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub currency: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub shipping_order_code: Option<String>,
    pub shipping_status: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub shipper: Option<Shipper>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub failed_reason: Option<String>,
    pub order_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(aggregate: OrderWithItems) -> Self {
        let OrderWithItems { order, items } = aggregate;
        OrderResponse {
            id: order.id,
            order_code: order.order_code,
            customer_id: order.customer_id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_email: order.customer_email,
            subtotal: order.subtotal,
            shipping_fee: order.shipping_fee,
            discount: order.discount,
            total_amount: order.total_amount,
            currency: order.currency,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            shipping_order_code: order.shipping_order_code,
            shipping_status: order.shipping_status,
            receiver_name: order.receiver_name,
            receiver_phone: order.receiver_phone,
            receiver_address: order.receiver_address,
            shipper: order.shipper,
            estimated_delivery_time: order.estimated_delivery_time,
            delivered_at: order.delivered_at,
            failed_reason: order.failed_reason,
            order_status: order.order_status,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

/// Lightweight projection for status polling clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_code: String,
    pub order_status: String,
    pub payment_status: String,
    pub shipping_status: String,
    pub shipping_order_code: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderStatusResponse {
    fn from(order: &Order) -> Self {
        OrderStatusResponse {
            order_code: order.order_code.clone(),
            order_status: order.order_status.clone(),
            payment_status: order.payment_status.clone(),
            shipping_status: order.shipping_status.clone(),
            shipping_order_code: order.shipping_order_code.clone(),
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_camel_case() {
        let json = serde_json::json!({
            "customerName": "Anh Tran",
            "customerPhone": "0901234567",
            "items": [{"productId": "p-1", "quantity": 2}]
        });
        let req: CreateOrderRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_ok());
        let new: NewOrder = req.into();
        assert_eq!(new.customer.customer_id, "");
        assert_eq!(new.items[0].product_id, "p-1");
    }

    #[test]
    fn test_create_order_rejects_zero_quantity_and_empty_items() {
        let json = serde_json::json!({
            "customerName": "Anh Tran",
            "customerPhone": "0901234567",
            "items": [{"productId": "p-1", "quantity": 0}]
        });
        let req: CreateOrderRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_err());

        let json = serde_json::json!({
            "customerName": "Anh Tran",
            "customerPhone": "0901234567",
            "items": []
        });
        let req: CreateOrderRequest = serde_json::from_value(json).unwrap();
        let errors = req.validate().unwrap_err();
        // The list-level rule records the offending vec as an error param;
        // round-tripping through JSON exercises that serialization.
        let rendered = serde_json::to_value(&errors).unwrap();
        assert!(rendered.get("items").is_some());
    }

    #[test]
    fn test_status_update_partial_fields() {
        let json = serde_json::json!({"orderStatus": "CONFIRMED"});
        let req: UpdateOrderStatusRequest = serde_json::from_value(json).unwrap();
        let patch: OrderPatch = req.into();
        assert_eq!(patch.order_status.as_deref(), Some("CONFIRMED"));
        assert!(patch.payment_status.is_none());
        assert!(patch.shipper.is_none());
    }

    #[test]
    fn test_list_query_defaults() {
        let q = ListQuery::default();
        let page = q.page();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 50);
    }
}
