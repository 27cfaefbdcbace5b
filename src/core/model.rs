//! Domain model: products, orders, and order items
//!
//! Orders exclusively own their items (composition, cascade delete); an item
//! holds a non-owning `product_id` reference plus a price snapshot captured
//! at creation time. The snapshot is the audit trail: a later product price
//! change never rewrites a stored order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status values. The plain update path accepts any string; these are
/// the values the system itself writes.
pub mod order_status {
    pub const PENDING: &str = "PENDING";
    pub const CONFIRMED: &str = "CONFIRMED";
    pub const CANCELLED: &str = "CANCELLED";
    pub const COMPLETED: &str = "COMPLETED";
}

/// Shipping substatus values, tracked independently of the order status.
pub mod shipping_status {
    pub const NOT_CREATED: &str = "NOT_CREATED";
    pub const CREATED: &str = "CREATED";
    pub const PICKED: &str = "PICKED";
    pub const DELIVERING: &str = "DELIVERING";
    pub const DELIVERED: &str = "DELIVERED";
    pub const FAILED: &str = "FAILED";
    pub const CANCELLED: &str = "CANCELLED";
}

pub mod product_status {
    pub const ACTIVE: &str = "ACTIVE";
    pub const INACTIVE: &str = "INACTIVE";
}

pub mod payment_method {
    pub const COD: &str = "COD";
}

pub mod payment_status {
    pub const PENDING: &str = "PENDING";
}

pub const DEFAULT_CURRENCY: &str = "VND";

/// Fallback receiver address; the shipment provider rejects blank addresses.
pub const DEFAULT_RECEIVER_ADDRESS: &str = "Ho Chi Minh City, Vietnam";

/// Catalog product. The `id` is an externally visible server-generated
/// string, unique via regenerate-on-collision at creation time.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    /// Informational only; never checked or decremented during ordering.
    pub stock: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status == product_status::ACTIVE
    }
}

/// Partial product update; `None` means leave unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub status: Option<String>,
}

/// Customer identity captured on the order as a snapshot.
#[derive(Debug, Clone)]
pub struct Customer {
    /// External customer id; empty string when the caller supplies none.
    pub customer_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Shipper details echoed back by the shipment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipper {
    pub shipper_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// motorbike | car | truck
    pub vehicle_type: Option<String>,
}

/// An order aggregate root. Owns its items; `order_code` is the human-facing
/// unique identifier, distinct from the internal primary key.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub order_code: String,

    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
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
}

/// A single line of an order. `unit_price`/`total_price` are immutable
/// snapshots taken at order-creation time.
#[derive(Debug, Clone)]
pub struct OrderItem {
    /// Assigned by the store on insert.
    pub id: i64,
    pub order_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Fully loaded order aggregate: the order row plus its items.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Partial order status update; `None` means leave unchanged. Used by both
/// the PATCH path and externally-pushed status updates.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub order_status: Option<String>,
    pub payment_status: Option<String>,
    pub shipping_status: Option<String>,
    pub shipping_order_code: Option<String>,
    pub shipper: Option<Shipper>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub failed_reason: Option<String>,
}

impl OrderPatch {
    /// A patch that only changes the order status.
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            order_status: Some(status.into()),
            ..Self::default()
        }
    }
}
