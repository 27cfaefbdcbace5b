//! Shipment gateway: the seam between this system and the external provider
//!
//! The provider offers no transactional guarantee, so the boundary is
//! failure-opaque: `submit_order` returns `Option` and `update_status`
//! returns `bool`. Every transport/HTTP failure is absorbed here and logged;
//! the lifecycle manager above makes an all-or-nothing decision without
//! interpreting transport detail.

pub mod http;

use crate::core::address;
use crate::core::model::{self, Order, OrderItem, Shipper};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use http::HttpShipmentGateway;

/// Assumed shipping weight per item quantity unit, in kg.
const WEIGHT_PER_ITEM_KG: f64 = 0.5;
/// The provider rejects zero-weight packages.
const MIN_PACKAGE_WEIGHT_KG: f64 = 1.0;
/// Default package dimensions in cm; not derivable from the catalog.
const DEFAULT_PACKAGE_DIMENSION_CM: f64 = 10.0;

const DEFAULT_SERVICE_TYPE: &str = "STANDARD";
const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Synchronous client for the two provider operations.
///
/// Both calls are single-attempt with a fixed 30 second timeout; there is no
/// background retry or queued delivery anywhere in the system.
#[async_trait]
pub trait ShipmentGateway: Send + Sync {
    /// Submit an order for shipment. `None` means the provider did not
    /// confirm; the caller must not persist the order.
    async fn submit_order(&self, order: &Order, items: &[OrderItem]) -> Option<ShipmentResponse>;

    /// Push a status change for an existing shipment. `false` means the
    /// caller must not persist its local status mutation.
    async fn update_status(&self, order_code: &str, status: &str) -> bool;
}

/// One line item of the provider payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItem {
    /// The provider wants a numeric id; non-numeric catalog ids become 0.
    pub product_id: i64,
    pub product_name: String,
    /// Catalog product id doubles as the SKU.
    pub product_sku: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Outbound payload for `POST {base}/api/shipments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub order_code: String,

    pub sender_name: String,
    pub sender_phone: String,
    pub sender_address: String,
    pub sender_city: String,
    pub sender_district: String,
    pub sender_ward: String,

    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub receiver_city: String,
    pub receiver_district: String,
    pub receiver_ward: String,

    pub package_weight: f64,
    pub package_length: f64,
    pub package_width: f64,
    pub package_height: f64,
    pub package_value: f64,
    pub package_description: String,

    pub shipping_fee: f64,
    pub cod_amount: f64,

    pub estimated_pickup_time: Option<String>,
    pub estimated_delivery_time: Option<String>,
    pub actual_pickup_time: Option<String>,
    pub actual_delivery_time: Option<String>,

    pub carrier_code: String,
    pub service_type: String,
    pub created_by: String,

    pub items: Vec<ShipmentItem>,
}

/// Partial provider response, decoded once at this boundary. All fields are
/// optional; downstream code operates on typed optionals, never raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShipmentResponse {
    pub shipping_order_code: Option<String>,
    /// Shipping substatus assigned by the provider (e.g. CREATED).
    pub status: Option<String>,
    pub shipper: Option<Shipper>,
    /// Left as a string here; the lifecycle manager parses it and drops
    /// malformed values instead of failing the creation.
    pub estimated_delivery_time: Option<String>,
    /// Order status echo, applied when present.
    pub order_status: Option<String>,
}

fn iso(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
}

impl ShipmentRequest {
    /// Build the provider payload from an order aggregate.
    ///
    /// Receiver fields mirror the order's receiver snapshot, falling back to
    /// the customer identity and then to the default address (the provider
    /// rejects blank addresses). Sender fields mirror the customer, reusing
    /// the receiver address since no separate sender address is stored.
    pub fn from_order(order: &Order, items: &[OrderItem]) -> Self {
        let receiver_name = if order.receiver_name.is_empty() {
            order.customer_name.clone()
        } else {
            order.receiver_name.clone()
        };
        let receiver_phone = if order.receiver_phone.is_empty() {
            order.customer_phone.clone()
        } else {
            order.receiver_phone.clone()
        };
        let receiver_address = if order.receiver_address.is_empty() {
            model::DEFAULT_RECEIVER_ADDRESS.to_string()
        } else {
            order.receiver_address.clone()
        };

        let receiver_loc = address::parse(&receiver_address);
        let sender_address = receiver_address.clone();
        let sender_loc = address::parse(&sender_address);

        let total_weight: f64 = items
            .iter()
            .map(|item| item.quantity as f64 * WEIGHT_PER_ITEM_KG)
            .sum();
        let package_weight = total_weight.max(MIN_PACKAGE_WEIGHT_KG);

        let shipment_items: Vec<ShipmentItem> = items
            .iter()
            .map(|item| ShipmentItem {
                product_id: item.product_id.parse::<i64>().unwrap_or_else(|_| {
                    tracing::warn!(
                        product_id = %item.product_id,
                        "non-numeric product id in shipment payload, using 0"
                    );
                    0
                }),
                product_name: if item.product_name.is_empty() {
                    UNKNOWN_PRODUCT_NAME.to_string()
                } else {
                    item.product_name.clone()
                },
                product_sku: item.product_id.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        let package_description = items
            .iter()
            .map(|item| {
                let name = if item.product_name.is_empty() {
                    "Item"
                } else {
                    item.product_name.as_str()
                };
                format!("{} x{}", name, item.quantity)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let cod_amount = if order.payment_method.as_deref() == Some(model::payment_method::COD) {
            order.total_amount
        } else {
            0.0
        };

        Self {
            order_code: order.order_code.clone(),
            sender_name: order.customer_name.clone(),
            sender_phone: order.customer_phone.clone(),
            sender_address,
            sender_city: sender_loc.city,
            sender_district: sender_loc.district,
            sender_ward: sender_loc.ward,
            receiver_name,
            receiver_phone,
            receiver_address,
            receiver_city: receiver_loc.city,
            receiver_district: receiver_loc.district,
            receiver_ward: receiver_loc.ward,
            package_weight,
            package_length: DEFAULT_PACKAGE_DIMENSION_CM,
            package_width: DEFAULT_PACKAGE_DIMENSION_CM,
            package_height: DEFAULT_PACKAGE_DIMENSION_CM,
            package_value: order.subtotal,
            package_description,
            shipping_fee: order.shipping_fee,
            cod_amount,
            estimated_pickup_time: None,
            estimated_delivery_time: iso(&order.estimated_delivery_time),
            actual_pickup_time: None,
            actual_delivery_time: iso(&order.delivered_at),
            carrier_code: String::new(),
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            created_by: order.customer_id.clone(),
            items: shipment_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            order_code: "ORD-20260101-120000-1234".to_string(),
            customer_id: "cust-9".to_string(),
            customer_name: "Nguyen Van A".to_string(),
            customer_phone: "0901234567".to_string(),
            customer_email: None,
            subtotal: 300.0,
            shipping_fee: 20.0,
            discount: 0.0,
            total_amount: 320.0,
            currency: model::DEFAULT_CURRENCY.to_string(),
            payment_method: Some(model::payment_method::COD.to_string()),
            payment_status: model::payment_status::PENDING.to_string(),
            shipping_order_code: None,
            shipping_status: model::shipping_status::NOT_CREATED.to_string(),
            receiver_name: String::new(),
            receiver_phone: String::new(),
            receiver_address: "Hanoi, District 2".to_string(),
            shipper: None,
            estimated_delivery_time: None,
            delivered_at: None,
            failed_reason: None,
            order_status: model::order_status::PENDING.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn item(product_id: &str, name: &str, quantity: i64) -> OrderItem {
        OrderItem {
            id: 0,
            order_id: Uuid::nil(),
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            quantity,
            unit_price: 100.0,
            total_price: 100.0 * quantity as f64,
        }
    }

    #[test]
    fn test_receiver_falls_back_to_customer_identity() {
        let req = ShipmentRequest::from_order(&order(), &[item("42", "Widget", 1)]);
        assert_eq!(req.receiver_name, "Nguyen Van A");
        assert_eq!(req.receiver_phone, "0901234567");
        assert_eq!(req.receiver_city, "Hanoi");
        assert_eq!(req.receiver_district, "District 2");
    }

    #[test]
    fn test_blank_address_gets_default() {
        let mut o = order();
        o.receiver_address = String::new();
        let req = ShipmentRequest::from_order(&o, &[]);
        assert_eq!(req.receiver_address, model::DEFAULT_RECEIVER_ADDRESS);
        assert_eq!(req.sender_address, model::DEFAULT_RECEIVER_ADDRESS);
        assert_eq!(req.receiver_city, "Ho Chi Minh City");
    }

    #[test]
    fn test_package_weight_has_floor() {
        let req = ShipmentRequest::from_order(&order(), &[item("1", "Light", 1)]);
        assert_eq!(req.package_weight, 1.0);

        let req = ShipmentRequest::from_order(&order(), &[item("1", "Bulk", 6)]);
        assert_eq!(req.package_weight, 3.0);
    }

    #[test]
    fn test_package_value_is_subtotal() {
        let req = ShipmentRequest::from_order(&order(), &[item("1", "Widget", 3)]);
        assert_eq!(req.package_value, 300.0);
    }

    #[test]
    fn test_non_numeric_product_id_becomes_zero() {
        let uuid_id = Uuid::new_v4().to_string();
        let req = ShipmentRequest::from_order(&order(), &[item(&uuid_id, "Widget", 1)]);
        assert_eq!(req.items[0].product_id, 0);
        assert_eq!(req.items[0].product_sku, uuid_id);

        let req = ShipmentRequest::from_order(&order(), &[item("777", "Widget", 1)]);
        assert_eq!(req.items[0].product_id, 777);
    }

    #[test]
    fn test_unknown_product_name_fallback() {
        let req = ShipmentRequest::from_order(&order(), &[item("1", "", 2)]);
        assert_eq!(req.items[0].product_name, "Unknown Product");
        assert_eq!(req.package_description, "Item x2");
    }

    #[test]
    fn test_cod_amount_only_for_cod() {
        let req = ShipmentRequest::from_order(&order(), &[]);
        assert_eq!(req.cod_amount, 320.0);

        let mut prepaid = order();
        prepaid.payment_method = Some("BANK_TRANSFER".to_string());
        let req = ShipmentRequest::from_order(&prepaid, &[]);
        assert_eq!(req.cod_amount, 0.0);

        let mut none = order();
        none.payment_method = None;
        let req = ShipmentRequest::from_order(&none, &[]);
        assert_eq!(req.cod_amount, 0.0);
    }

    #[test]
    fn test_timestamps_serialize_rfc3339_or_null() {
        let mut o = order();
        o.delivered_at = Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        let req = ShipmentRequest::from_order(&o, &[]);
        assert_eq!(req.actual_delivery_time.as_deref(), Some("2026-01-02T03:04:05Z"));
        assert_eq!(req.estimated_delivery_time, None);

        let json = serde_json::to_value(&req).unwrap();
        assert!(json["estimatedDeliveryTime"].is_null());
        assert_eq!(json["serviceType"], "STANDARD");
        assert_eq!(json["createdBy"], "cust-9");
    }

    #[test]
    fn test_response_decodes_partial_payload() {
        let resp: ShipmentResponse = serde_json::from_str(
            r#"{"shippingOrderCode": "SHIP-1", "status": "CREATED", "unexpected": 1}"#,
        )
        .unwrap();
        assert_eq!(resp.shipping_order_code.as_deref(), Some("SHIP-1"));
        assert_eq!(resp.status.as_deref(), Some("CREATED"));
        assert!(resp.shipper.is_none());
        assert!(resp.order_status.is_none());
    }
}
