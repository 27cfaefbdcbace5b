//! Order lifecycle manager
//!
//! Orchestrates order creation and status transitions against the product
//! catalog, the order store, and the shipment gateway. Two ordering
//! guarantees hold everywhere:
//!
//! 1. Creation never commits unless the shipment submission succeeded:
//!    external confirmation precedes durability. The gateway call happens
//!    before the storage transaction opens, so a transaction is never held
//!    across a slow network call. The narrow window where the provider
//!    confirmed but the process crashed before the local commit is a known,
//!    accepted operational gap; reconciliation is out of scope.
//! 2. A PENDING order only becomes CANCELLED after the provider accepted
//!    the cancellation.
//!
//! Beyond those rules the status field is permissive: the update path writes
//! whatever string the caller provides, with no transition table.

use crate::core::model::{
    self, Customer, Order, OrderItem, OrderPatch, OrderWithItems, order_status,
};
use crate::core::{ShiplineError, ShiplineResult, codes, pricing};
use crate::gateway::{ShipmentGateway, ShipmentResponse};
use crate::storage::{OrderStore, Page, ProductStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// One requested order line.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Input for order creation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: Customer,
    pub items: Vec<NewOrderItem>,
}

/// The order lifecycle manager.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    gateway: Arc<dyn ShipmentGateway>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        gateway: Arc<dyn ShipmentGateway>,
    ) -> Self {
        Self {
            orders,
            products,
            gateway,
        }
    }

    /// Create an order.
    ///
    /// Validates items against the catalog, prices them, generates a unique
    /// order code, submits the order to the shipment provider, and persists
    /// only after the provider confirmed. Fails fast on the first invalid
    /// item; nothing is persisted on any failure path.
    pub async fn create_order(&self, new: NewOrder) -> ShiplineResult<OrderWithItems> {
        // Resolve and validate every product before any side effect.
        let mut resolved = Vec::with_capacity(new.items.len());
        for item in &new.items {
            let product = self
                .products
                .get(&item.product_id)
                .await?
                .ok_or_else(|| ShiplineError::not_found("Product", &item.product_id))?;
            if !product.is_active() {
                return Err(ShiplineError::business(format!(
                    "Product {} is not active.",
                    item.product_id
                )));
            }
            resolved.push((product, item.quantity));
        }

        let pairs: Vec<(&model::Product, i64)> =
            resolved.iter().map(|(p, q)| (p, *q)).collect();
        let quote = pricing::quote(&pairs, 0.0, 0.0);

        let order_code = self.unique_order_code().await?;

        let customer = new.customer;
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let mut order = Order {
            id: order_id,
            order_code,
            customer_id: customer.customer_id,
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            customer_email: customer.email,
            subtotal: quote.subtotal,
            shipping_fee: quote.shipping_fee,
            discount: quote.discount,
            total_amount: quote.total_amount,
            currency: model::DEFAULT_CURRENCY.to_string(),
            payment_method: Some(model::payment_method::COD.to_string()),
            payment_status: model::payment_status::PENDING.to_string(),
            shipping_order_code: None,
            shipping_status: model::shipping_status::NOT_CREATED.to_string(),
            // Customer identity doubles as the receiver; the provider
            // rejects blank addresses so a fixed default stands in.
            receiver_name: customer.name,
            receiver_phone: customer.phone,
            receiver_address: model::DEFAULT_RECEIVER_ADDRESS.to_string(),
            shipper: None,
            estimated_delivery_time: None,
            delivered_at: None,
            failed_reason: None,
            order_status: order_status::PENDING.to_string(),
            created_at: now,
            updated_at: now,
        };

        let items: Vec<OrderItem> = quote
            .lines
            .into_iter()
            .map(|line| OrderItem {
                id: 0,
                order_id,
                product_id: line.product_id,
                product_name: line.product_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price: line.total_price,
            })
            .collect();

        // External confirmation precedes durability.
        let Some(response) = self.gateway.submit_order(&order, &items).await else {
            tracing::error!(
                order_code = %order.order_code,
                "shipment submission failed, order not saved"
            );
            return Err(ShiplineError::gateway(
                "Failed to create shipment. Order was not created. Please try again.",
            ));
        };

        apply_shipment_response(&mut order, response);

        let created = self.orders.create(order, items).await?;
        tracing::info!(
            order_code = %created.order.order_code,
            total = created.order.total_amount,
            "order created after shipment confirmation"
        );
        Ok(created)
    }

    /// Apply a partial status update to an order looked up by code.
    ///
    /// When the stored status is PENDING and the new order status is
    /// CANCELLED (case-insensitive), the shipment provider is notified
    /// first; a rejected notification leaves the stored status untouched.
    pub async fn update_order_status(
        &self,
        order_code: &str,
        patch: OrderPatch,
    ) -> ShiplineResult<OrderWithItems> {
        let existing = self
            .orders
            .get_by_code(order_code)
            .await?
            .ok_or_else(|| ShiplineError::not_found("Order", order_code))?;

        let mut order = existing.order;

        if let Some(new_status) = &patch.order_status {
            let cancelling = order.order_status.eq_ignore_ascii_case(order_status::PENDING)
                && new_status.eq_ignore_ascii_case(order_status::CANCELLED);
            if cancelling {
                tracing::info!(
                    %order_code,
                    "cancelling PENDING order, notifying shipment provider first"
                );
                if !self.gateway.update_status(order_code, new_status).await {
                    tracing::error!(
                        %order_code,
                        "shipment status update failed, order status not changed"
                    );
                    return Err(ShiplineError::gateway(
                        "Failed to cancel shipment. Order status was not updated. Please try again.",
                    ));
                }
            }
        }

        if let Some(status) = patch.order_status {
            order.order_status = status;
        }
        if let Some(status) = patch.payment_status {
            order.payment_status = status;
        }
        if let Some(status) = patch.shipping_status {
            order.shipping_status = status;
        }
        if let Some(code) = patch.shipping_order_code {
            order.shipping_order_code = Some(code);
        }
        if let Some(shipper) = patch.shipper {
            order.shipper = Some(shipper);
        }
        if let Some(ts) = patch.estimated_delivery_time {
            order.estimated_delivery_time = Some(ts);
        }
        if let Some(ts) = patch.delivered_at {
            order.delivered_at = Some(ts);
        }
        if let Some(reason) = patch.failed_reason {
            order.failed_reason = Some(reason);
        }
        order.updated_at = Utc::now();

        self.orders
            .update(order)
            .await?
            .ok_or_else(|| ShiplineError::not_found("Order", order_code))
    }

    /// Cancel an order: a soft status flip, never a row delete.
    pub async fn cancel_order(&self, order_code: &str) -> ShiplineResult<OrderWithItems> {
        let existing = self
            .orders
            .get_by_code(order_code)
            .await?
            .ok_or_else(|| ShiplineError::not_found("Order", order_code))?;

        if existing.order.order_status == order_status::CANCELLED {
            return Err(ShiplineError::business("Order is already cancelled."));
        }

        self.update_order_status(order_code, OrderPatch::status(order_status::CANCELLED))
            .await
    }

    pub async fn get(&self, id: &Uuid) -> ShiplineResult<OrderWithItems> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| ShiplineError::not_found("Order", id.to_string()))
    }

    pub async fn get_by_code(&self, order_code: &str) -> ShiplineResult<OrderWithItems> {
        self.orders
            .get_by_code(order_code)
            .await?
            .ok_or_else(|| ShiplineError::not_found("Order", order_code))
    }

    pub async fn list(&self, page: Page) -> ShiplineResult<Vec<OrderWithItems>> {
        Ok(self.orders.list(page).await?)
    }

    /// Generate an order code that is free in the store, regenerating on
    /// collision. Collisions are negligible but the check is still a loop.
    async fn unique_order_code(&self) -> ShiplineResult<String> {
        loop {
            let code = codes::order_code();
            if self.orders.get_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
    }
}

/// Merge fields present in the provider response into the in-memory order.
///
/// A malformed delivery timestamp is logged and left unset rather than
/// failing the whole creation. The payment method is never overwritten.
fn apply_shipment_response(order: &mut Order, response: ShipmentResponse) {
    if let Some(code) = response.shipping_order_code
        && !code.is_empty()
    {
        order.shipping_order_code = Some(code);
    }
    if let Some(status) = response.status
        && !status.is_empty()
    {
        order.shipping_status = status;
    }
    if let Some(shipper) = response.shipper {
        order.shipper = Some(shipper);
    }
    if let Some(raw) = response.estimated_delivery_time {
        match parse_provider_timestamp(&raw) {
            Some(ts) => order.estimated_delivery_time = Some(ts),
            None => {
                tracing::warn!(
                    order_code = %order.order_code,
                    value = %raw,
                    "failed to parse estimatedDeliveryTime from shipment response"
                );
            }
        }
    }
    if let Some(status) = response.order_status
        && !status.is_empty()
    {
        order.order_status = status;
    }
}

fn parse_provider_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
