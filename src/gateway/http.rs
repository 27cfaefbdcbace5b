//! HTTP implementation of the shipment gateway using reqwest
//!
//! Single-attempt calls with a 30 second client timeout. Every failure path
//! (non-2xx status, timeout, transport error) is logged and collapsed into
//! `None`/`false`; nothing raises across this boundary.

use crate::core::model::{Order, OrderItem};
use crate::gateway::{ShipmentGateway, ShipmentRequest, ShipmentResponse};
use anyhow::Context;
use async_trait::async_trait;
use axum::http::StatusCode;
use std::time::Duration;

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Shipment gateway client backed by the provider's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpShipmentGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpShipmentGateway {
    /// Create a client for the given provider base URL.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .context("failed to build shipment gateway HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn shipments_url(&self) -> String {
        format!("{}/api/shipments", self.base_url)
    }

    fn status_url(&self, order_code: &str) -> String {
        format!("{}/api/shipments/{}/status", self.base_url, order_code)
    }
}

#[async_trait]
impl ShipmentGateway for HttpShipmentGateway {
    async fn submit_order(&self, order: &Order, items: &[OrderItem]) -> Option<ShipmentResponse> {
        let url = self.shipments_url();
        let payload = ShipmentRequest::from_order(order, items);
        tracing::info!(order_code = %order.order_code, %url, "submitting order to shipment provider");

        let response = match self.client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                if err.is_timeout() {
                    tracing::error!(order_code = %order.order_code, "shipment submit timed out");
                } else {
                    tracing::error!(order_code = %order.order_code, error = %err, "shipment submit request failed");
                }
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                order_code = %order.order_code,
                %status,
                body = %body.chars().take(500).collect::<String>(),
                "shipment submit rejected"
            );
            return None;
        }

        match response.json::<ShipmentResponse>().await {
            Ok(parsed) => {
                tracing::info!(
                    order_code = %order.order_code,
                    shipping_order_code = ?parsed.shipping_order_code,
                    "shipment submit confirmed"
                );
                Some(parsed)
            }
            Err(err) => {
                // A 2xx with an unparseable body still counts as success.
                tracing::warn!(
                    order_code = %order.order_code,
                    error = %err,
                    "shipment submit succeeded but body did not parse"
                );
                Some(ShipmentResponse::default())
            }
        }
    }

    async fn update_status(&self, order_code: &str, status: &str) -> bool {
        let url = self.status_url(order_code);
        tracing::info!(%order_code, new_status = %status, %url, "updating shipment status");

        let body = serde_json::json!({ "status": status });
        let response = match self.client.put(&url).json(&body).send().await {
            Ok(response) => response,
            Err(err) => {
                if err.is_timeout() {
                    tracing::error!(%order_code, "shipment status update timed out");
                } else {
                    tracing::error!(%order_code, error = %err, "shipment status update request failed");
                }
                return false;
            }
        };

        let code = response.status();
        if matches!(
            code,
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT
        ) {
            tracing::info!(%order_code, status = %code, "shipment status updated");
            true
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                %order_code,
                status = %code,
                body = %body.chars().take(500).collect::<String>(),
                "shipment status update rejected"
            );
            false
        }
    }
}
