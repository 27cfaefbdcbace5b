//! Product catalog service
//!
//! Plain single-table CRUD. Product ids are generated server-side and made
//! unique by regenerating on collision, never by surfacing a uniqueness
//! error to the caller.

use crate::core::model::{DEFAULT_CURRENCY, Product, ProductPatch, product_status};
use crate::core::{ShiplineError, ShiplineResult, codes};
use crate::storage::{Page, ProductStore};
use chrono::Utc;
use std::sync::Arc;

/// Input for product creation. Validation of ranges happens at the API
/// boundary; defaults are applied here.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub status: Option<String>,
}

/// Product catalog operations.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Create a product with a server-generated id, regenerating until the
    /// id is free.
    pub async fn create(&self, new: NewProduct) -> ShiplineResult<Product> {
        let mut id = codes::product_id();
        while self.store.get(&id).await?.is_some() {
            id = codes::product_id();
        }

        let now = Utc::now();
        let product = Product {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            currency: new.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            stock: new.stock.unwrap_or(0),
            status: new
                .status
                .unwrap_or_else(|| product_status::ACTIVE.to_string()),
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create(product).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "product created");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> ShiplineResult<Product> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ShiplineError::not_found("Product", id))
    }

    pub async fn list(&self, page: Page) -> ShiplineResult<Vec<Product>> {
        Ok(self.store.list(page).await?)
    }

    /// Apply a partial update; only provided fields change.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> ShiplineResult<Product> {
        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| ShiplineError::not_found("Product", id))
    }

    /// Hard delete.
    pub async fn delete(&self, id: &str) -> ShiplineResult<()> {
        if !self.store.delete(id).await? {
            return Err(ShiplineError::not_found("Product", id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
