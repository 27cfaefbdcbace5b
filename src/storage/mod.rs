//! Storage traits and backend implementations
//!
//! The service layer depends on the `ProductStore`/`OrderStore` traits, not
//! on a concrete backend. The in-memory backend serves tests and local
//! development; PostgreSQL is behind the `postgres` feature flag.

#[cfg(feature = "in-memory")]
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "in-memory")]
pub use in_memory::{InMemoryOrderStore, InMemoryProductStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresOrderStore, PostgresProductStore, ensure_schema};

use crate::core::model::{Order, OrderItem, OrderWithItems, Product, ProductPatch};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Pagination window for list queries.
///
/// Negative values must not crash the query; [`Page::clamped`] normalizes
/// them before the store touches the backend.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 50;

    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }

    /// Clamp negative values to zero.
    pub fn clamped(self) -> Self {
        Self {
            skip: self.skip.max(0),
            limit: self.limit.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Persistence operations for catalog products.
///
/// Lists are ordered by most-recently-updated first. Updates overwrite only
/// the provided fields; deletes are hard deletes.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, product: Product) -> Result<Product>;

    async fn get(&self, id: &str) -> Result<Option<Product>>;

    async fn list(&self, page: Page) -> Result<Vec<Product>>;

    /// Apply a partial update. Returns `None` when the product is absent.
    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>>;

    /// Hard delete. Returns `false` when the product was absent.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Persistence operations for orders and their items.
///
/// Order creation persists the order and all items atomically. Orders are
/// never row-deleted; cancellation is a status flip through [`update`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order with its items in one transaction. Item ids are
    /// assigned by the store. The committed aggregate is returned.
    async fn create(&self, order: Order, items: Vec<OrderItem>) -> Result<OrderWithItems>;

    async fn get(&self, id: &Uuid) -> Result<Option<OrderWithItems>>;

    async fn get_by_code(&self, order_code: &str) -> Result<Option<OrderWithItems>>;

    async fn list(&self, page: Page) -> Result<Vec<OrderWithItems>>;

    /// Overwrite the order row (items are immutable after creation).
    /// Returns `None` when the order is absent.
    async fn update(&self, order: Order) -> Result<Option<OrderWithItems>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps_negatives() {
        let page = Page::new(-5, -10).clamped();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 0);

        let page = Page::new(3, 7).clamped();
        assert_eq!(page.skip, 3);
        assert_eq!(page.limit, 7);
    }
}
