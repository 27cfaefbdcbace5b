//! In-memory store implementations for testing and development
//!
//! Uses RwLock for thread-safe access. Mirrors the relational backend's
//! observable behavior: `updated_at DESC` list ordering, clamped pagination,
//! and rejection of duplicate order codes (the relational unique
//! constraint's stand-in).

use crate::core::model::{Order, OrderItem, OrderWithItems, Product, ProductPatch};
use crate::storage::{OrderStore, Page, ProductStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory product store.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: Product) -> Result<Product> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn get(&self, id: &str) -> Result<Option<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(products.get(id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Product>> {
        let page = page.clamped();
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(product) = products.get_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(currency) = patch.currency {
            product.currency = currency;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(status) = patch.status {
            product.status = status;
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(products.remove(id).is_some())
    }
}

#[derive(Default)]
struct OrdersInner {
    orders: HashMap<Uuid, Order>,
    items: HashMap<Uuid, Vec<OrderItem>>,
    next_item_id: i64,
}

/// In-memory order store. Order + items inserts are atomic under one write
/// lock, matching the relational backend's transaction.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<OrdersInner>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn aggregate(inner: &OrdersInner, order: &Order) -> OrderWithItems {
        OrderWithItems {
            order: order.clone(),
            items: inner.items.get(&order.id).cloned().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order, items: Vec<OrderItem>) -> Result<OrderWithItems> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if inner
            .orders
            .values()
            .any(|o| o.order_code == order.order_code)
        {
            return Err(anyhow!("duplicate order code: {}", order.order_code));
        }

        let mut stored_items = Vec::with_capacity(items.len());
        for mut item in items {
            inner.next_item_id += 1;
            item.id = inner.next_item_id;
            item.order_id = order.id;
            stored_items.push(item);
        }

        inner.items.insert(order.id, stored_items);
        inner.orders.insert(order.id, order.clone());

        Ok(Self::aggregate(&inner, &order))
    }

    async fn get(&self, id: &Uuid) -> Result<Option<OrderWithItems>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(inner.orders.get(id).map(|o| Self::aggregate(&inner, o)))
    }

    async fn get_by_code(&self, order_code: &str) -> Result<Option<OrderWithItems>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(inner
            .orders
            .values()
            .find(|o| o.order_code == order_code)
            .map(|o| Self::aggregate(&inner, o)))
    }

    async fn list(&self, page: Page) -> Result<Vec<OrderWithItems>> {
        let page = page.clamped();
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<&Order> = inner.orders.values().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .map(|o| Self::aggregate(&inner, o))
            .collect())
    }

    async fn update(&self, order: Order) -> Result<Option<OrderWithItems>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !inner.orders.contains_key(&order.id) {
            return Ok(None);
        }
        inner.orders.insert(order.id, order.clone());
        Ok(Some(Self::aggregate(&inner, &order)))
    }
}
