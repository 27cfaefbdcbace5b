//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresProductStore` and `PostgresOrderStore` backed by a
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag.
//!
//! # Schema
//!
//! Three tables: `products`, `orders` (unique constraint on `order_code`)
//! and `order_items` (FK to `orders` with `ON DELETE CASCADE`). The shipper
//! sub-object is stored as JSONB. Order creation inserts the order and all
//! items inside a single transaction, committed only after the caller's
//! business checks have already passed.

use crate::core::model::{Order, OrderItem, OrderWithItems, Product, ProductPatch, Shipper};
use crate::storage::{OrderStore, Page, ProductStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Apply the required tables and indexes (idempotent).
///
/// Safe to call on every startup; production deployments should prefer
/// migrations.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id VARCHAR(50) PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            description TEXT NULL,
            price DOUBLE PRECISION NOT NULL,
            currency VARCHAR(10) NOT NULL DEFAULT 'VND',
            stock BIGINT NOT NULL DEFAULT 0,
            status VARCHAR(20) NOT NULL DEFAULT 'ACTIVE',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create products table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id UUID PRIMARY KEY,
            order_code VARCHAR(50) NOT NULL,
            customer_id VARCHAR(50) NOT NULL,
            customer_name VARCHAR(255) NOT NULL,
            customer_phone VARCHAR(30) NOT NULL,
            customer_email VARCHAR(255) NULL,
            subtotal DOUBLE PRECISION NOT NULL,
            shipping_fee DOUBLE PRECISION NOT NULL DEFAULT 0,
            discount DOUBLE PRECISION NOT NULL DEFAULT 0,
            total_amount DOUBLE PRECISION NOT NULL,
            currency VARCHAR(10) NOT NULL DEFAULT 'VND',
            payment_method VARCHAR(50) NULL,
            payment_status VARCHAR(30) NOT NULL DEFAULT 'PENDING',
            shipping_order_code VARCHAR(100) NULL,
            shipping_status VARCHAR(30) NOT NULL DEFAULT 'NOT_CREATED',
            receiver_name VARCHAR(255) NOT NULL,
            receiver_phone VARCHAR(30) NOT NULL,
            receiver_address VARCHAR(500) NOT NULL,
            shipper JSONB NULL,
            estimated_delivery_time TIMESTAMPTZ NULL,
            delivered_at TIMESTAMPTZ NULL,
            failed_reason VARCHAR(500) NULL,
            order_status VARCHAR(30) NOT NULL DEFAULT 'PENDING',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            CONSTRAINT uq_order_code UNIQUE (order_code)
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create orders table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS order_items (
            id BIGSERIAL PRIMARY KEY,
            order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            product_id VARCHAR(50) NOT NULL,
            product_name VARCHAR(255) NOT NULL,
            quantity BIGINT NOT NULL,
            unit_price DOUBLE PRECISION NOT NULL,
            total_price DOUBLE PRECISION NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create order_items table: {}", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to create order_items index: {}", e))?;

    Ok(())
}

fn product_from_row(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        currency: row.try_get("currency")?,
        stock: row.try_get("stock")?,
        status: row.try_get("status")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order> {
    let shipper: Option<Json<Shipper>> = row.try_get("shipper")?;
    Ok(Order {
        id: row.try_get("id")?,
        order_code: row.try_get("order_code")?,
        customer_id: row.try_get("customer_id")?,
        customer_name: row.try_get("customer_name")?,
        customer_phone: row.try_get("customer_phone")?,
        customer_email: row.try_get("customer_email")?,
        subtotal: row.try_get("subtotal")?,
        shipping_fee: row.try_get("shipping_fee")?,
        discount: row.try_get("discount")?,
        total_amount: row.try_get("total_amount")?,
        currency: row.try_get("currency")?,
        payment_method: row.try_get("payment_method")?,
        payment_status: row.try_get("payment_status")?,
        shipping_order_code: row.try_get("shipping_order_code")?,
        shipping_status: row.try_get("shipping_status")?,
        receiver_name: row.try_get("receiver_name")?,
        receiver_phone: row.try_get("receiver_phone")?,
        receiver_address: row.try_get("receiver_address")?,
        shipper: shipper.map(|j| j.0),
        estimated_delivery_time: row.try_get("estimated_delivery_time")?,
        delivered_at: row.try_get("delivered_at")?,
        failed_reason: row.try_get("failed_reason")?,
        order_status: row.try_get("order_status")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn item_from_row(row: &PgRow) -> Result<OrderItem> {
    Ok(OrderItem {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        total_price: row.try_get("total_price")?,
    })
}

/// Product store backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn create(&self, product: Product) -> Result<Product> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, currency, stock, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.currency)
        .bind(product.stock)
        .bind(&product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to create product: {}", e))?;

        Ok(product)
    }

    async fn get(&self, id: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch product: {}", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn list(&self, page: Page) -> Result<Vec<Product>> {
        let page = page.clamped();
        let rows = sqlx::query("SELECT * FROM products ORDER BY updated_at DESC OFFSET $1 LIMIT $2")
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to list products: {}", e))?;

        rows.iter().map(product_from_row).collect()
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        let row = sqlx::query("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to fetch product: {}", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut product = product_from_row(&row)?;

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

        sqlx::query(
            "UPDATE products
             SET name = $2, description = $3, price = $4, currency = $5,
                 stock = $6, status = $7, updated_at = $8
             WHERE id = $1",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.currency)
        .bind(product.stock)
        .bind(&product.status)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| anyhow!("Failed to update product: {}", e))?;

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit product update: {}", e))?;

        Ok(Some(product))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to delete product: {}", e))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Order store backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_items(&self, order_id: &Uuid) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch order items: {}", e))?;

        rows.iter().map(item_from_row).collect()
    }

    async fn aggregate(&self, order: Order) -> Result<OrderWithItems> {
        let items = self.fetch_items(&order.id).await?;
        Ok(OrderWithItems { order, items })
    }
}

fn bind_order_values<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    order: &'q Order,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(order.id)
        .bind(&order.order_code)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(order.subtotal)
        .bind(order.shipping_fee)
        .bind(order.discount)
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(&order.payment_method)
        .bind(&order.payment_status)
        .bind(&order.shipping_order_code)
        .bind(&order.shipping_status)
        .bind(&order.receiver_name)
        .bind(&order.receiver_phone)
        .bind(&order.receiver_address)
        .bind(order.shipper.as_ref().map(Json))
        .bind(order.estimated_delivery_time)
        .bind(order.delivered_at)
        .bind(&order.failed_reason)
        .bind(&order.order_status)
        .bind(order.created_at)
        .bind(order.updated_at)
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create(&self, order: Order, items: Vec<OrderItem>) -> Result<OrderWithItems> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        bind_order_values(
            sqlx::query(
                "INSERT INTO orders (
                    id, order_code, customer_id, customer_name, customer_phone, customer_email,
                    subtotal, shipping_fee, discount, total_amount, currency,
                    payment_method, payment_status,
                    shipping_order_code, shipping_status,
                    receiver_name, receiver_phone, receiver_address,
                    shipper, estimated_delivery_time, delivered_at, failed_reason,
                    order_status, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                          $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)",
            ),
            &order,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| anyhow!("Failed to insert order: {}", e))?;

        let mut stored_items = Vec::with_capacity(items.len());
        for item in &items {
            let row = sqlx::query(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price, total_price)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id",
            )
            .bind(order.id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to insert order item: {}", e))?;

            stored_items.push(OrderItem {
                id: row.try_get("id")?,
                order_id: order.id,
                ..item.clone()
            });
        }

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit order: {}", e))?;

        Ok(OrderWithItems {
            order,
            items: stored_items,
        })
    }

    async fn get(&self, id: &Uuid) -> Result<Option<OrderWithItems>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch order: {}", e))?;

        match row {
            Some(row) => Ok(Some(self.aggregate(order_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn get_by_code(&self, order_code: &str) -> Result<Option<OrderWithItems>> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_code = $1")
            .bind(order_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch order by code: {}", e))?;

        match row {
            Some(row) => Ok(Some(self.aggregate(order_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, page: Page) -> Result<Vec<OrderWithItems>> {
        let page = page.clamped();
        let rows = sqlx::query("SELECT * FROM orders ORDER BY updated_at DESC OFFSET $1 LIMIT $2")
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to list orders: {}", e))?;

        let mut aggregates = Vec::with_capacity(rows.len());
        for row in &rows {
            aggregates.push(self.aggregate(order_from_row(row)?).await?);
        }
        Ok(aggregates)
    }

    async fn update(&self, order: Order) -> Result<Option<OrderWithItems>> {
        let result = bind_order_values(
            sqlx::query(
                "UPDATE orders SET
                    order_code = $2, customer_id = $3, customer_name = $4,
                    customer_phone = $5, customer_email = $6,
                    subtotal = $7, shipping_fee = $8, discount = $9, total_amount = $10,
                    currency = $11, payment_method = $12, payment_status = $13,
                    shipping_order_code = $14, shipping_status = $15,
                    receiver_name = $16, receiver_phone = $17, receiver_address = $18,
                    shipper = $19, estimated_delivery_time = $20, delivered_at = $21,
                    failed_reason = $22, order_status = $23, created_at = $24, updated_at = $25
                 WHERE id = $1",
            ),
            &order,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to update order: {}", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(self.aggregate(order).await?))
    }
}
