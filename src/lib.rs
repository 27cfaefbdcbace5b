//! # Shipline
//!
//! An order-management backend: order and product CRUD over HTTP, persisted
//! to a relational store, with order lifecycle events synchronized against
//! one external shipment provider.
//!
//! ## Architecture
//!
//! - [`core`]: domain model, pricing, identifier generation, address
//!   heuristics, and the typed error hierarchy
//! - [`storage`]: `ProductStore`/`OrderStore` traits with in-memory and
//!   PostgreSQL backends
//! - [`gateway`]: the shipment provider client, the single seam across
//!   which this system and the independently-operated provider must stay
//!   consistent
//! - [`service`]: the order lifecycle manager and product catalog service
//! - [`server`]: axum routes, handlers, and request/response DTOs
//! - [`config`]: process configuration built once at startup
//!
//! The one rule every caller can rely on: an order is never committed
//! locally unless the shipment provider has confirmed it first, and a
//! PENDING order is never flipped to CANCELLED unless the provider accepted
//! the cancellation.

pub mod config;
pub mod core;
pub mod gateway;
pub mod server;
pub mod service;
pub mod storage;
