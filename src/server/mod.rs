//! HTTP surface: shared state, DTOs, extractors, handlers, and the router

pub mod dto;
pub mod extract;
pub mod orders;
pub mod products;
pub mod router;

use crate::service::{OrderService, ProductService};

pub use router::build_router;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub products: ProductService,
}

impl AppState {
    pub fn new(orders: OrderService, products: ProductService) -> Self {
        Self { orders, products }
    }
}
