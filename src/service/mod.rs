//! Business services orchestrating storage and the shipment gateway

pub mod orders;
pub mod products;

pub use orders::{NewOrder, NewOrderItem, OrderService};
pub use products::{NewProduct, ProductService};
