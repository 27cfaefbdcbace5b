//! Core module containing the domain model and pure business logic

pub mod address;
pub mod codes;
pub mod error;
pub mod model;
pub mod pricing;

pub use error::{FieldValidationError, ShiplineError, ShiplineResult};
pub use model::{Customer, Order, OrderItem, OrderPatch, OrderWithItems, Product, ProductPatch, Shipper};
