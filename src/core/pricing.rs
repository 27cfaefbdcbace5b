//! Pricing arithmetic for order creation
//!
//! Unit prices come from the product's current price at order time and are
//! stored on the item as a snapshot; they are never re-queried later. No
//! rounding policy beyond `f64`; currency is a plain tag.

use crate::core::model::Product;

/// One priced line of a quote.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Result of pricing an item list.
#[derive(Debug, Clone)]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub discount: f64,
    pub total_amount: f64,
}

/// Price an ordered list of (product, quantity) pairs.
///
/// `total = subtotal + shipping_fee - discount`.
pub fn quote(items: &[(&Product, i64)], shipping_fee: f64, discount: f64) -> Quote {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = 0.0;

    for (product, quantity) in items {
        let unit_price = product.price;
        let total_price = unit_price * *quantity as f64;
        subtotal += total_price;
        lines.push(PricedLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: *quantity,
            unit_price,
            total_price,
        });
    }

    Quote {
        lines,
        subtotal,
        shipping_fee,
        discount,
        total_amount: subtotal + shipping_fee - discount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{DEFAULT_CURRENCY, product_status};
    use chrono::Utc;

    fn product(id: &str, price: f64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: None,
            price,
            currency: DEFAULT_CURRENCY.to_string(),
            stock: 10,
            status: product_status::ACTIVE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_subtotal_is_sum_of_line_totals() {
        let a = product("a", 100.0);
        let b = product("b", 25.5);
        let q = quote(&[(&a, 2), (&b, 4)], 0.0, 0.0);
        assert_eq!(q.lines.len(), 2);
        assert_eq!(q.lines[0].total_price, 200.0);
        assert_eq!(q.lines[1].total_price, 102.0);
        assert_eq!(q.subtotal, 302.0);
        assert_eq!(q.total_amount, 302.0);
    }

    #[test]
    fn test_total_includes_fee_and_discount() {
        let a = product("a", 50.0);
        let q = quote(&[(&a, 1)], 15.0, 5.0);
        assert_eq!(q.subtotal, 50.0);
        assert_eq!(q.total_amount, 60.0);
    }

    #[test]
    fn test_empty_item_list() {
        let q = quote(&[], 0.0, 0.0);
        assert!(q.lines.is_empty());
        assert_eq!(q.subtotal, 0.0);
        assert_eq!(q.total_amount, 0.0);
    }

    #[test]
    fn test_unit_price_snapshot_from_current_price() {
        let p = product("a", 100.0);
        let q = quote(&[(&p, 2)], 0.0, 0.0);
        assert_eq!(q.lines[0].unit_price, 100.0);
        assert_eq!(q.lines[0].total_price, 200.0);
    }
}
