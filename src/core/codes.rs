//! Identifier generation for order codes and product ids
//!
//! Neither generator guarantees uniqueness by construction; callers loop
//! generate-and-check against the store until no collision is found. The
//! keyspace makes collisions negligible, but the check must be a loop, not a
//! single attempt.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

/// Generate an order code in the format `ORD-YYYYMMDD-HHMMSS-XXXX` (UTC).
pub fn order_code() -> String {
    let now = Utc::now();
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("ORD-{}-{:04}", now.format("%Y%m%d-%H%M%S"), suffix)
}

/// Generate a product id as a random 128-bit token rendered as a string.
pub fn product_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_order_code_format() {
        let re = Regex::new(r"^ORD-\d{8}-\d{6}-\d{4}$").unwrap();
        for _ in 0..100 {
            let code = order_code();
            assert!(re.is_match(&code), "unexpected code format: {code}");
        }
    }

    #[test]
    fn test_product_ids_unique_in_batch() {
        let batch: HashSet<String> = (0..1000).map(|_| product_id()).collect();
        assert_eq!(batch.len(), 1000);
    }

    #[test]
    fn test_product_id_parses_as_uuid() {
        assert!(Uuid::parse_str(&product_id()).is_ok());
    }
}
