use std::collections::HashSet;

use crate::Product;

/// Keeps the first occurrence of each key, in input order.
///
/// Returned products carry the trimmed title and url; blank keys are dropped.
pub fn dedupe(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::with_capacity(products.len());
    let mut unique = Vec::with_capacity(products.len());
    for product in products {
        let key = product.key();
        if key.is_blank() || seen.contains(&key) {
            continue;
        }
        seen.insert(key.clone());
        unique.push(Product::from(key));
    }
    unique
}
