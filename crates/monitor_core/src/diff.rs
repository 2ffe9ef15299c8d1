use std::collections::HashSet;

use crate::{Product, ProductKey};

/// Products in `current` whose key is absent from `previous`, in `current` order.
pub fn added_products(previous: &[Product], current: &[Product]) -> Vec<Product> {
    let known: HashSet<ProductKey> = previous.iter().map(Product::key).collect();
    current
        .iter()
        .filter(|product| !known.contains(&product.key()))
        .cloned()
        .collect()
}
