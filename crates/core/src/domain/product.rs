use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub related_categories: BTreeSet<String>,
    pub stock: u32,
    /// Average review rating in `[0, 5]`.
    pub rating: f64,
    pub reviews: u32,
    pub featured: bool,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use super::{Product, ProductId};

    fn lamp() -> Product {
        Product {
            id: ProductId(10),
            name: "LED Desk Lamp".to_string(),
            description: "Adjustable LED desk lamp with multiple brightness levels".to_string(),
            price: Decimal::new(5999, 2),
            category: "home".to_string(),
            tags: BTreeSet::from(["led".to_string(), "desk".to_string()]),
            related_categories: BTreeSet::from(["home".to_string()]),
            stock: 0,
            rating: 4.4,
            reviews: 67,
            featured: false,
        }
    }

    #[test]
    fn test_term_matching_ignores_case_and_checks_description() {
        let product = lamp();

        assert!(product.matches_term("desk"));
        assert!(product.matches_term("BRIGHTNESS"));
        assert!(product.matches_term("  "));
        assert!(!product.matches_term("coffee"));
    }

    #[test]
    fn test_zero_stock_is_not_in_stock() {
        assert!(!lamp().in_stock());
    }

    #[test]
    fn test_product_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&ProductId(4)).expect("serialize id");
        assert_eq!(json, "4");
    }
}
