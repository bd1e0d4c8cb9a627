use std::collections::BTreeSet;

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// Category filter value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn find(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == product_id)
    }

    pub fn find_mut(&mut self, product_id: ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|product| product.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct product categories in sorted order.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|product| product.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Products whose name or description contains `term`, optionally limited to one
    /// category. `None` or `"all"` matches every category.
    pub fn search(&self, term: &str, category: Option<&str>) -> Vec<&Product> {
        let category = category.filter(|value| !value.eq_ignore_ascii_case(ALL_CATEGORIES));

        self.products
            .iter()
            .filter(|product| product.matches_term(term))
            .filter(|product| {
                category.map(|wanted| product.category.eq_ignore_ascii_case(wanted)).unwrap_or(true)
            })
            .collect()
    }

    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|product| product.featured).collect()
    }

    /// Raises stock by `amount` and returns the new level.
    pub fn restock(&mut self, product_id: ProductId, amount: u32) -> Result<u32, DomainError> {
        let product =
            self.find_mut(product_id).ok_or(DomainError::UnknownProduct(product_id))?;

        product.stock = product.stock.saturating_add(amount);
        Ok(product.stock)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;
    use crate::errors::DomainError;
    use crate::seed;

    #[test]
    fn test_search_matches_name_and_filters_category() {
        let catalog = seed::demo_catalog();

        let wireless = catalog.search("wireless", None);
        let ids: Vec<_> = wireless.iter().map(|product| product.id).collect();
        assert_eq!(ids, vec![ProductId(1), ProductId(6), ProductId(8)]);

        let electronics_only = catalog.search("", Some("electronics"));
        assert_eq!(electronics_only.len(), 4);

        assert_eq!(catalog.search("", Some("all")).len(), catalog.len());
    }

    #[test]
    fn test_categories_are_unique_and_sorted() {
        let catalog = seed::demo_catalog();
        assert_eq!(
            catalog.categories(),
            vec!["clothing", "electronics", "fitness", "food", "home", "lifestyle"]
        );
    }

    #[test]
    fn test_restock_adds_units_and_rejects_unknown_products() {
        let mut catalog = seed::demo_catalog();

        assert_eq!(catalog.restock(ProductId(3), 10), Ok(25));
        assert_eq!(catalog.restock(ProductId(99), 10), Err(DomainError::UnknownProduct(ProductId(99))));
    }

    #[test]
    fn test_featured_lists_flagged_products() {
        let catalog = seed::demo_catalog();
        let ids: Vec<_> = catalog.featured().iter().map(|product| product.id).collect();
        assert_eq!(ids, vec![ProductId(1), ProductId(3), ProductId(6)]);
    }
}
