use serde::Serialize;
use storefront_core::{seed, Product, ProductId};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct CatalogOutput<'a> {
    categories: Vec<String>,
    featured: Vec<ProductId>,
    search: Option<&'a str>,
    category: Option<&'a str>,
    products: Vec<&'a Product>,
}

pub fn run(search: Option<&str>, category: Option<&str>) -> CommandResult {
    let catalog = seed::demo_catalog();
    let products = catalog.search(search.unwrap_or_default(), category);
    let message = format!("{} of {} products matched", products.len(), catalog.len());

    let output = CatalogOutput {
        categories: catalog.categories(),
        featured: catalog.featured().iter().map(|product| product.id).collect(),
        search,
        category,
        products,
    };
    CommandResult::success_with("catalog", message, &output)
}
