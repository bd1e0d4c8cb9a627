//! Deterministic demo data the storefront session boots with.

use rust_decimal::Decimal;

use crate::catalog::Catalog;
use crate::domain::product::{Product, ProductId};
use crate::domain::profile::UserProfile;
use crate::recommendations::SimilarUser;

#[derive(Debug, Clone, Copy)]
struct ProductSeed {
    id: u32,
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    category: &'static str,
    tags: &'static [&'static str],
    related_categories: &'static [&'static str],
    stock: u32,
    rating: f64,
    reviews: u32,
    featured: bool,
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed {
        id: 1,
        name: "Premium Wireless Headphones",
        description: "High-quality wireless headphones with noise cancellation",
        price_cents: 29_999,
        category: "electronics",
        tags: &["audio", "wireless", "premium", "noise-cancelling"],
        related_categories: &["electronics", "music", "gaming"],
        stock: 25,
        rating: 4.8,
        reviews: 124,
        featured: true,
    },
    ProductSeed {
        id: 2,
        name: "Organic Cotton T-Shirt",
        description: "Comfortable organic cotton t-shirt in various colors",
        price_cents: 2_999,
        category: "clothing",
        tags: &["clothing", "cotton", "organic", "casual"],
        related_categories: &["clothing", "fashion", "casual"],
        stock: 50,
        rating: 4.5,
        reviews: 89,
        featured: false,
    },
    ProductSeed {
        id: 3,
        name: "Smart Fitness Watch",
        description: "Advanced fitness tracking with heart rate monitor",
        price_cents: 19_999,
        category: "electronics",
        tags: &["fitness", "smart", "health", "tracking"],
        related_categories: &["electronics", "fitness", "health"],
        stock: 15,
        rating: 4.7,
        reviews: 203,
        featured: true,
    },
    ProductSeed {
        id: 4,
        name: "Artisan Coffee Beans",
        description: "Premium single-origin coffee beans, freshly roasted",
        price_cents: 2_499,
        category: "food",
        tags: &["coffee", "premium", "organic", "artisan"],
        related_categories: &["food", "beverage", "gourmet"],
        stock: 100,
        rating: 4.9,
        reviews: 156,
        featured: false,
    },
    ProductSeed {
        id: 5,
        name: "Eco-Friendly Water Bottle",
        description: "Sustainable stainless steel water bottle",
        price_cents: 1_999,
        category: "lifestyle",
        tags: &["eco-friendly", "sustainable", "water", "bottle"],
        related_categories: &["lifestyle", "fitness", "eco"],
        stock: 75,
        rating: 4.6,
        reviews: 67,
        featured: false,
    },
    ProductSeed {
        id: 6,
        name: "Wireless Gaming Mouse",
        description: "High-precision gaming mouse with RGB lighting",
        price_cents: 7_999,
        category: "electronics",
        tags: &["gaming", "wireless", "precision", "rgb"],
        related_categories: &["electronics", "gaming", "computer"],
        stock: 30,
        rating: 4.4,
        reviews: 91,
        featured: true,
    },
    ProductSeed {
        id: 7,
        name: "Yoga Mat Pro",
        description: "Non-slip premium yoga mat for all skill levels",
        price_cents: 4_999,
        category: "fitness",
        tags: &["yoga", "fitness", "exercise", "non-slip"],
        related_categories: &["fitness", "health", "lifestyle"],
        stock: 40,
        rating: 4.7,
        reviews: 78,
        featured: false,
    },
    ProductSeed {
        id: 8,
        name: "Bluetooth Speaker",
        description: "Portable wireless speaker with deep bass",
        price_cents: 8_999,
        category: "electronics",
        tags: &["audio", "bluetooth", "portable", "speaker"],
        related_categories: &["electronics", "music", "portable"],
        stock: 35,
        rating: 4.5,
        reviews: 112,
        featured: false,
    },
    ProductSeed {
        id: 9,
        name: "Protein Powder",
        description: "Whey protein powder for muscle building",
        price_cents: 3_999,
        category: "fitness",
        tags: &["protein", "fitness", "supplement", "muscle"],
        related_categories: &["fitness", "health", "nutrition"],
        stock: 60,
        rating: 4.6,
        reviews: 89,
        featured: false,
    },
    ProductSeed {
        id: 10,
        name: "LED Desk Lamp",
        description: "Adjustable LED desk lamp with multiple brightness levels",
        price_cents: 5_999,
        category: "home",
        tags: &["led", "desk", "lamp", "adjustable"],
        related_categories: &["home", "office", "lighting"],
        stock: 45,
        rating: 4.4,
        reviews: 67,
        featured: false,
    },
];

#[derive(Debug, Clone, Copy)]
struct SimilarUserSeed {
    purchases: &'static [u32],
    similarity: f64,
}

const SIMILAR_USER_SEEDS: &[SimilarUserSeed] = &[
    SimilarUserSeed { purchases: &[1, 3, 6, 8], similarity: 0.8 },
    SimilarUserSeed { purchases: &[2, 4, 5, 9], similarity: 0.6 },
    SimilarUserSeed { purchases: &[1, 7, 9, 10], similarity: 0.7 },
];

const DEMO_PREFERENCES: &[(&str, f64)] =
    &[("electronics", 0.7), ("fitness", 0.5), ("food", 0.3), ("lifestyle", 0.4)];
const DEMO_PURCHASES: &[u32] = &[1, 3, 4];
const DEMO_VIEWS: &[u32] = &[1, 2, 3, 6, 7];

fn build_product(seed: &ProductSeed) -> Product {
    Product {
        id: ProductId(seed.id),
        name: seed.name.to_owned(),
        description: seed.description.to_owned(),
        price: Decimal::new(seed.price_cents, 2),
        category: seed.category.to_owned(),
        tags: seed.tags.iter().map(|tag| (*tag).to_owned()).collect(),
        related_categories: seed.related_categories.iter().map(|c| (*c).to_owned()).collect(),
        stock: seed.stock,
        rating: seed.rating,
        reviews: seed.reviews,
        featured: seed.featured,
    }
}

pub fn demo_catalog() -> Catalog {
    Catalog::new(PRODUCT_SEEDS.iter().map(build_product).collect())
}

pub fn demo_similar_users() -> Vec<SimilarUser> {
    SIMILAR_USER_SEEDS
        .iter()
        .map(|seed| {
            SimilarUser::new(seed.purchases.iter().copied().map(ProductId), seed.similarity)
        })
        .collect()
}

/// The returning shopper profile: four category preferences, three purchases and five
/// viewed products.
pub fn demo_profile(browsing_history_limit: usize) -> UserProfile {
    let mut profile = UserProfile::new(browsing_history_limit)
        .with_purchases(DEMO_PURCHASES.iter().copied().map(ProductId))
        .with_views(DEMO_VIEWS.iter().copied().map(ProductId));

    for (category, score) in DEMO_PREFERENCES {
        profile = profile.with_preference(*category, *score);
    }
    profile
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{demo_catalog, demo_profile, demo_similar_users};
    use crate::domain::product::ProductId;

    #[test]
    fn test_demo_catalog_has_ten_unique_products() {
        let catalog = demo_catalog();
        let mut ids: Vec<_> = catalog.products().iter().map(|product| product.id).collect();
        ids.dedup();

        assert_eq!(ids.len(), 10);
        assert_eq!(
            catalog.find(ProductId(1)).map(|product| product.price),
            Some(Decimal::new(29_999, 2))
        );
    }

    #[test]
    fn test_demo_profile_matches_returning_shopper() {
        let profile = demo_profile(20);

        assert_eq!(profile.purchase_history(), &[ProductId(1), ProductId(3), ProductId(4)]);
        assert_eq!(profile.browsing_history.len(), 5);
        assert_eq!(profile.preference("electronics"), Some(0.7));
        assert!(profile.recommendations.is_empty());
    }

    #[test]
    fn test_similar_users_are_fixed() {
        let users = demo_similar_users();
        assert_eq!(users.len(), 3);
        assert!(users[0].purchases.contains(&ProductId(8)));
        assert!((users[2].similarity - 0.7).abs() < f64::EPSILON);
    }
}
