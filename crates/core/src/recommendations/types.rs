//! Types for the recommendation engine

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::product::{Product, ProductId};
use crate::domain::profile::UserProfile;

/// Which scoring pass produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationType {
    #[serde(rename = "collaborative")]
    Collaborative,
    #[serde(rename = "content-based")]
    ContentBased,
    #[serde(rename = "trending")]
    Trending,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Collaborative => "collaborative",
            RecommendationType::ContentBased => "content-based",
            RecommendationType::Trending => "trending",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked recommendation as stored on the user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_id: ProductId,
    /// Product name at the time of computation
    pub product_name: String,
    pub price: Decimal,
    /// Weighted confidence (not a probability)
    pub confidence: f64,
    /// Human-readable reasoning
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
}

impl Recommendation {
    /// Display percentage, e.g. `35% match`
    pub fn display_percentage(&self) -> String {
        format!("{:.0}% match", self.confidence * 100.0)
    }
}

/// Unweighted output of a single scoring pass, before merge
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub product: &'a Product,
    /// Raw pass confidence, before the per-type weight
    pub confidence: f64,
    pub reason: String,
    pub kind: RecommendationType,
}

impl Candidate<'_> {
    pub fn into_recommendation(self, weight: f64) -> Recommendation {
        Recommendation {
            product_id: self.product.id,
            product_name: self.product.name.clone(),
            price: self.product.price,
            confidence: self.confidence * weight,
            reason: self.reason,
            kind: self.kind,
        }
    }
}

/// Stand-in for a collaborative-filtering neighbour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarUser {
    pub purchases: BTreeSet<ProductId>,
    /// Similarity to the current shopper in `[0, 1]`
    pub similarity: f64,
}

impl SimilarUser {
    pub fn new(purchases: impl IntoIterator<Item = ProductId>, similarity: f64) -> Self {
        Self { purchases: purchases.into_iter().collect(), similarity: similarity.clamp(0.0, 1.0) }
    }
}

/// Read-only view handed to every scoring pass
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub catalog: &'a Catalog,
    pub profile: &'a UserProfile,
    pub similar_users: &'a [SimilarUser],
}

impl<'a> ScoringInput<'a> {
    pub fn new(
        catalog: &'a Catalog,
        profile: &'a UserProfile,
        similar_users: &'a [SimilarUser],
    ) -> Self {
        Self { catalog, profile, similar_users }
    }

    /// Catalog products the shopper has not bought yet
    pub fn unpurchased(&self) -> impl Iterator<Item = &'a Product> + 'a {
        let profile = self.profile;
        self.catalog.products().iter().filter(move |product| !profile.has_purchased(product.id))
    }
}
