//! Scoring passes for product recommendations

use std::collections::BTreeSet;

use super::types::*;
use super::{
    COLLABORATIVE_REASON, COLLABORATIVE_SCALE, CONTENT_SIMILARITY_THRESHOLD, TRENDING_REASON,
    TRENDING_THRESHOLD,
};
use crate::domain::product::Product;
use crate::domain::profile::UserProfile;

/// Per-type weights applied when candidates are merged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight for collaborative candidates (default: 0.40)
    pub collaborative: f64,
    /// Weight for content-based candidates (default: 0.50)
    pub content_based: f64,
    /// Weight for trending candidates (default: 0.30)
    pub trending: f64,
}

impl ScoringWeights {
    pub fn weight_for(&self, kind: RecommendationType) -> f64 {
        match kind {
            RecommendationType::Collaborative => self.collaborative,
            RecommendationType::ContentBased => self.content_based,
            RecommendationType::Trending => self.trending,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// A strategy that proposes unweighted candidates for one recommendation type.
pub trait ScoringPass: Send + Sync {
    fn kind(&self) -> RecommendationType;

    /// Produce raw candidates. Implementations must not mutate anything reachable
    /// from `input` and must be deterministic.
    fn candidates<'a>(&self, input: &ScoringInput<'a>) -> Vec<Candidate<'a>>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Purchases of the fixed similar-user list the shopper has not made yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollaborativePass;

impl ScoringPass for CollaborativePass {
    fn kind(&self) -> RecommendationType {
        RecommendationType::Collaborative
    }

    fn candidates<'a>(&self, input: &ScoringInput<'a>) -> Vec<Candidate<'a>> {
        let mut candidates = Vec::new();

        for user in input.similar_users {
            for product_id in &user.purchases {
                if input.profile.has_purchased(*product_id) {
                    continue;
                }
                let Some(product) = input.catalog.find(*product_id) else {
                    continue;
                };

                candidates.push(Candidate {
                    product,
                    confidence: user.similarity * COLLABORATIVE_SCALE,
                    reason: COLLABORATIVE_REASON.to_string(),
                    kind: RecommendationType::Collaborative,
                });
            }
        }

        candidates
    }
}

/// Products resembling something already purchased.
#[derive(Debug, Clone, Copy)]
pub struct ContentBasedPass {
    threshold: f64,
}

impl ContentBasedPass {
    pub fn new() -> Self {
        Self { threshold: CONTENT_SIMILARITY_THRESHOLD }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for ContentBasedPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringPass for ContentBasedPass {
    fn kind(&self) -> RecommendationType {
        RecommendationType::ContentBased
    }

    fn candidates<'a>(&self, input: &ScoringInput<'a>) -> Vec<Candidate<'a>> {
        let mut candidates = Vec::new();

        for purchased_id in input.profile.purchase_history() {
            let Some(purchased) = input.catalog.find(*purchased_id) else {
                continue;
            };

            for product in input.unpurchased() {
                if product.id == purchased.id {
                    continue;
                }

                let similarity = content_similarity(product, purchased);
                if similarity > self.threshold {
                    candidates.push(Candidate {
                        product,
                        confidence: similarity,
                        reason: format!("Similar to {}", purchased.name),
                        kind: RecommendationType::ContentBased,
                    });
                }
            }
        }

        candidates
    }
}

/// Highly rated, well reviewed products, boosted by category preference.
#[derive(Debug, Clone, Copy)]
pub struct TrendingPass {
    threshold: f64,
}

impl TrendingPass {
    pub fn new() -> Self {
        Self { threshold: TRENDING_THRESHOLD }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for TrendingPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringPass for TrendingPass {
    fn kind(&self) -> RecommendationType {
        RecommendationType::Trending
    }

    fn candidates<'a>(&self, input: &ScoringInput<'a>) -> Vec<Candidate<'a>> {
        input
            .unpurchased()
            .map(|product| (product, trending_score(product, input.profile)))
            .filter(|(_, score)| *score > self.threshold)
            .map(|(product, score)| Candidate {
                product,
                confidence: score,
                reason: TRENDING_REASON.to_string(),
                kind: RecommendationType::Trending,
            })
            .collect()
    }
}

/// Category, tag and related-category overlap between two products.
///
/// Ratios use `max(|a|, |b|, 1)` as the denominator so empty sets contribute 0.
pub fn content_similarity(candidate: &Product, purchased: &Product) -> f64 {
    let mut similarity = 0.0;

    if candidate.category == purchased.category {
        similarity += 0.5;
    }
    similarity += overlap_ratio(&candidate.tags, &purchased.tags) * 0.3;
    similarity += overlap_ratio(&candidate.related_categories, &purchased.related_categories) * 0.2;

    similarity
}

/// Rating and review volume, multiplied by `1 + preference` for a preferred
/// category, capped at 1.0.
pub fn trending_score(product: &Product, profile: &UserProfile) -> f64 {
    let mut score = product.rating * 0.3 + (f64::from(product.reviews) / 300.0) * 0.3;

    if let Some(preference) = profile.preference(&product.category).filter(|p| *p > 0.0) {
        score *= 1.0 + preference;
    }

    score.min(1.0)
}

fn overlap_ratio(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let shared = a.intersection(b).count();
    if shared == 0 {
        return 0.0;
    }

    let denominator = a.len().max(b.len()).max(1);
    shared as f64 / denominator as f64
}
