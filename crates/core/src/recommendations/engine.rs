//! Recommendation Engine implementation

use tracing::debug;

use super::scoring::{CollaborativePass, ContentBasedPass, ScoringPass, ScoringWeights, TrendingPass};
use super::types::*;
use super::DEFAULT_MAX_RECOMMENDATIONS;
use crate::catalog::Catalog;
use crate::config::RecommendationConfig;
use crate::domain::profile::UserProfile;

/// Runs every scoring pass, weights the candidates and merges them into a ranked list.
///
/// The engine owns no session state; `recompute` is a pure function of its inputs.
pub struct RecommendationEngine {
    passes: Vec<Box<dyn ScoringPass>>,
    weights: ScoringWeights,
    max_results: usize,
}

impl RecommendationEngine {
    /// Create a new engine with the three standard passes and default weights
    pub fn new() -> Self {
        Self::with_weights(ScoringWeights::default())
    }

    /// Create with custom weights
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self {
            passes: vec![
                Box::new(CollaborativePass),
                Box::new(ContentBasedPass::new()),
                Box::new(TrendingPass::new()),
            ],
            weights,
            max_results: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }

    pub fn from_config(config: &RecommendationConfig) -> Self {
        Self {
            passes: vec![
                Box::new(CollaborativePass),
                Box::new(ContentBasedPass::with_threshold(config.content_threshold)),
                Box::new(TrendingPass::with_threshold(config.trending_threshold)),
            ],
            weights: ScoringWeights {
                collaborative: config.collaborative_weight,
                content_based: config.content_weight,
                trending: config.trending_weight,
            },
            max_results: config.max_results,
        }
    }

    /// Replace the scoring passes. Passes run, and merge, in the given order.
    pub fn with_passes(mut self, passes: Vec<Box<dyn ScoringPass>>) -> Self {
        self.passes = passes;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Rank recommendations for `profile`: at most `max_results`, sorted by
    /// descending confidence, one entry per product.
    pub fn recompute(
        &self,
        catalog: &Catalog,
        profile: &UserProfile,
        similar_users: &[SimilarUser],
    ) -> Vec<Recommendation> {
        let input = ScoringInput::new(catalog, profile, similar_users);
        let mut weighted = Vec::new();

        for pass in &self.passes {
            let weight = self.weights.weight_for(pass.kind());
            let candidates = pass.candidates(&input);
            debug!(
                event_name = "recommendations.pass_completed",
                pass = pass.name(),
                kind = pass.kind().as_str(),
                candidates = candidates.len(),
                "scoring pass completed"
            );

            weighted.extend(
                candidates
                    .into_iter()
                    .map(|candidate| candidate.into_recommendation(weight))
                    .filter(|recommendation| recommendation.confidence.is_finite()),
            );
        }

        let candidate_count = weighted.len();
        let ranked = merge_candidates(weighted, self.max_results);
        debug!(
            event_name = "recommendations.recomputed",
            candidates = candidate_count,
            selected = ranked.len(),
            "recommendations recomputed"
        );

        ranked
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Deduplicate weighted candidates by product and keep the top `max_results`.
///
/// Candidates are folded in order: a candidate replaces the kept entry for its
/// product when its confidence is greater or equal, and moves to the back. The
/// result is stably sorted by descending confidence, so equal scores keep fold
/// order.
pub fn merge_candidates(candidates: Vec<Recommendation>, max_results: usize) -> Vec<Recommendation> {
    let mut merged: Vec<Recommendation> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match merged.iter().position(|kept| kept.product_id == candidate.product_id) {
            Some(index) if merged[index].confidence <= candidate.confidence => {
                merged.remove(index);
                merged.push(candidate);
            }
            Some(_) => {}
            None => merged.push(candidate),
        }
    }

    merged.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    merged.truncate(max_results);
    merged
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::product::ProductId;
    use crate::recommendations::{COLLABORATIVE_REASON, TRENDING_REASON};
    use crate::seed;

    fn rec(id: u32, confidence: f64, kind: RecommendationType) -> Recommendation {
        Recommendation {
            product_id: ProductId(id),
            product_name: format!("Product {id}"),
            price: Decimal::ONE,
            confidence,
            reason: String::new(),
            kind,
        }
    }

    #[test]
    fn test_demo_profile_ranking() {
        let engine = RecommendationEngine::new();
        let catalog = seed::demo_catalog();
        let profile = seed::demo_profile(20);
        let similar_users = seed::demo_similar_users();

        let ranked = engine.recompute(&catalog, &profile, &similar_users);

        let ids: Vec<u32> = ranked.iter().map(|r| r.product_id.0).collect();
        assert_eq!(ids, vec![6, 8, 2, 5, 7, 9, 10]);
        assert_eq!(ranked[0].kind, RecommendationType::ContentBased);
        assert_eq!(ranked[0].reason, "Similar to Premium Wireless Headphones");
        assert_eq!(ranked[2].kind, RecommendationType::Trending);
        assert_eq!(ranked[2].reason, TRENDING_REASON);
        assert!((ranked[2].confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_never_recommends_purchased_products() {
        let engine = RecommendationEngine::new();
        let catalog = seed::demo_catalog();
        let profile = seed::demo_profile(20);
        let similar_users = seed::demo_similar_users();

        let ranked = engine.recompute(&catalog, &profile, &similar_users);

        for purchased in [1, 3, 4] {
            assert!(ranked.iter().all(|r| r.product_id != ProductId(purchased)));
        }
    }

    #[test]
    fn test_output_is_bounded_sorted_and_unique() {
        let engine = RecommendationEngine::new();
        let catalog = seed::demo_catalog();
        let profile = UserProfile::new(20);
        let similar_users = seed::demo_similar_users();

        let ranked = engine.recompute(&catalog, &profile, &similar_users);

        assert_eq!(ranked.len(), 8);
        let unique: HashSet<_> = ranked.iter().map(|r| r.product_id).collect();
        assert_eq!(unique.len(), ranked.len());
        assert!(ranked.windows(2).all(|pair| pair[0].confidence >= pair[1].confidence));
    }

    #[test]
    fn test_recompute_is_pure() {
        let engine = RecommendationEngine::new();
        let catalog = seed::demo_catalog();
        let profile = seed::demo_profile(20);
        let before = profile.clone();
        let similar_users = seed::demo_similar_users();

        let first = engine.recompute(&catalog, &profile, &similar_users);
        let second = engine.recompute(&catalog, &profile, &similar_users);

        assert_eq!(first, second);
        assert_eq!(profile, before);
    }

    #[test]
    fn test_empty_inputs_yield_empty_list() {
        let engine = RecommendationEngine::new();
        let ranked = engine.recompute(&Catalog::default(), &UserProfile::new(20), &[]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_merge_keeps_highest_confidence() {
        let merged = merge_candidates(
            vec![
                rec(1, 0.2, RecommendationType::Collaborative),
                rec(1, 0.5, RecommendationType::ContentBased),
                rec(1, 0.3, RecommendationType::Trending),
            ],
            8,
        );

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, RecommendationType::ContentBased);
    }

    #[test]
    fn test_merge_ties_go_to_later_pass() {
        let merged = merge_candidates(
            vec![
                rec(1, 0.3, RecommendationType::Collaborative),
                rec(2, 0.3, RecommendationType::Collaborative),
                rec(1, 0.3, RecommendationType::Trending),
            ],
            8,
        );

        assert_eq!(merged[0].product_id, ProductId(2));
        assert_eq!(merged[1].product_id, ProductId(1));
        assert_eq!(merged[1].kind, RecommendationType::Trending);
    }

    #[test]
    fn test_merge_truncates() {
        let candidates =
            (1..=12).map(|id| rec(id, f64::from(id) / 100.0, RecommendationType::Trending)).collect();
        let merged = merge_candidates(candidates, 8);

        assert_eq!(merged.len(), 8);
        assert_eq!(merged[0].product_id, ProductId(12));
        assert_eq!(merged[7].product_id, ProductId(5));
    }

    #[test]
    fn test_custom_passes_and_weights() {
        let engine = RecommendationEngine::with_weights(ScoringWeights {
            collaborative: 1.0,
            content_based: 0.0,
            trending: 0.0,
        })
        .with_passes(vec![Box::new(CollaborativePass)])
        .with_max_results(3);
        let catalog = seed::demo_catalog();
        let profile = seed::demo_profile(20);
        let similar_users = seed::demo_similar_users();

        let ranked = engine.recompute(&catalog, &profile, &similar_users);

        assert_eq!(engine.pass_names(), vec!["CollaborativePass"]);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|r| r.reason == COLLABORATIVE_REASON));
        assert!((ranked[0].confidence - 0.64).abs() < 1e-9);
    }
}
