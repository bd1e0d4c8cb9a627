//! Recommendation Engine
//!
//! Blends three heuristics over the in-memory catalog: purchases of similar
//! shoppers, content similarity to past purchases, and preference-boosted
//! trending products.

mod engine;
mod scoring;
mod types;

pub use engine::{merge_candidates, RecommendationEngine};
pub use scoring::{
    content_similarity, trending_score, CollaborativePass, ContentBasedPass, ScoringPass,
    ScoringWeights, TrendingPass,
};
pub use types::*;

/// Default per-type merge weights
pub const DEFAULT_WEIGHTS: ScoringWeights =
    ScoringWeights { collaborative: 0.40, content_based: 0.50, trending: 0.30 };

/// Maximum recommendations kept on the profile
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 8;

/// Content similarity must exceed this to produce a candidate
pub const CONTENT_SIMILARITY_THRESHOLD: f64 = 0.30;

/// Trending score must exceed this to produce a candidate
pub const TRENDING_THRESHOLD: f64 = 0.40;

/// Similar-user similarity is scaled by this before the merge weight
pub const COLLABORATIVE_SCALE: f64 = 0.80;

pub const COLLABORATIVE_REASON: &str = "Users with similar interests also bought this";
pub const TRENDING_REASON: &str = "Trending in your interests";
