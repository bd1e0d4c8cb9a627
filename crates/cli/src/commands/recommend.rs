use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::recommendations::{Recommendation, RecommendationType};
use storefront_core::config::AppConfig;
use storefront_core::{ProductId, Session};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationRow {
    product_id: ProductId,
    product_name: String,
    price: Decimal,
    confidence: f64,
    #[serde(rename = "match")]
    match_percentage: String,
    reason: String,
    #[serde(rename = "type")]
    kind: RecommendationType,
}

impl From<&Recommendation> for RecommendationRow {
    fn from(recommendation: &Recommendation) -> Self {
        Self {
            product_id: recommendation.product_id,
            product_name: recommendation.product_name.clone(),
            price: recommendation.price,
            confidence: recommendation.confidence,
            match_percentage: recommendation.display_percentage(),
            reason: recommendation.reason.clone(),
            kind: recommendation.kind,
        }
    }
}

#[derive(Debug, Serialize)]
struct RecommendOutput {
    session_id: String,
    recommendations: Vec<RecommendationRow>,
}

pub fn run(config: &AppConfig) -> CommandResult {
    let mut session = Session::demo(config);
    let recommendations: Vec<RecommendationRow> =
        session.recommendations().iter().map(RecommendationRow::from).collect();

    let message = format!("{} recommendations for the demo shopper", recommendations.len());
    let output = RecommendOutput { session_id: session.id().to_string(), recommendations };
    CommandResult::success_with("recommend", message, &output)
}
