use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::product::ProductId;
use crate::domain::profile::UserProfile;
use crate::errors::DomainError;
use crate::recommendations::{RecommendationEngine, SimilarUser};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Purchase,
    CartAdd,
}

impl InteractionKind {
    /// Added to the product category's preference score, then clamped to `[0, 1]`.
    pub fn preference_delta(self) -> f64 {
        match self {
            Self::View => 0.1,
            Self::Purchase => 0.3,
            Self::CartAdd => 0.2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Purchase => "purchase",
            Self::CartAdd => "cart_add",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "purchase" => Ok(Self::Purchase),
            "cart_add" | "cart-add" | "cartadd" => Ok(Self::CartAdd),
            other => Err(DomainError::InvalidInteraction(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Applied {
        kind: InteractionKind,
        product_id: ProductId,
        category: String,
        /// Category preference after the update
        preference: f64,
        /// False when the id was already in the relevant history
        history_changed: bool,
        evicted: Option<ProductId>,
    },
    UnknownProduct {
        product_id: ProductId,
    },
    UnknownAction {
        action: String,
    },
}

impl RecordOutcome {
    /// Whether the profile changed and a recompute is due.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Applies interaction events to a user profile.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionTracker;

impl InteractionTracker {
    pub fn new() -> Self {
        Self
    }

    /// Mutate `profile` for one interaction without recomputing recommendations.
    ///
    /// Unknown products leave the profile untouched.
    pub fn apply(
        &self,
        kind: InteractionKind,
        product_id: ProductId,
        profile: &mut UserProfile,
        catalog: &Catalog,
    ) -> RecordOutcome {
        let Some(product) = catalog.find(product_id) else {
            debug!(
                event_name = "interaction.unknown_product",
                action = kind.as_str(),
                product_id = product_id.0,
                "interaction ignored for unknown product"
            );
            return RecordOutcome::UnknownProduct { product_id };
        };

        let (history_changed, evicted) = match kind {
            InteractionKind::View => {
                let already_seen = profile.browsing_history.contains(product_id);
                let evicted = profile.browsing_history.record(product_id);
                (!already_seen, evicted)
            }
            InteractionKind::Purchase => (profile.record_purchase(product_id), None),
            InteractionKind::CartAdd => (false, None),
        };
        let preference = profile.bump_preference(&product.category, kind.preference_delta());

        debug!(
            event_name = "interaction.applied",
            action = kind.as_str(),
            product_id = product_id.0,
            category = %product.category,
            preference,
            history_changed,
            "interaction applied to profile"
        );

        RecordOutcome::Applied {
            kind,
            product_id,
            category: product.category.clone(),
            preference,
            history_changed,
            evicted,
        }
    }

    /// String-keyed variant for callers that forward raw event names. Unknown
    /// actions are a no-op.
    pub fn apply_action(
        &self,
        action: &str,
        product_id: ProductId,
        profile: &mut UserProfile,
        catalog: &Catalog,
    ) -> RecordOutcome {
        match action.parse::<InteractionKind>() {
            Ok(kind) => self.apply(kind, product_id, profile, catalog),
            Err(_) => {
                debug!(
                    event_name = "interaction.unknown_action",
                    action,
                    product_id = product_id.0,
                    "interaction ignored for unknown action"
                );
                RecordOutcome::UnknownAction { action: action.to_owned() }
            }
        }
    }

    /// Apply the interaction and immediately store a fresh recommendation list on
    /// the profile. Nothing is recomputed when the interaction was a no-op.
    pub fn record(
        &self,
        kind: InteractionKind,
        product_id: ProductId,
        profile: &mut UserProfile,
        catalog: &Catalog,
        engine: &RecommendationEngine,
        similar_users: &[SimilarUser],
    ) -> RecordOutcome {
        let outcome = self.apply(kind, product_id, profile, catalog);
        if outcome.is_applied() {
            profile.recommendations = engine.recompute(catalog, profile, similar_users);
        }
        outcome
    }
}
