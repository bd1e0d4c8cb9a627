use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::recommendations::Recommendation;

/// Default number of viewed products kept in browsing history.
pub const DEFAULT_BROWSING_HISTORY_LIMIT: usize = 20;

/// Recently viewed product ids, oldest first, without duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsingHistory {
    entries: VecDeque<ProductId>,
    limit: usize,
}

impl BrowsingHistory {
    pub fn new(limit: usize) -> Self {
        Self { entries: VecDeque::with_capacity(limit), limit: limit.max(1) }
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for id in ids {
            history.record(id);
        }
        history
    }

    /// Appends `id` unless already present. Returns the evicted id, if any.
    pub fn record(&mut self, id: ProductId) -> Option<ProductId> {
        if self.entries.contains(&id) {
            return None;
        }

        self.entries.push_back(id);
        if self.entries.len() > self.limit {
            return self.entries.pop_front();
        }
        None
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.entries.iter().copied()
    }

    /// The `count` most recently viewed ids, oldest first.
    pub fn recent(&self, count: usize) -> Vec<ProductId> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).copied().collect()
    }
}

impl Default for BrowsingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_BROWSING_HISTORY_LIMIT)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Category affinity, each score in `[0, 1]`.
    pub preferences: BTreeMap<String, f64>,
    purchase_history: Vec<ProductId>,
    pub browsing_history: BrowsingHistory,
    /// Output of the most recent recompute only.
    pub recommendations: Vec<Recommendation>,
}

impl UserProfile {
    pub fn new(browsing_history_limit: usize) -> Self {
        Self {
            preferences: BTreeMap::new(),
            purchase_history: Vec::new(),
            browsing_history: BrowsingHistory::new(browsing_history_limit),
            recommendations: Vec::new(),
        }
    }

    pub fn with_preference(mut self, category: impl Into<String>, score: f64) -> Self {
        self.preferences.insert(category.into(), clamp_unit(score));
        self
    }

    pub fn with_purchases(mut self, ids: impl IntoIterator<Item = ProductId>) -> Self {
        for id in ids {
            self.record_purchase(id);
        }
        self
    }

    pub fn with_views(mut self, ids: impl IntoIterator<Item = ProductId>) -> Self {
        for id in ids {
            self.browsing_history.record(id);
        }
        self
    }

    pub fn preference(&self, category: &str) -> Option<f64> {
        self.preferences.get(category).copied()
    }

    /// Adds `delta` to the category score and clamps to `[0, 1]`.
    pub fn bump_preference(&mut self, category: &str, delta: f64) -> f64 {
        let score = self.preferences.entry(category.to_owned()).or_insert(0.0);
        *score = clamp_unit(*score + delta);
        *score
    }

    pub fn purchase_history(&self) -> &[ProductId] {
        &self.purchase_history
    }

    pub fn has_purchased(&self, id: ProductId) -> bool {
        self.purchase_history.contains(&id)
    }

    /// Returns false when the id was already recorded.
    pub fn record_purchase(&mut self, id: ProductId) -> bool {
        if self.has_purchased(id) {
            return false;
        }
        self.purchase_history.push(id);
        true
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
