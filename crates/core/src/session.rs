//! Single-shopper storefront session.
//!
//! The session owns catalog, profile and cart. Interactions mutate the profile
//! synchronously; the recommendation rebuild is queued as a task and runs on the
//! next [`Session::flush`] or recommendation read, unless the session is in
//! [`RecomputeMode::Immediate`].

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{AppConfig, RecomputeMode, SessionConfig};
use crate::domain::cart::{Cart, CartLine};
use crate::domain::product::ProductId;
use crate::domain::profile::UserProfile;
use crate::errors::DomainError;
use crate::recommendations::{Recommendation, RecommendationEngine, SimilarUser};
use crate::seed;
use crate::tracker::{InteractionKind, InteractionTracker, RecordOutcome};

/// Work queued on the session and drained on the caller's thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTask {
    RecomputeRecommendations,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    ProfileUpdated { kind: InteractionKind, product_id: ProductId },
    RecommendationsRecomputed { count: usize },
    CartChanged { item_count: u32, total: Decimal },
    StockChanged { product_id: ProductId, stock: u32 },
    CheckoutCompleted { order_id: String, total: Decimal },
}

/// Receives change notifications from a session.
pub trait SessionObserver {
    fn on_event(&self, event: &SessionEvent);
}

/// Result of [`Session::add_to_cart`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartAddition {
    /// Line quantity after the add
    pub quantity: u32,
    pub outcome: RecordOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub completed_at: DateTime<Utc>,
}

pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    catalog: Catalog,
    profile: UserProfile,
    cart: Cart,
    similar_users: Vec<SimilarUser>,
    engine: RecommendationEngine,
    tracker: InteractionTracker,
    config: SessionConfig,
    pending: VecDeque<SessionTask>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl Session {
    pub fn new(
        catalog: Catalog,
        profile: UserProfile,
        similar_users: Vec<SimilarUser>,
        config: &AppConfig,
    ) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            catalog,
            profile,
            cart: Cart::default(),
            similar_users,
            engine: RecommendationEngine::from_config(&config.recommendations),
            tracker: InteractionTracker::new(),
            config: config.session.clone(),
            pending: VecDeque::new(),
            observers: Vec::new(),
        };

        info!(
            event_name = "session.started",
            session_id = %session.id,
            products = session.catalog.len(),
            recompute_mode = ?session.config.recompute,
            "storefront session started"
        );
        session
    }

    /// Demo catalog and returning-shopper profile, with the initial recommendation
    /// list already queued.
    pub fn demo(config: &AppConfig) -> Self {
        let mut session = Self::new(
            seed::demo_catalog(),
            seed::demo_profile(config.session.browsing_history_limit),
            seed::demo_similar_users(),
            config,
        );
        session.schedule_recompute();
        session
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    // -------------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------------

    pub fn view(&mut self, product_id: ProductId) -> RecordOutcome {
        self.interact(InteractionKind::View, product_id)
    }

    pub fn purchase(&mut self, product_id: ProductId) -> RecordOutcome {
        self.interact(InteractionKind::Purchase, product_id)
    }

    /// Forward a raw event name. Unknown actions and products are no-ops.
    pub fn track(&mut self, action: &str, product_id: ProductId) -> RecordOutcome {
        let outcome =
            self.tracker.apply_action(action, product_id, &mut self.profile, &self.catalog);
        self.after_interaction(&outcome);
        outcome
    }

    pub fn interact(&mut self, kind: InteractionKind, product_id: ProductId) -> RecordOutcome {
        let outcome = self.tracker.apply(kind, product_id, &mut self.profile, &self.catalog);
        self.after_interaction(&outcome);
        outcome
    }

    fn after_interaction(&mut self, outcome: &RecordOutcome) {
        if let RecordOutcome::Applied { kind, product_id, .. } = outcome {
            self.notify(&SessionEvent::ProfileUpdated { kind: *kind, product_id: *product_id });
            self.schedule_recompute();
        }
    }

    // -------------------------------------------------------------------------
    // Deferred recompute
    // -------------------------------------------------------------------------

    fn schedule_recompute(&mut self) {
        match self.config.recompute {
            RecomputeMode::Immediate => self.recompute_now(),
            RecomputeMode::Deferred => {
                if !self.pending.contains(&SessionTask::RecomputeRecommendations) {
                    self.pending.push_back(SessionTask::RecomputeRecommendations);
                    debug!(
                        event_name = "session.recompute_scheduled",
                        session_id = %self.id,
                        delay_ms = self.config.recompute_delay_ms,
                        "recommendation recompute queued"
                    );
                }
            }
        }
    }

    pub fn has_pending_recompute(&self) -> bool {
        self.pending.contains(&SessionTask::RecomputeRecommendations)
    }

    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }

    /// Run every queued task in FIFO order. Returns how many ran.
    pub fn flush(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pending.pop_front() {
            match task {
                SessionTask::RecomputeRecommendations => self.recompute_now(),
            }
            ran += 1;
        }
        ran
    }

    fn recompute_now(&mut self) {
        self.profile.recommendations =
            self.engine.recompute(&self.catalog, &self.profile, &self.similar_users);
        let count = self.profile.recommendations.len();
        info!(
            event_name = "session.recommendations_recomputed",
            session_id = %self.id,
            count,
            "recommendations refreshed"
        );
        self.notify(&SessionEvent::RecommendationsRecomputed { count });
    }

    /// Current recommendations, after draining any queued recompute.
    pub fn recommendations(&mut self) -> &[Recommendation] {
        self.flush();
        &self.profile.recommendations
    }

    /// The stored list as-is, without running queued work.
    pub fn stale_recommendations(&self) -> &[Recommendation] {
        &self.profile.recommendations
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Adds one unit and records a `cart_add` interaction.
    pub fn add_to_cart(&mut self, product_id: ProductId) -> Result<CartAddition, DomainError> {
        let product =
            self.catalog.find(product_id).ok_or(DomainError::UnknownProduct(product_id))?;
        if !product.in_stock() {
            return Err(DomainError::OutOfStock(product_id));
        }

        let quantity = self.cart.add(product);
        self.notify_cart();
        let outcome = self.interact(InteractionKind::CartAdd, product_id);
        Ok(CartAddition { quantity, outcome })
    }

    pub fn remove_from_cart(&mut self, product_id: ProductId) -> bool {
        let removed = self.cart.remove(product_id);
        if removed {
            self.notify_cart();
        }
        removed
    }

    /// Zero removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        let changed = self.cart.set_quantity(product_id, quantity);
        if changed {
            self.notify_cart();
        }
        changed
    }

    pub fn cart_total(&self) -> Decimal {
        self.cart.total()
    }

    /// Records a purchase for every cart line and empties the cart. Stock levels are
    /// left unchanged.
    pub fn checkout(&mut self) -> Result<CheckoutReceipt, DomainError> {
        if self.cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let total = self.cart.total();
        let lines = self.cart.take_lines();
        for line in &lines {
            self.interact(InteractionKind::Purchase, line.product_id);
        }

        let receipt = CheckoutReceipt {
            order_id: Uuid::new_v4().to_string(),
            lines,
            total,
            completed_at: Utc::now(),
        };
        info!(
            event_name = "session.checkout_completed",
            session_id = %self.id,
            order_id = %receipt.order_id,
            lines = receipt.lines.len(),
            total = %receipt.total,
            "checkout completed"
        );
        self.notify_cart();
        self.notify(&SessionEvent::CheckoutCompleted {
            order_id: receipt.order_id.clone(),
            total: receipt.total,
        });
        Ok(receipt)
    }

    // -------------------------------------------------------------------------
    // Inventory
    // -------------------------------------------------------------------------

    pub fn restock(&mut self, product_id: ProductId, amount: u32) -> Result<u32, DomainError> {
        let stock = self.catalog.restock(product_id, amount)?;
        info!(
            event_name = "session.restocked",
            session_id = %self.id,
            product_id = product_id.0,
            amount,
            stock,
            "product restocked"
        );
        self.notify(&SessionEvent::StockChanged { product_id, stock });
        Ok(stock)
    }

    /// Restock by the configured increment.
    pub fn restock_default(&mut self, product_id: ProductId) -> Result<u32, DomainError> {
        self.restock(product_id, self.config.restock_increment)
    }

    fn notify_cart(&self) {
        self.notify(&SessionEvent::CartChanged {
            item_count: self.cart.item_count(),
            total: self.cart.total(),
        });
    }

    fn notify(&self, event: &SessionEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
