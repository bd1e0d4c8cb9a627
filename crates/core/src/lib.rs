pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommendations;
pub mod seed;
pub mod session;
pub mod tracker;

pub use catalog::Catalog;
pub use domain::cart::{Cart, CartLine};
pub use domain::product::{Product, ProductId};
pub use domain::profile::{BrowsingHistory, UserProfile};
pub use errors::{ApplicationError, DomainError};
pub use recommendations::{
    Recommendation, RecommendationEngine, RecommendationType, ScoringPass, ScoringWeights,
    SimilarUser,
};
pub use session::{CartAddition, CheckoutReceipt, Session, SessionEvent, SessionObserver};
pub use tracker::{InteractionKind, InteractionTracker, RecordOutcome};
