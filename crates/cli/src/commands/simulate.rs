use std::collections::BTreeMap;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::config::AppConfig;
use storefront_core::errors::ApplicationError;
use storefront_core::{CheckoutReceipt, InteractionKind, ProductId, RecordOutcome, Session};

use crate::commands::recommend::RecommendationRow;
use crate::commands::CommandResult;

/// One `<action>:<product id>` event from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedEvent {
    pub kind: InteractionKind,
    pub product_id: ProductId,
}

pub fn parse_event(raw: &str) -> anyhow::Result<SimulatedEvent> {
    let Some((action, id)) = raw.split_once(':') else {
        bail!("event `{raw}` must look like <action>:<product id>");
    };

    let kind = action.parse::<InteractionKind>()?;
    let id = id
        .trim()
        .parse::<u32>()
        .with_context(|| format!("event `{raw}` has a non-numeric product id"))?;

    Ok(SimulatedEvent { kind, product_id: ProductId(id) })
}

#[derive(Debug, Serialize)]
struct ProfileSummary {
    preferences: BTreeMap<String, f64>,
    purchase_history: Vec<ProductId>,
    browsing_history: Vec<ProductId>,
}

#[derive(Debug, Serialize)]
struct CartSummary {
    item_count: u32,
    total: Decimal,
}

#[derive(Debug, Serialize)]
struct SimulateOutput {
    session_id: String,
    started_at: DateTime<Utc>,
    outcomes: Vec<RecordOutcome>,
    checkout: Option<CheckoutReceipt>,
    profile: ProfileSummary,
    cart: CartSummary,
    recommendations: Vec<RecommendationRow>,
}

pub fn run(config: &AppConfig, raw_events: &[String], checkout: bool) -> CommandResult {
    let mut events = Vec::with_capacity(raw_events.len());
    for raw in raw_events {
        match parse_event(raw) {
            Ok(event) => events.push(event),
            Err(error) => {
                return CommandResult::failure("simulate", "invalid_event", format!("{error:#}"), 1)
            }
        }
    }

    let mut session = Session::demo(config);
    let mut outcomes = Vec::with_capacity(events.len());
    for event in events {
        let outcome = match event.kind {
            InteractionKind::CartAdd => match session.add_to_cart(event.product_id) {
                Ok(added) => added.outcome,
                Err(error) => {
                    return CommandResult::from_application_error(
                        "simulate",
                        &ApplicationError::from(error),
                    )
                }
            },
            kind => session.interact(kind, event.product_id),
        };
        outcomes.push(outcome);
    }

    let receipt = if checkout {
        match session.checkout() {
            Ok(receipt) => Some(receipt),
            Err(error) => {
                return CommandResult::from_application_error(
                    "simulate",
                    &ApplicationError::from(error),
                )
            }
        }
    } else {
        None
    };

    let recommendations: Vec<RecommendationRow> =
        session.recommendations().iter().map(RecommendationRow::from).collect();
    let profile = session.profile();
    let output = SimulateOutput {
        session_id: session.id().to_string(),
        started_at: session.started_at(),
        outcomes,
        checkout: receipt,
        profile: ProfileSummary {
            preferences: profile.preferences.clone(),
            purchase_history: profile.purchase_history().to_vec(),
            browsing_history: profile.browsing_history.iter().collect(),
        },
        cart: CartSummary { item_count: session.cart().item_count(), total: session.cart_total() },
        recommendations,
    };

    let message = format!(
        "applied {} events, {} recommendations",
        output.outcomes.iter().filter(|outcome| outcome.is_applied()).count(),
        output.recommendations.len()
    );
    CommandResult::success_with("simulate", message, &output)
}
