//! HTTP handlers exposing the engine operations 1:1.

mod pricing;
mod rules;
mod tiers;

use crate::startup::AppState;
use axum::routing::{get, post};
use axum::Router;

pub use pricing::EvaluateRequest;
pub use tiers::ValidateTierRequest;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/tiers", post(tiers::create_tier).get(tiers::list_tiers))
        .route("/tiers/validate", post(tiers::validate_tier))
        .route("/tiers/bulk-adjust", post(tiers::bulk_adjust))
        .route(
            "/tiers/:tier_id",
            get(tiers::get_tier)
                .put(tiers::update_tier)
                .delete(tiers::delete_tier),
        )
        .route("/rules", post(rules::create_rule).get(rules::list_rules))
        .route(
            "/rules/:rule_id",
            get(rules::get_rule)
                .put(rules::update_rule)
                .delete(rules::delete_rule),
        )
        .route("/pricing/calculate", post(pricing::calculate))
        .route("/pricing/evaluate", post(pricing::evaluate))
        .route("/pricing/simulate", post(pricing::simulate))
        .with_state(state)
}
