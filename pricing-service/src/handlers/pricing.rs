//! Fare calculation, rule evaluation and simulation endpoints.

use crate::models::GeoScope;
use crate::services::metrics::{record_error, REQUEST_DURATION};
use crate::services::{CalculateRequest, PricingBreakdown, SimulateRequest, SimulationQuote};
use crate::services::RuleEvaluation;
use crate::startup::AppState;
use axum::extract::State;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

pub async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<PricingBreakdown>, AppError> {
    let timer = REQUEST_DURATION
        .with_label_values(&["calculate_pricing"])
        .start_timer();

    let breakdown = state.calculator.calculate(&request).await.map_err(|e| {
        record_error("calculator", "calculate_pricing");
        e
    })?;

    timer.observe_duration();
    Ok(Json(breakdown))
}

/// Evaluation request: an instant, a scope and, for manual mode, an
/// explicit rule id list that bypasses automatic matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub date_time: NaiveDateTime,
    #[serde(flatten)]
    pub scope: GeoScope,
    #[serde(default)]
    pub rule_ids: Vec<Uuid>,
}

pub async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<RuleEvaluation>, AppError> {
    let timer = REQUEST_DURATION
        .with_label_values(&["evaluate_rules"])
        .start_timer();

    let evaluation = if request.rule_ids.is_empty() {
        state.rules.evaluate(request.date_time, &request.scope).await
    } else {
        state
            .rules
            .evaluate_specific(&request.rule_ids, request.date_time)
            .await
    }
    .map_err(|e| {
        record_error("temporal", "evaluate_rules");
        e
    })?;

    timer.observe_duration();
    Ok(Json(evaluation))
}

pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulationQuote>, AppError> {
    let timer = REQUEST_DURATION
        .with_label_values(&["simulate_pricing"])
        .start_timer();

    let quote = state.simulator.simulate(&request).await.map_err(|e| {
        record_error("simulation", "simulate_pricing");
        e
    })?;

    timer.observe_duration();
    Ok(Json(quote))
}
