//! Temporal pricing rule endpoints.

use crate::models::{CreateRule, ListRulesFilter, TemporalPricingRule, UpdateRule};
use crate::startup::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use service_core::error::AppError;
use uuid::Uuid;

pub async fn create_rule(
    State(state): State<AppState>,
    Json(input): Json<CreateRule>,
) -> Result<(StatusCode, Json<TemporalPricingRule>), AppError> {
    let rule = state.rules.create_rule(input).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn list_rules(
    State(state): State<AppState>,
    Query(filter): Query<ListRulesFilter>,
) -> Result<Json<Vec<TemporalPricingRule>>, AppError> {
    Ok(Json(state.rules.list_rules(&filter).await?))
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<Json<TemporalPricingRule>, AppError> {
    Ok(Json(state.rules.get_rule(rule_id).await?))
}

pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
    Json(input): Json<UpdateRule>,
) -> Result<Json<TemporalPricingRule>, AppError> {
    Ok(Json(state.rules.update_rule(rule_id, input).await?))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.rules.delete_rule(rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
