//! Tier catalog endpoints.

use crate::models::{
    BulkAdjustRequest, BulkAdjustResult, CreateTier, ListTiersFilter, Tier, UpdateTier,
    ValidationReport,
};
use crate::startup::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

pub async fn create_tier(
    State(state): State<AppState>,
    Json(input): Json<CreateTier>,
) -> Result<(StatusCode, Json<Tier>), AppError> {
    let tier = state.catalog.create_tier(input).await?;
    Ok((StatusCode::CREATED, Json(tier)))
}

pub async fn list_tiers(
    State(state): State<AppState>,
    Query(filter): Query<ListTiersFilter>,
) -> Result<Json<Vec<Tier>>, AppError> {
    Ok(Json(state.catalog.list_tiers(&filter).await?))
}

pub async fn get_tier(
    State(state): State<AppState>,
    Path(tier_id): Path<Uuid>,
) -> Result<Json<Tier>, AppError> {
    Ok(Json(state.catalog.get_tier(tier_id).await?))
}

pub async fn update_tier(
    State(state): State<AppState>,
    Path(tier_id): Path<Uuid>,
    Json(input): Json<UpdateTier>,
) -> Result<Json<Tier>, AppError> {
    Ok(Json(state.catalog.update_tier(tier_id, input).await?))
}

pub async fn delete_tier(
    State(state): State<AppState>,
    Path(tier_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_tier(tier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Validation request: a candidate configuration plus an optional
/// reference tier to compare against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateTierRequest {
    #[serde(flatten)]
    pub input: CreateTier,
    #[serde(default)]
    pub compare_with_tier_id: Option<Uuid>,
}

pub async fn validate_tier(
    State(state): State<AppState>,
    Json(request): Json<ValidateTierRequest>,
) -> Result<Json<ValidationReport>, AppError> {
    let report = state
        .catalog
        .validate_pricing_configuration(&request.input, request.compare_with_tier_id)
        .await?;
    Ok(Json(report))
}

pub async fn bulk_adjust(
    State(state): State<AppState>,
    Json(request): Json<BulkAdjustRequest>,
) -> Result<Json<Vec<BulkAdjustResult>>, AppError> {
    Ok(Json(state.catalog.bulk_adjust(&request).await?))
}
