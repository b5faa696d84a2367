//! Validation report types for tier configuration checks.

use serde::{Deserialize, Serialize};
use service_core::error::FieldViolation;
use uuid::Uuid;

/// How a candidate configuration prices against a reference tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competitiveness {
    Similar,
    MoreExpensive,
    MoreCompetitive,
}

/// Per-field deltas between a candidate configuration and an existing
/// tier, in minor currency units (candidate minus reference).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierComparison {
    pub compared_with_tier_id: Uuid,
    pub compared_with_name: String,
    pub base_fare_delta: i64,
    pub minimum_fare_delta: i64,
    pub per_minute_rate_delta: i64,
    pub per_km_rate_delta: i64,
    /// Delta of the typical-ride reference totals.
    pub typical_ride_delta: i64,
    pub competitiveness: Competitiveness,
}

/// Outcome of `validate_pricing_configuration`: hard errors, soft
/// warnings and an optional comparison against a reference tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<TierComparison>,
}
