//! End-to-end quote simulation: temporal rule evaluation layered on
//! top of the base fare calculation.

use crate::models::GeoScope;
use crate::services::calculator::{CalculateRequest, PricingBreakdown, PricingCalculator};
use crate::services::metrics::record_simulation;
use crate::services::temporal::{RuleEvaluation, TemporalRuleService};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Simulation request. A non-empty `rule_ids` selects manual mode and
/// bypasses automatic rule matching entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub tier_id: Uuid,
    pub distance_km: Decimal,
    pub duration_minutes: Decimal,
    pub date_time: NaiveDateTime,
    #[serde(flatten)]
    pub scope: GeoScope,
    #[serde(default)]
    pub rule_ids: Vec<Uuid>,
}

/// How the temporal layer of a simulation was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    Automatic,
    Manual,
}

/// A complete quote: base breakdown, temporal evaluation and the
/// blended total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationQuote {
    pub mode: SimulationMode,
    pub base_pricing: PricingBreakdown,
    pub temporal_evaluation: RuleEvaluation,
    pub temporal_adjusted_total: Decimal,
    /// Signed difference the temporal layer added to the base amount.
    pub temporal_adjustments: Decimal,
    pub total_amount: Decimal,
    pub applied_rules: Vec<String>,
}

pub struct SimulationComposer {
    calculator: Arc<PricingCalculator>,
    temporal: Arc<TemporalRuleService>,
}

impl SimulationComposer {
    pub fn new(calculator: Arc<PricingCalculator>, temporal: Arc<TemporalRuleService>) -> Self {
        Self {
            calculator,
            temporal,
        }
    }

    #[instrument(skip(self, request), fields(tier_id = %request.tier_id))]
    pub async fn simulate(&self, request: &SimulateRequest) -> Result<SimulationQuote, AppError> {
        // Temporal layer first: manual override or automatic matching.
        let (mode, evaluation) = if request.rule_ids.is_empty() {
            (
                SimulationMode::Automatic,
                self.temporal
                    .evaluate(request.date_time, &request.scope)
                    .await?,
            )
        } else {
            (
                SimulationMode::Manual,
                self.temporal
                    .evaluate_specific(&request.rule_ids, request.date_time)
                    .await?,
            )
        };

        // Base pricing with surge pinned to 1.0; surge and temporal
        // pricing are separate layers and never fuse.
        let base_pricing = self
            .calculator
            .calculate(&CalculateRequest {
                tier_id: request.tier_id,
                distance_km: request.distance_km,
                duration_minutes: request.duration_minutes,
                scope: request.scope,
                surge_multiplier: Some(Decimal::ONE),
            })
            .await?;

        let base_amount = base_pricing.final_pricing.base_amount;
        let temporal_adjusted_total = base_amount * evaluation.combined_multiplier;
        let temporal_adjustments = temporal_adjusted_total - base_amount;

        // Fees and taxes stay as computed against the pre-temporal
        // base; they are not recomputed on the adjusted amount.
        let total_amount = temporal_adjusted_total
            + base_pricing.final_pricing.service_fees
            + base_pricing.final_pricing.taxes;

        let mut applied_rules = base_pricing.applied_rules.clone();
        if evaluation.combined_multiplier != Decimal::ONE {
            applied_rules.push("temporal_pricing".to_string());
        }

        record_simulation();
        tracing::debug!(
            combined_multiplier = %evaluation.combined_multiplier,
            total = %total_amount,
            "Simulation composed"
        );

        Ok(SimulationQuote {
            mode,
            base_pricing,
            temporal_evaluation: evaluation,
            temporal_adjusted_total,
            temporal_adjustments,
            total_amount,
            applied_rules,
        })
    }
}
