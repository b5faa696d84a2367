//! Tier catalog: validated create/update, configuration validation
//! with comparison heuristics, and batch rate adjustment.

use crate::models::{
    AdjustableField, AdjustmentType, BulkAdjustRequest, BulkAdjustResult, Competitiveness,
    CreateTier, ListTiersFilter, Tier, TierComparison, TierPricingConfig, UpdateTier,
    ValidationReport,
};
use crate::services::metrics::record_tier_operation;
use crate::services::store::TierStore;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::{AppError, FieldViolation};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

// Bound table for tier pricing fields, minor currency units.
const BASE_FARE_BOUNDS: (i64, i64) = (50, 5000);
const MINIMUM_FARE_BOUNDS: (i64, i64) = (0, 10000);
const PER_MINUTE_RATE_BOUNDS: (i64, i64) = (5, 200);
const PER_KM_RATE_BOUNDS: (i64, i64) = (20, 500);
const PASSENGER_BOUNDS: (i32, i32) = (1, 20);
const PRIORITY_BOUNDS: (i32, i32) = (1, 100);

// A typical-ride total below/above these totals triggers a warning.
const UNPROFITABLE_THRESHOLD: i64 = 500;
const DEMAND_REDUCING_THRESHOLD: i64 = 3000;

// Comparison totals within this distance count as "similar".
const SIMILAR_TOTAL_DELTA: i64 = 100;

fn dec(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

fn check_i64(errors: &mut Vec<FieldViolation>, field: &str, value: i64, bounds: (i64, i64)) {
    if value < bounds.0 || value > bounds.1 {
        errors.push(FieldViolation::new(
            field,
            "range",
            format!(
                "{} must be between {} and {} (got {})",
                field, bounds.0, bounds.1, value
            ),
        ));
    }
}

fn check_decimal(errors: &mut Vec<FieldViolation>, field: &str, value: Decimal, min: Decimal, max: Decimal) {
    if value < min || value > max {
        errors.push(FieldViolation::new(
            field,
            "range",
            format!("{} must be between {} and {} (got {})", field, min, max, value),
        ));
    }
}

/// Validate a tier pricing configuration against the bound table.
/// Pure; exposed for reuse by bulk adjustment.
pub fn validate_config(config: &TierPricingConfig) -> Vec<FieldViolation> {
    let mut errors = Vec::new();

    check_i64(&mut errors, "base_fare", config.base_fare, BASE_FARE_BOUNDS);
    check_i64(
        &mut errors,
        "minimum_fare",
        config.minimum_fare,
        MINIMUM_FARE_BOUNDS,
    );
    check_i64(
        &mut errors,
        "per_minute_rate",
        config.per_minute_rate,
        PER_MINUTE_RATE_BOUNDS,
    );
    check_i64(
        &mut errors,
        "per_km_rate",
        config.per_km_rate,
        PER_KM_RATE_BOUNDS,
    );

    check_decimal(
        &mut errors,
        "tier_multiplier",
        config.tier_multiplier,
        dec(5, 1),
        dec(50, 1),
    );
    check_decimal(
        &mut errors,
        "surge_multiplier",
        config.surge_multiplier,
        Decimal::ONE,
        dec(100, 1),
    );
    check_decimal(
        &mut errors,
        "demand_multiplier",
        config.demand_multiplier,
        Decimal::ONE,
        dec(50, 1),
    );
    check_decimal(
        &mut errors,
        "luxury_multiplier",
        config.luxury_multiplier,
        Decimal::ONE,
        dec(30, 1),
    );
    check_decimal(
        &mut errors,
        "comfort_multiplier",
        config.comfort_multiplier,
        Decimal::ONE,
        dec(20, 1),
    );

    let (min_pax, max_pax) = PASSENGER_BOUNDS;
    if config.min_passengers < min_pax || config.min_passengers > max_pax {
        errors.push(FieldViolation::new(
            "min_passengers",
            "range",
            format!(
                "min_passengers must be between {} and {} (got {})",
                min_pax, max_pax, config.min_passengers
            ),
        ));
    }
    if config.max_passengers < min_pax || config.max_passengers > max_pax {
        errors.push(FieldViolation::new(
            "max_passengers",
            "range",
            format!(
                "max_passengers must be between {} and {} (got {})",
                min_pax, max_pax, config.max_passengers
            ),
        ));
    }
    if config.min_passengers > config.max_passengers {
        errors.push(FieldViolation::new(
            "min_passengers",
            "ordering",
            "min_passengers must not exceed max_passengers",
        ));
    }

    check_i64(
        &mut errors,
        "priority",
        config.priority as i64,
        (PRIORITY_BOUNDS.0 as i64, PRIORITY_BOUNDS.1 as i64),
    );

    errors
}

fn config_warnings(config: &TierPricingConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let typical = config.typical_ride_total();
    if typical < UNPROFITABLE_THRESHOLD {
        warnings.push(format!(
            "Typical ride total {} is below {}; this configuration may be unprofitable",
            typical, UNPROFITABLE_THRESHOLD
        ));
    } else if typical > DEMAND_REDUCING_THRESHOLD {
        warnings.push(format!(
            "Typical ride total {} is above {}; this configuration may reduce demand",
            typical, DEMAND_REDUCING_THRESHOLD
        ));
    }
    warnings
}

fn compare_configs(config: &TierPricingConfig, reference: &Tier) -> TierComparison {
    let reference_config = TierPricingConfig::from(reference);
    let typical_ride_delta =
        config.typical_ride_total() - reference_config.typical_ride_total();

    let competitiveness = if typical_ride_delta.abs() < SIMILAR_TOTAL_DELTA {
        Competitiveness::Similar
    } else if typical_ride_delta > 0 {
        Competitiveness::MoreExpensive
    } else {
        Competitiveness::MoreCompetitive
    };

    TierComparison {
        compared_with_tier_id: reference.tier_id,
        compared_with_name: reference.name.clone(),
        base_fare_delta: config.base_fare - reference.base_fare,
        minimum_fare_delta: config.minimum_fare - reference.minimum_fare,
        per_minute_rate_delta: config.per_minute_rate - reference.per_minute_rate,
        per_km_rate_delta: config.per_km_rate - reference.per_km_rate,
        typical_ride_delta,
        competitiveness,
    }
}

/// Tier catalog service over an injected tier store.
pub struct TierCatalog {
    tiers: Arc<dyn TierStore>,
}

impl TierCatalog {
    pub fn new(tiers: Arc<dyn TierStore>) -> Self {
        Self { tiers }
    }

    /// Full validation report for a candidate configuration: hard
    /// errors from the bound table, heuristic warnings and an optional
    /// comparison against an existing tier.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn validate_pricing_configuration(
        &self,
        input: &CreateTier,
        compare_with_tier_id: Option<Uuid>,
    ) -> Result<ValidationReport, AppError> {
        let config = input.pricing_config();
        let errors = validate_config(&config);
        let warnings = config_warnings(&config);

        let comparison = match compare_with_tier_id {
            Some(tier_id) => self
                .tiers
                .get(tier_id)
                .await?
                .map(|reference| compare_configs(&config, &reference)),
            None => None,
        };

        Ok(ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            comparison,
        })
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_tier(&self, input: CreateTier) -> Result<Tier, AppError> {
        let errors = validate_config(&input.pricing_config());
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if self.tiers.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Tier name already exists: {}",
                input.name
            )));
        }

        let now = Utc::now();
        let tier = Tier {
            tier_id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            base_fare: input.base_fare,
            minimum_fare: input.minimum_fare,
            per_minute_rate: input.per_minute_rate,
            per_km_rate: input.per_km_rate,
            tier_multiplier: input.tier_multiplier,
            surge_multiplier: input.surge_multiplier,
            demand_multiplier: input.demand_multiplier,
            luxury_multiplier: input.luxury_multiplier,
            comfort_multiplier: input.comfort_multiplier,
            min_passengers: input.min_passengers,
            max_passengers: input.max_passengers,
            priority: input.priority,
            is_active: input.is_active,
            vehicle_types: input.vehicle_types,
            created_utc: now,
            updated_utc: now,
        };

        let tier = self.tiers.insert(tier).await?;
        record_tier_operation("created");
        tracing::info!(tier_id = %tier.tier_id, name = %tier.name, "Tier created");
        Ok(tier)
    }

    #[instrument(skip(self, input), fields(tier_id = %tier_id))]
    pub async fn update_tier(&self, tier_id: Uuid, input: UpdateTier) -> Result<Tier, AppError> {
        let mut tier = self
            .tiers
            .get(tier_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tier not found: {}", tier_id)))?;

        if let Some(name) = input.name {
            // Uniqueness check skipped when the name is unchanged.
            if name != tier.name {
                if let Some(existing) = self.tiers.find_by_name(&name).await? {
                    if existing.tier_id != tier_id {
                        return Err(AppError::Conflict(anyhow::anyhow!(
                            "Tier name already exists: {}",
                            name
                        )));
                    }
                }
                tier.name = name;
            }
        }
        if let Some(description) = input.description {
            tier.description = description;
        }
        if let Some(v) = input.base_fare {
            tier.base_fare = v;
        }
        if let Some(v) = input.minimum_fare {
            tier.minimum_fare = v;
        }
        if let Some(v) = input.per_minute_rate {
            tier.per_minute_rate = v;
        }
        if let Some(v) = input.per_km_rate {
            tier.per_km_rate = v;
        }
        if let Some(v) = input.tier_multiplier {
            tier.tier_multiplier = v;
        }
        if let Some(v) = input.surge_multiplier {
            tier.surge_multiplier = v;
        }
        if let Some(v) = input.demand_multiplier {
            tier.demand_multiplier = v;
        }
        if let Some(v) = input.luxury_multiplier {
            tier.luxury_multiplier = v;
        }
        if let Some(v) = input.comfort_multiplier {
            tier.comfort_multiplier = v;
        }
        if let Some(v) = input.min_passengers {
            tier.min_passengers = v;
        }
        if let Some(v) = input.max_passengers {
            tier.max_passengers = v;
        }
        if let Some(v) = input.priority {
            tier.priority = v;
        }
        if let Some(v) = input.is_active {
            tier.is_active = v;
        }
        if let Some(v) = input.vehicle_types {
            tier.vehicle_types = v;
        }

        let errors = validate_config(&TierPricingConfig::from(&tier));
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        tier.updated_utc = Utc::now();
        let tier = self.tiers.update(tier).await?;
        record_tier_operation("updated");
        tracing::info!(tier_id = %tier.tier_id, "Tier updated");
        Ok(tier)
    }

    pub async fn get_tier(&self, tier_id: Uuid) -> Result<Tier, AppError> {
        self.tiers
            .get(tier_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tier not found: {}", tier_id)))
    }

    pub async fn list_tiers(&self, filter: &ListTiersFilter) -> Result<Vec<Tier>, AppError> {
        self.tiers.list(filter).await
    }

    /// Delete a tier, refusing while historical rides still reference
    /// it. Referential integrity itself is owned by the external store.
    #[instrument(skip(self), fields(tier_id = %tier_id))]
    pub async fn delete_tier(&self, tier_id: Uuid) -> Result<(), AppError> {
        let references = self.tiers.ride_reference_count(tier_id).await?;
        if references > 0 {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Tier is referenced by {} historical rides and cannot be deleted",
                references
            )));
        }

        if !self.tiers.delete(tier_id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Tier not found: {}",
                tier_id
            )));
        }
        record_tier_operation("deleted");
        tracing::info!(tier_id = %tier_id, "Tier deleted");
        Ok(())
    }

    /// Apply a rate adjustment across several tiers. Each tier is
    /// processed independently; a failure is captured in that tier's
    /// result entry and never aborts the batch.
    #[instrument(skip(self, request), fields(count = request.tier_ids.len()))]
    pub async fn bulk_adjust(
        &self,
        request: &BulkAdjustRequest,
    ) -> Result<Vec<BulkAdjustResult>, AppError> {
        let mut results = Vec::with_capacity(request.tier_ids.len());

        for &tier_id in &request.tier_ids {
            let outcome = self.adjust_one(tier_id, request).await;
            results.push(match outcome {
                Ok(tier) => BulkAdjustResult {
                    tier_id,
                    success: true,
                    tier: Some(tier),
                    error: None,
                },
                Err(e) => BulkAdjustResult {
                    tier_id,
                    success: false,
                    tier: None,
                    error: Some(e.to_string()),
                },
            });
        }

        record_tier_operation("bulk_adjusted");
        Ok(results)
    }

    async fn adjust_one(&self, tier_id: Uuid, request: &BulkAdjustRequest) -> Result<Tier, AppError> {
        let mut tier = self
            .tiers
            .get(tier_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tier not found: {}", tier_id)))?;

        let current = match request.field {
            AdjustableField::BaseFare => tier.base_fare,
            AdjustableField::MinimumFare => tier.minimum_fare,
            AdjustableField::PerMinuteRate => tier.per_minute_rate,
            AdjustableField::PerKmRate => tier.per_km_rate,
        };

        let adjusted = match request.adjustment_type {
            AdjustmentType::Percentage => {
                Decimal::from(current) * (Decimal::ONE + request.adjustment_value / Decimal::ONE_HUNDRED)
            }
            AdjustmentType::Fixed => Decimal::from(current) + request.adjustment_value,
        };
        let adjusted = adjusted
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!(
                    "Adjusted {} overflows the representable range",
                    request.field.as_str()
                ))
            })?;

        match request.field {
            AdjustableField::BaseFare => tier.base_fare = adjusted,
            AdjustableField::MinimumFare => tier.minimum_fare = adjusted,
            AdjustableField::PerMinuteRate => tier.per_minute_rate = adjusted,
            AdjustableField::PerKmRate => tier.per_km_rate = adjusted,
        }

        let errors = validate_config(&TierPricingConfig::from(&tier));
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        tier.updated_utc = Utc::now();
        self.tiers.update(tier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::InMemoryStore;

    fn base_input(name: &str) -> CreateTier {
        CreateTier {
            name: name.to_string(),
            description: None,
            base_fare: 250,
            minimum_fare: 400,
            per_minute_rate: 15,
            per_km_rate: 120,
            tier_multiplier: Decimal::ONE,
            surge_multiplier: Decimal::ONE,
            demand_multiplier: Decimal::ONE,
            luxury_multiplier: Decimal::ONE,
            comfort_multiplier: Decimal::ONE,
            min_passengers: 1,
            max_passengers: 4,
            priority: 10,
            is_active: true,
            vehicle_types: vec!["sedan".to_string()],
        }
    }

    fn catalog() -> (TierCatalog, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (TierCatalog::new(store.clone()), store)
    }

    #[tokio::test]
    async fn valid_configuration_passes() {
        let (catalog, _) = catalog();
        let report = catalog
            .validate_pricing_configuration(&base_input("UberX"), None)
            .await
            .unwrap();
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn zero_base_fare_is_rejected() {
        let (catalog, _) = catalog();
        let mut input = base_input("Broken");
        input.base_fare = 0;
        let report = catalog
            .validate_pricing_configuration(&input, None)
            .await
            .unwrap();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.field == "base_fare"));
    }

    #[tokio::test]
    async fn cheap_configuration_warns_unprofitable() {
        let (catalog, _) = catalog();
        let mut input = base_input("Cheap");
        input.base_fare = 50;
        input.per_minute_rate = 5;
        input.per_km_rate = 20;
        // typical = 50 + 75 + 100 = 225 < 500
        let report = catalog
            .validate_pricing_configuration(&input, None)
            .await
            .unwrap();
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unprofitable"));
    }

    #[tokio::test]
    async fn comparison_classifies_competitiveness() {
        let (catalog, _) = catalog();
        let reference = catalog.create_tier(base_input("Reference")).await.unwrap();

        // typical(reference) = 250 + 225 + 600 = 1075
        let mut pricier = base_input("Pricier");
        pricier.base_fare = 1000;
        let report = catalog
            .validate_pricing_configuration(&pricier, Some(reference.tier_id))
            .await
            .unwrap();
        let comparison = report.comparison.unwrap();
        assert_eq!(comparison.base_fare_delta, 750);
        assert_eq!(comparison.typical_ride_delta, 750);
        assert_eq!(comparison.competitiveness, Competitiveness::MoreExpensive);

        let mut close = base_input("Close");
        close.base_fare = 300;
        let report = catalog
            .validate_pricing_configuration(&close, Some(reference.tier_id))
            .await
            .unwrap();
        assert_eq!(
            report.comparison.unwrap().competitiveness,
            Competitiveness::Similar
        );
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let (catalog, _) = catalog();
        catalog.create_tier(base_input("UberX")).await.unwrap();
        let err = catalog.create_tier(base_input("UberX")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_keeps_name_without_conflict() {
        let (catalog, _) = catalog();
        let tier = catalog.create_tier(base_input("UberX")).await.unwrap();
        let updated = catalog
            .update_tier(
                tier.tier_id,
                UpdateTier {
                    name: Some("UberX".to_string()),
                    base_fare: Some(300),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.base_fare, 300);
    }

    #[tokio::test]
    async fn delete_blocked_while_rides_reference_tier() {
        let (catalog, store) = catalog();
        let tier = catalog.create_tier(base_input("UberX")).await.unwrap();
        store.seed_ride_references(tier.tier_id, 3).await;

        let err = catalog.delete_tier(tier.tier_id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        store.seed_ride_references(tier.tier_id, 0).await;
        catalog.delete_tier(tier.tier_id).await.unwrap();
    }

    #[tokio::test]
    async fn bulk_percentage_adjustment_rounds_to_nearest() {
        let (catalog, _) = catalog();
        let tier = catalog.create_tier(base_input("UberX")).await.unwrap();

        let results = catalog
            .bulk_adjust(&BulkAdjustRequest {
                tier_ids: vec![tier.tier_id],
                field: AdjustableField::BaseFare,
                adjustment_type: AdjustmentType::Percentage,
                adjustment_value: Decimal::from(10),
            })
            .await
            .unwrap();

        assert!(results[0].success);
        assert_eq!(results[0].tier.as_ref().unwrap().base_fare, 275);
    }

    #[tokio::test]
    async fn bulk_adjustment_isolates_failures() {
        let (catalog, _) = catalog();
        let tier = catalog.create_tier(base_input("UberX")).await.unwrap();
        let missing = Uuid::new_v4();

        let results = catalog
            .bulk_adjust(&BulkAdjustRequest {
                tier_ids: vec![missing, tier.tier_id],
                field: AdjustableField::PerKmRate,
                adjustment_type: AdjustmentType::Fixed,
                adjustment_value: Decimal::from(10),
            })
            .await
            .unwrap();

        assert!(!results[0].success);
        assert!(results[0].error.as_ref().unwrap().contains("Not found"));
        assert!(results[1].success);
        assert_eq!(results[1].tier.as_ref().unwrap().per_km_rate, 130);
    }

    #[tokio::test]
    async fn bulk_adjustment_rejects_out_of_bound_result() {
        let (catalog, _) = catalog();
        let tier = catalog.create_tier(base_input("UberX")).await.unwrap();

        // 250 + 5000 blows past the base fare ceiling.
        let results = catalog
            .bulk_adjust(&BulkAdjustRequest {
                tier_ids: vec![tier.tier_id],
                field: AdjustableField::BaseFare,
                adjustment_type: AdjustmentType::Fixed,
                adjustment_value: Decimal::from(5000),
            })
            .await
            .unwrap();

        assert!(!results[0].success);
        // The stored tier is untouched.
        let stored = catalog.get_tier(tier.tier_id).await.unwrap();
        assert_eq!(stored.base_fare, 250);
    }
}
