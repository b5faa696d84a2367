//! Fare calculation pipeline.
//!
//! base tariff -> tier multiplier -> regional cascade -> dynamic
//! (surge x demand) -> fees and taxes. Intermediates keep full
//! decimal precision; rounding to integer minor units happens only at
//! the fee/tax step.

use crate::models::GeoScope;
use crate::services::metrics::record_pricing_calculation;
use crate::services::regional::{RegionalMultipliers, RegionalResolver};
use crate::services::store::TierStore;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Policy constants: 10% service fee, 8% tax on the dynamic total.
const SERVICE_FEE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Calculation request. All monetary math uses the tier fetched fresh
/// from the store at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub tier_id: Uuid,
    pub distance_km: Decimal,
    pub duration_minutes: Decimal,
    #[serde(flatten)]
    pub scope: GeoScope,
    #[serde(default)]
    pub surge_multiplier: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasePricing {
    pub base_fare: Decimal,
    pub distance_cost: Decimal,
    pub time_cost: Decimal,
    pub subtotal: Decimal,
    pub tier_multiplier: Decimal,
    pub tier_adjusted_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalPricing {
    #[serde(flatten)]
    pub multipliers: RegionalMultipliers,
    pub regional_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicPricing {
    pub surge_multiplier: Decimal,
    pub demand_multiplier: Decimal,
    pub dynamic_multiplier: Decimal,
    pub dynamic_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalPricing {
    /// The dynamic total before fees and taxes.
    pub base_amount: Decimal,
    pub service_fees: Decimal,
    pub taxes: Decimal,
    pub total_amount: Decimal,
}

/// Full fare breakdown with every intermediate exposed for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub tier_id: Uuid,
    pub tier_name: String,
    pub base_pricing: BasePricing,
    pub regional_pricing: RegionalPricing,
    pub dynamic_pricing: DynamicPricing,
    pub final_pricing: FinalPricing,
    /// Multiplier categories that were non-identity for this fare.
    pub applied_rules: Vec<String>,
}

fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

pub struct PricingCalculator {
    tiers: Arc<dyn TierStore>,
    regional: Arc<RegionalResolver>,
}

impl PricingCalculator {
    pub fn new(tiers: Arc<dyn TierStore>, regional: Arc<RegionalResolver>) -> Self {
        Self { tiers, regional }
    }

    #[instrument(skip(self, request), fields(tier_id = %request.tier_id))]
    pub async fn calculate(&self, request: &CalculateRequest) -> Result<PricingBreakdown, AppError> {
        let tier = self
            .tiers
            .get(request.tier_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Tier not found: {}", request.tier_id))
            })?;

        // Step 2: base tariff.
        let base_fare = Decimal::from(tier.base_fare);
        let distance_cost = request.distance_km * Decimal::from(tier.per_km_rate);
        let time_cost = request.duration_minutes * Decimal::from(tier.per_minute_rate);
        let subtotal = base_fare + distance_cost + time_cost;

        // Step 3: tier multiplier.
        let tier_adjusted_total = subtotal * tier.tier_multiplier;

        // Step 4: regional cascade.
        let multipliers = self.regional.resolve(&request.scope).await?;
        let regional_total = tier_adjusted_total * multipliers.total;

        // Step 5: dynamic pricing.
        let surge_multiplier = request.surge_multiplier.unwrap_or(Decimal::ONE);
        let demand_multiplier = self.regional.demand_multiplier(request.scope.zone_id).await?;
        let dynamic_multiplier = surge_multiplier * demand_multiplier;
        let dynamic_total = regional_total * dynamic_multiplier;

        // Steps 6-7: fees, taxes, total.
        let service_fees = round_minor(dynamic_total * SERVICE_FEE_RATE);
        let taxes = round_minor(dynamic_total * TAX_RATE);
        let total_amount = dynamic_total + service_fees + taxes;

        let mut applied_rules = Vec::new();
        if multipliers.country != Decimal::ONE {
            applied_rules.push("country_pricing".to_string());
        }
        if multipliers.state != Decimal::ONE {
            applied_rules.push("state_pricing".to_string());
        }
        if multipliers.city != Decimal::ONE {
            applied_rules.push("city_pricing".to_string());
        }
        if multipliers.zone != Decimal::ONE {
            applied_rules.push("zone_pricing".to_string());
        }
        if surge_multiplier != Decimal::ONE {
            applied_rules.push("surge_pricing".to_string());
        }
        if demand_multiplier != Decimal::ONE {
            applied_rules.push("demand_pricing".to_string());
        }

        record_pricing_calculation();
        tracing::debug!(
            tier = %tier.name,
            subtotal = %subtotal,
            total = %total_amount,
            "Fare calculated"
        );

        Ok(PricingBreakdown {
            tier_id: tier.tier_id,
            tier_name: tier.name,
            base_pricing: BasePricing {
                base_fare,
                distance_cost,
                time_cost,
                subtotal,
                tier_multiplier: tier.tier_multiplier,
                tier_adjusted_total,
            },
            regional_pricing: RegionalPricing {
                multipliers,
                regional_total,
            },
            dynamic_pricing: DynamicPricing {
                surge_multiplier,
                demand_multiplier,
                dynamic_multiplier,
                dynamic_total,
            },
            final_pricing: FinalPricing {
                base_amount: dynamic_total,
                service_fees,
                taxes,
                total_amount,
            },
            applied_rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateTier;
    use crate::services::catalog::TierCatalog;
    use crate::services::store::InMemoryStore;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn setup() -> (PricingCalculator, Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let catalog = TierCatalog::new(store.clone());
        let tier = catalog
            .create_tier(CreateTier {
                name: "UberX".to_string(),
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
                vehicle_types: vec![],
            })
            .await
            .unwrap();
        let regional = Arc::new(RegionalResolver::new(store.clone()));
        (
            PricingCalculator::new(store.clone(), regional),
            store,
            tier.tier_id,
        )
    }

    fn request(tier_id: Uuid) -> CalculateRequest {
        CalculateRequest {
            tier_id,
            distance_km: Decimal::from(10),
            duration_minutes: Decimal::from(20),
            scope: GeoScope::default(),
            surge_multiplier: None,
        }
    }

    #[tokio::test]
    async fn subtotal_composes_base_distance_and_time() {
        let (calculator, _, tier_id) = setup().await;
        let breakdown = calculator.calculate(&request(tier_id)).await.unwrap();

        // 250 + 10*120 + 20*15
        assert_eq!(breakdown.base_pricing.subtotal, d("1750"));
        assert_eq!(breakdown.base_pricing.tier_adjusted_total, d("1750"));
        assert_eq!(breakdown.dynamic_pricing.dynamic_total, d("1750"));
        assert_eq!(breakdown.final_pricing.service_fees, d("175"));
        assert_eq!(breakdown.final_pricing.taxes, d("140"));
        assert_eq!(breakdown.final_pricing.total_amount, d("2065"));
        assert!(breakdown.applied_rules.is_empty());
    }

    #[tokio::test]
    async fn unknown_tier_is_not_found() {
        let (calculator, _, _) = setup().await;
        let err = calculator.calculate(&request(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn surge_and_zone_demand_compose() {
        let (calculator, store, tier_id) = setup().await;
        let zone = Uuid::new_v4();
        store.seed_zone(zone, Some(d("1.1")), Some(d("1.5"))).await;

        let mut req = request(tier_id);
        req.scope.zone_id = Some(zone);
        req.surge_multiplier = Some(d("2.0"));
        let breakdown = calculator.calculate(&req).await.unwrap();

        // 1750 * 1.1 (zone pricing) = 1925; * 2.0 * 1.5 = 5775
        assert_eq!(breakdown.regional_pricing.regional_total, d("1925.0"));
        assert_eq!(breakdown.dynamic_pricing.dynamic_multiplier, d("3.00"));
        assert_eq!(breakdown.dynamic_pricing.dynamic_total, d("5775.000"));
        assert_eq!(
            breakdown.applied_rules,
            vec!["zone_pricing", "surge_pricing", "demand_pricing"]
        );
    }

    #[tokio::test]
    async fn fees_round_to_integer_minor_units() {
        let (calculator, _, tier_id) = setup().await;
        let mut req = request(tier_id);
        // subtotal = 250 + 0.5*120 + 0*15 = 310; fee 31, tax 24.8 -> 25
        req.distance_km = d("0.5");
        req.duration_minutes = Decimal::ZERO;
        let breakdown = calculator.calculate(&req).await.unwrap();

        assert_eq!(breakdown.base_pricing.subtotal, d("310.0"));
        assert_eq!(breakdown.final_pricing.service_fees, d("31"));
        assert_eq!(breakdown.final_pricing.taxes, d("25"));
    }
}
