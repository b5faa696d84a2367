//! Service tier model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named service tier with its base rate table and multiplier bounds.
///
/// Monetary fields are integer minor-currency units; multipliers are
/// decimals applied on top of the computed subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    pub tier_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_fare: i64,
    pub minimum_fare: i64,
    pub per_minute_rate: i64,
    pub per_km_rate: i64,
    pub tier_multiplier: Decimal,
    pub surge_multiplier: Decimal,
    pub demand_multiplier: Decimal,
    pub luxury_multiplier: Decimal,
    pub comfort_multiplier: Decimal,
    pub min_passengers: i32,
    pub max_passengers: i32,
    pub priority: i32,
    pub is_active: bool,
    /// Informational vehicle-type tags; not used in pricing math.
    pub vehicle_types: Vec<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// The bounded pricing fields of a tier, detached from identity so the
/// same validator runs against create inputs, merged updates and
/// bulk-adjusted configurations.
#[derive(Debug, Clone)]
pub struct TierPricingConfig {
    pub base_fare: i64,
    pub minimum_fare: i64,
    pub per_minute_rate: i64,
    pub per_km_rate: i64,
    pub tier_multiplier: Decimal,
    pub surge_multiplier: Decimal,
    pub demand_multiplier: Decimal,
    pub luxury_multiplier: Decimal,
    pub comfort_multiplier: Decimal,
    pub min_passengers: i32,
    pub max_passengers: i32,
    pub priority: i32,
}

impl TierPricingConfig {
    /// Reference total for a "typical ride": 15 minutes, 5 km.
    pub fn typical_ride_total(&self) -> i64 {
        self.base_fare + 15 * self.per_minute_rate + 5 * self.per_km_rate
    }
}

impl From<&Tier> for TierPricingConfig {
    fn from(tier: &Tier) -> Self {
        Self {
            base_fare: tier.base_fare,
            minimum_fare: tier.minimum_fare,
            per_minute_rate: tier.per_minute_rate,
            per_km_rate: tier.per_km_rate,
            tier_multiplier: tier.tier_multiplier,
            surge_multiplier: tier.surge_multiplier,
            demand_multiplier: tier.demand_multiplier,
            luxury_multiplier: tier.luxury_multiplier,
            comfort_multiplier: tier.comfort_multiplier,
            min_passengers: tier.min_passengers,
            max_passengers: tier.max_passengers,
            priority: tier.priority,
        }
    }
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

fn default_priority() -> i32 {
    1
}

fn default_min_passengers() -> i32 {
    1
}

fn default_max_passengers() -> i32 {
    4
}

fn default_true() -> bool {
    true
}

/// Input for creating a tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTier {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub base_fare: i64,
    pub minimum_fare: i64,
    pub per_minute_rate: i64,
    pub per_km_rate: i64,
    #[serde(default = "default_multiplier")]
    pub tier_multiplier: Decimal,
    #[serde(default = "default_multiplier")]
    pub surge_multiplier: Decimal,
    #[serde(default = "default_multiplier")]
    pub demand_multiplier: Decimal,
    #[serde(default = "default_multiplier")]
    pub luxury_multiplier: Decimal,
    #[serde(default = "default_multiplier")]
    pub comfort_multiplier: Decimal,
    #[serde(default = "default_min_passengers")]
    pub min_passengers: i32,
    #[serde(default = "default_max_passengers")]
    pub max_passengers: i32,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub vehicle_types: Vec<String>,
}

impl CreateTier {
    pub fn pricing_config(&self) -> TierPricingConfig {
        TierPricingConfig {
            base_fare: self.base_fare,
            minimum_fare: self.minimum_fare,
            per_minute_rate: self.per_minute_rate,
            per_km_rate: self.per_km_rate,
            tier_multiplier: self.tier_multiplier,
            surge_multiplier: self.surge_multiplier,
            demand_multiplier: self.demand_multiplier,
            luxury_multiplier: self.luxury_multiplier,
            comfort_multiplier: self.comfort_multiplier,
            min_passengers: self.min_passengers,
            max_passengers: self.max_passengers,
            priority: self.priority,
        }
    }
}

/// Input for a partial tier update. Absent fields keep their value;
/// an explicit null clears the description; the merged configuration
/// is re-validated in full.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTier {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::clearable")]
    pub description: Option<Option<String>>,
    pub base_fare: Option<i64>,
    pub minimum_fare: Option<i64>,
    pub per_minute_rate: Option<i64>,
    pub per_km_rate: Option<i64>,
    pub tier_multiplier: Option<Decimal>,
    pub surge_multiplier: Option<Decimal>,
    pub demand_multiplier: Option<Decimal>,
    pub luxury_multiplier: Option<Decimal>,
    pub comfort_multiplier: Option<Decimal>,
    pub min_passengers: Option<i32>,
    pub max_passengers: Option<i32>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
    pub vehicle_types: Option<Vec<String>>,
}

/// Filter parameters for listing tiers.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTiersFilter {
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    #[serde(default)]
    pub page_token: Option<Uuid>,
}

fn default_page_size() -> i32 {
    50
}

impl Default for ListTiersFilter {
    fn default() -> Self {
        Self {
            include_inactive: false,
            page_size: default_page_size(),
            page_token: None,
        }
    }
}

/// A tier field that bulk adjustment may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustableField {
    BaseFare,
    MinimumFare,
    PerMinuteRate,
    PerKmRate,
}

impl AdjustableField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustableField::BaseFare => "base_fare",
            AdjustableField::MinimumFare => "minimum_fare",
            AdjustableField::PerMinuteRate => "per_minute_rate",
            AdjustableField::PerKmRate => "per_km_rate",
        }
    }
}

/// How the adjustment value is applied to the targeted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// `value *= 1 + adjustment_value / 100`
    Percentage,
    /// `value += adjustment_value`
    Fixed,
}

/// Batch rate adjustment across several tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAdjustRequest {
    pub tier_ids: Vec<Uuid>,
    pub field: AdjustableField,
    pub adjustment_type: AdjustmentType,
    pub adjustment_value: Decimal,
}

/// Per-tier outcome of a bulk adjustment. One failed tier never aborts
/// its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAdjustResult {
    pub tier_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
