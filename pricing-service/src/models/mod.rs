//! Domain models for pricing-service.

use serde::{Deserialize, Deserializer};

/// Deserializer for update fields that distinguish "leave unchanged"
/// (absent) from "clear" (explicit null): absent stays `None`, null
/// becomes `Some(None)`, a value becomes `Some(Some(v))`.
pub(crate) fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

mod geography;
mod temporal_rule;
mod tier;
mod validation;

pub use geography::{GeoScope, RegionMultiplier, ZoneMultiplier};
pub use temporal_rule::{
    CreateRule, DateRange, ListRulesFilter, RuleType, TemporalPricingRule, UpdateRule,
};
pub use tier::{
    AdjustableField, AdjustmentType, BulkAdjustRequest, BulkAdjustResult, CreateTier,
    ListTiersFilter, Tier, TierPricingConfig, UpdateTier,
};
pub use validation::{Competitiveness, TierComparison, ValidationReport};
