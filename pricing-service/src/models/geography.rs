//! Read-only geography views consumed by the pricing engine.
//!
//! Geography records are owned by an external catalog; the engine only
//! reads their multipliers. An absent record or an absent multiplier
//! field is multiplicatively neutral (1.0).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The geographic scope of a pricing request. All levels optional.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GeoScope {
    #[serde(default)]
    pub country_id: Option<Uuid>,
    #[serde(default)]
    pub state_id: Option<Uuid>,
    #[serde(default)]
    pub city_id: Option<Uuid>,
    #[serde(default)]
    pub zone_id: Option<Uuid>,
}

/// Pricing multiplier carried by a country, state or city record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RegionMultiplier {
    pub pricing_multiplier: Option<Decimal>,
}

/// Pricing and demand multipliers carried by a service zone record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ZoneMultiplier {
    pub pricing_multiplier: Option<Decimal>,
    pub demand_multiplier: Option<Decimal>,
}
