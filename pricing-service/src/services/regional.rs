//! Regional multiplier resolution.
//!
//! Country, state, city and zone multipliers compose strictly
//! multiplicatively; an absent level (or an absent multiplier on the
//! record) is neutral. No geographic hierarchy validation happens
//! here; a city that does not belong to the given state is not
//! rejected.

use crate::models::GeoScope;
use crate::services::store::GeographyStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Resolved per-level multipliers and their product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegionalMultipliers {
    pub country: Decimal,
    pub state: Decimal,
    pub city: Decimal,
    pub zone: Decimal,
    pub total: Decimal,
}

pub struct RegionalResolver {
    geo: Arc<dyn GeographyStore>,
}

impl RegionalResolver {
    pub fn new(geo: Arc<dyn GeographyStore>) -> Self {
        Self { geo }
    }

    pub async fn resolve(&self, scope: &GeoScope) -> Result<RegionalMultipliers, AppError> {
        let country = match scope.country_id {
            Some(id) => self
                .geo
                .country(id)
                .await?
                .and_then(|r| r.pricing_multiplier)
                .unwrap_or(Decimal::ONE),
            None => Decimal::ONE,
        };
        let state = match scope.state_id {
            Some(id) => self
                .geo
                .state(id)
                .await?
                .and_then(|r| r.pricing_multiplier)
                .unwrap_or(Decimal::ONE),
            None => Decimal::ONE,
        };
        let city = match scope.city_id {
            Some(id) => self
                .geo
                .city(id)
                .await?
                .and_then(|r| r.pricing_multiplier)
                .unwrap_or(Decimal::ONE),
            None => Decimal::ONE,
        };
        let zone = match scope.zone_id {
            Some(id) => self
                .geo
                .zone(id)
                .await?
                .and_then(|z| z.pricing_multiplier)
                .unwrap_or(Decimal::ONE),
            None => Decimal::ONE,
        };

        Ok(RegionalMultipliers {
            country,
            state,
            city,
            zone,
            total: country * state * city * zone,
        })
    }

    /// The zone's demand factor for dynamic pricing; neutral when no
    /// zone is given or the record carries none.
    pub async fn demand_multiplier(&self, zone_id: Option<Uuid>) -> Result<Decimal, AppError> {
        match zone_id {
            Some(id) => Ok(self
                .geo
                .zone(id)
                .await?
                .and_then(|z| z.demand_multiplier)
                .unwrap_or(Decimal::ONE)),
            None => Ok(Decimal::ONE),
        }
    }
}
