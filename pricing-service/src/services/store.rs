//! Repository boundary for the pricing engine.
//!
//! Persistence is owned by an external store; the engine is handed
//! these traits and never assumes more than per-record atomicity.
//! `InMemoryStore` implements all three for the bundled binary and
//! for tests.

use crate::models::{
    ListRulesFilter, ListTiersFilter, RegionMultiplier, TemporalPricingRule, Tier, ZoneMultiplier,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage contract for service tiers.
#[async_trait]
pub trait TierStore: Send + Sync {
    async fn get(&self, tier_id: Uuid) -> Result<Option<Tier>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Tier>, AppError>;
    async fn insert(&self, tier: Tier) -> Result<Tier, AppError>;
    async fn update(&self, tier: Tier) -> Result<Tier, AppError>;
    async fn list(&self, filter: &ListTiersFilter) -> Result<Vec<Tier>, AppError>;
    async fn delete(&self, tier_id: Uuid) -> Result<bool, AppError>;
    /// Number of historical rides referencing the tier, used for
    /// delete protection. The ride ledger is owned externally.
    async fn ride_reference_count(&self, tier_id: Uuid) -> Result<u64, AppError>;
}

/// Storage contract for temporal pricing rules.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn get(&self, rule_id: Uuid) -> Result<Option<TemporalPricingRule>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<TemporalPricingRule>, AppError>;
    async fn insert(&self, rule: TemporalPricingRule) -> Result<TemporalPricingRule, AppError>;
    async fn update(&self, rule: TemporalPricingRule) -> Result<TemporalPricingRule, AppError>;
    async fn list(&self, filter: &ListRulesFilter) -> Result<Vec<TemporalPricingRule>, AppError>;
    async fn delete(&self, rule_id: Uuid) -> Result<bool, AppError>;
    /// All rules with `is_active && auto_apply`, in stable insertion
    /// order. Geographic scope filtering happens in the matcher.
    async fn list_auto_apply(&self) -> Result<Vec<TemporalPricingRule>, AppError>;
}

/// Lookup contract for the external geography catalog.
#[async_trait]
pub trait GeographyStore: Send + Sync {
    async fn country(&self, id: Uuid) -> Result<Option<RegionMultiplier>, AppError>;
    async fn state(&self, id: Uuid) -> Result<Option<RegionMultiplier>, AppError>;
    async fn city(&self, id: Uuid) -> Result<Option<RegionMultiplier>, AppError>;
    async fn zone(&self, id: Uuid) -> Result<Option<ZoneMultiplier>, AppError>;
}

/// In-memory store backing the bundled binary and the test suite.
#[derive(Default)]
pub struct InMemoryStore {
    tiers: RwLock<Vec<Tier>>,
    rules: RwLock<Vec<TemporalPricingRule>>,
    countries: RwLock<HashMap<Uuid, RegionMultiplier>>,
    states: RwLock<HashMap<Uuid, RegionMultiplier>>,
    cities: RwLock<HashMap<Uuid, RegionMultiplier>>,
    zones: RwLock<HashMap<Uuid, ZoneMultiplier>>,
    ride_references: RwLock<HashMap<Uuid, u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_country(&self, id: Uuid, pricing_multiplier: Decimal) {
        self.countries.write().await.insert(
            id,
            RegionMultiplier {
                pricing_multiplier: Some(pricing_multiplier),
            },
        );
    }

    pub async fn seed_state(&self, id: Uuid, pricing_multiplier: Decimal) {
        self.states.write().await.insert(
            id,
            RegionMultiplier {
                pricing_multiplier: Some(pricing_multiplier),
            },
        );
    }

    pub async fn seed_city(&self, id: Uuid, pricing_multiplier: Decimal) {
        self.cities.write().await.insert(
            id,
            RegionMultiplier {
                pricing_multiplier: Some(pricing_multiplier),
            },
        );
    }

    pub async fn seed_zone(
        &self,
        id: Uuid,
        pricing_multiplier: Option<Decimal>,
        demand_multiplier: Option<Decimal>,
    ) {
        self.zones.write().await.insert(
            id,
            ZoneMultiplier {
                pricing_multiplier,
                demand_multiplier,
            },
        );
    }

    pub async fn seed_ride_references(&self, tier_id: Uuid, count: u64) {
        self.ride_references.write().await.insert(tier_id, count);
    }
}

#[async_trait]
impl TierStore for InMemoryStore {
    async fn get(&self, tier_id: Uuid) -> Result<Option<Tier>, AppError> {
        let tiers = self.tiers.read().await;
        Ok(tiers.iter().find(|t| t.tier_id == tier_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tier>, AppError> {
        let tiers = self.tiers.read().await;
        Ok(tiers.iter().find(|t| t.name == name).cloned())
    }

    async fn insert(&self, tier: Tier) -> Result<Tier, AppError> {
        let mut tiers = self.tiers.write().await;
        tiers.push(tier.clone());
        Ok(tier)
    }

    async fn update(&self, tier: Tier) -> Result<Tier, AppError> {
        let mut tiers = self.tiers.write().await;
        match tiers.iter_mut().find(|t| t.tier_id == tier.tier_id) {
            Some(slot) => {
                *slot = tier.clone();
                Ok(tier)
            }
            None => Err(AppError::NotFound(anyhow::anyhow!(
                "Tier not found: {}",
                tier.tier_id
            ))),
        }
    }

    async fn list(&self, filter: &ListTiersFilter) -> Result<Vec<Tier>, AppError> {
        let tiers = self.tiers.read().await;
        let mut result: Vec<Tier> = tiers
            .iter()
            .filter(|t| filter.include_inactive || t.is_active)
            .cloned()
            .collect();
        // Display order: priority descending, then name.
        result.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.name.cmp(&b.name)));

        let start = match filter.page_token {
            Some(token) => match result.iter().position(|t| t.tier_id == token) {
                Some(pos) => pos + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };
        let page_size = filter.page_size.max(1) as usize;
        Ok(result.into_iter().skip(start).take(page_size).collect())
    }

    async fn delete(&self, tier_id: Uuid) -> Result<bool, AppError> {
        let mut tiers = self.tiers.write().await;
        let before = tiers.len();
        tiers.retain(|t| t.tier_id != tier_id);
        Ok(tiers.len() < before)
    }

    async fn ride_reference_count(&self, tier_id: Uuid) -> Result<u64, AppError> {
        let refs = self.ride_references.read().await;
        Ok(refs.get(&tier_id).copied().unwrap_or(0))
    }
}

#[async_trait]
impl RuleStore for InMemoryStore {
    async fn get(&self, rule_id: Uuid) -> Result<Option<TemporalPricingRule>, AppError> {
        let rules = self.rules.read().await;
        Ok(rules.iter().find(|r| r.rule_id == rule_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TemporalPricingRule>, AppError> {
        let rules = self.rules.read().await;
        Ok(rules.iter().find(|r| r.name == name).cloned())
    }

    async fn insert(&self, rule: TemporalPricingRule) -> Result<TemporalPricingRule, AppError> {
        let mut rules = self.rules.write().await;
        rules.push(rule.clone());
        Ok(rule)
    }

    async fn update(&self, rule: TemporalPricingRule) -> Result<TemporalPricingRule, AppError> {
        let mut rules = self.rules.write().await;
        match rules.iter_mut().find(|r| r.rule_id == rule.rule_id) {
            Some(slot) => {
                *slot = rule.clone();
                Ok(rule)
            }
            None => Err(AppError::NotFound(anyhow::anyhow!(
                "Rule not found: {}",
                rule.rule_id
            ))),
        }
    }

    async fn list(&self, filter: &ListRulesFilter) -> Result<Vec<TemporalPricingRule>, AppError> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .filter(|r| filter.rule_type.map_or(true, |t| r.rule_type == t))
            .filter(|r| !filter.active_only || r.is_active)
            .cloned()
            .collect())
    }

    async fn delete(&self, rule_id: Uuid) -> Result<bool, AppError> {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| r.rule_id != rule_id);
        Ok(rules.len() < before)
    }

    async fn list_auto_apply(&self) -> Result<Vec<TemporalPricingRule>, AppError> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .filter(|r| r.is_active && r.auto_apply)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GeographyStore for InMemoryStore {
    async fn country(&self, id: Uuid) -> Result<Option<RegionMultiplier>, AppError> {
        Ok(self.countries.read().await.get(&id).copied())
    }

    async fn state(&self, id: Uuid) -> Result<Option<RegionMultiplier>, AppError> {
        Ok(self.states.read().await.get(&id).copied())
    }

    async fn city(&self, id: Uuid) -> Result<Option<RegionMultiplier>, AppError> {
        Ok(self.cities.read().await.get(&id).copied())
    }

    async fn zone(&self, id: Uuid) -> Result<Option<ZoneMultiplier>, AppError> {
        Ok(self.zones.read().await.get(&id).copied())
    }
}
