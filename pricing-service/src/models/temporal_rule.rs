//! Temporal pricing rule model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which temporal dimension a rule matches on. Fixed at creation;
/// drives which fields are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    TimeRange,
    DayOfWeek,
    DateSpecific,
    Seasonal,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::TimeRange => "time_range",
            RuleType::DayOfWeek => "day_of_week",
            RuleType::DateSpecific => "date_specific",
            RuleType::Seasonal => "seasonal",
        }
    }
}

/// An inclusive seasonal date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A time/date-scoped multiplier applied on top of base pricing.
///
/// A rule with no geographic ids is global; otherwise it applies when
/// any one of its ids matches the evaluation scope. Only rules with
/// both `is_active` and `auto_apply` participate in automatic
/// evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalPricingRule {
    pub rule_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub rule_type: RuleType,
    /// "HH:MM"; `start_time > end_time` denotes an overnight window.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// 0 = Sunday .. 6 = Saturday.
    pub days_of_week: Vec<u8>,
    pub specific_dates: Vec<NaiveDate>,
    pub date_ranges: Vec<DateRange>,
    pub multiplier: Decimal,
    /// Higher wins when multiple rules match.
    pub priority: i32,
    pub country_id: Option<Uuid>,
    pub state_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub zone_id: Option<Uuid>,
    pub is_active: bool,
    pub auto_apply: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl TemporalPricingRule {
    /// True when the rule carries no geographic scope at all.
    pub fn is_global(&self) -> bool {
        self.country_id.is_none()
            && self.state_id.is_none()
            && self.city_id.is_none()
            && self.zone_id.is_none()
    }
}

fn default_priority() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// Input for creating a temporal pricing rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRule {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rule_type: RuleType,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default)]
    pub specific_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub date_ranges: Vec<DateRange>,
    pub multiplier: Decimal,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub country_id: Option<Uuid>,
    #[serde(default)]
    pub state_id: Option<Uuid>,
    #[serde(default)]
    pub city_id: Option<Uuid>,
    #[serde(default)]
    pub zone_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub auto_apply: bool,
}

/// Input for a partial rule update. The rule type is fixed at
/// creation; the merged rule is re-validated against it in full.
///
/// Description and scope ids distinguish absent (keep) from explicit
/// null (clear): clearing every scope id makes the rule global again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRule {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::clearable")]
    pub description: Option<Option<String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub days_of_week: Option<Vec<u8>>,
    pub specific_dates: Option<Vec<NaiveDate>>,
    pub date_ranges: Option<Vec<DateRange>>,
    pub multiplier: Option<Decimal>,
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "crate::models::clearable")]
    pub country_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::models::clearable")]
    pub state_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::models::clearable")]
    pub city_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::models::clearable")]
    pub zone_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub auto_apply: Option<bool>,
}

/// Filter parameters for listing rules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRulesFilter {
    #[serde(default)]
    pub rule_type: Option<RuleType>,
    #[serde(default)]
    pub active_only: bool,
}
