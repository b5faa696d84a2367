//! Temporal pricing rule store and matcher.
//!
//! Rules are matched against a wall-clock instant and a geographic
//! scope. Selection is SelectTop: applicable rules are ordered by
//! priority descending and only the single top rule's multiplier is
//! applied; matches never stack multiplicatively.

use crate::models::{
    CreateRule, GeoScope, ListRulesFilter, RuleType, TemporalPricingRule, UpdateRule,
};
use crate::services::metrics::{record_rule_evaluation, record_rule_operation};
use crate::services::store::RuleStore;
use chrono::{Datelike, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::{AppError, FieldViolation};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const MULTIPLIER_MIN: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5
const MULTIPLIER_MAX: Decimal = Decimal::from_parts(10, 0, 0, false, 0); // 10.0
const PRIORITY_BOUNDS: (i32, i32) = (1, 100);

/// Parse an "HH:MM" string into minutes since midnight.
fn parse_hhmm(s: &str) -> Option<u32> {
    let (hh, mm) = s.split_once(':')?;
    if hh.len() != 2 || mm.len() != 2 {
        return None;
    }
    let hours: u32 = hh.parse().ok()?;
    let minutes: u32 = mm.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Time-of-day check with overnight wraparound: when start > end the
/// window crosses midnight (e.g. 22:00-06:00) and the test inverts.
/// A rule missing either bound always matches on the time dimension.
fn time_in_range(minutes: u32, start: Option<&str>, end: Option<&str>) -> bool {
    let (start, end) = match (start.and_then(parse_hhmm), end.and_then(parse_hhmm)) {
        (Some(s), Some(e)) => (s, e),
        _ => return true,
    };
    if start > end {
        minutes >= start || minutes <= end
    } else {
        minutes >= start && minutes <= end
    }
}

/// A matched rule as reported in evaluation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSummary {
    pub rule_id: Uuid,
    pub name: String,
    pub rule_type: RuleType,
    pub multiplier: Decimal,
    pub priority: i32,
}

impl From<&TemporalPricingRule> for RuleSummary {
    fn from(rule: &TemporalPricingRule) -> Self {
        Self {
            rule_id: rule.rule_id,
            name: rule.name.clone(),
            rule_type: rule.rule_type,
            multiplier: rule.multiplier,
            priority: rule.priority,
        }
    }
}

/// Outcome of evaluating the rule set at one instant and scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEvaluation {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    /// "HH:MM" of the evaluated instant.
    pub time: String,
    pub applicable_rules: Vec<RuleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_rule: Option<RuleSummary>,
    pub combined_multiplier: Decimal,
}

pub struct TemporalRuleService {
    rules: Arc<dyn RuleStore>,
}

impl TemporalRuleService {
    pub fn new(rules: Arc<dyn RuleStore>) -> Self {
        Self { rules }
    }

    fn validate_rule(rule: &TemporalPricingRule) -> Vec<FieldViolation> {
        let mut errors = Vec::new();

        if rule.name.trim().is_empty() {
            errors.push(FieldViolation::new("name", "required", "name must not be empty"));
        }
        if rule.multiplier < MULTIPLIER_MIN || rule.multiplier > MULTIPLIER_MAX {
            errors.push(FieldViolation::new(
                "multiplier",
                "range",
                format!(
                    "multiplier must be between {} and {} (got {})",
                    MULTIPLIER_MIN, MULTIPLIER_MAX, rule.multiplier
                ),
            ));
        }
        if rule.priority < PRIORITY_BOUNDS.0 || rule.priority > PRIORITY_BOUNDS.1 {
            errors.push(FieldViolation::new(
                "priority",
                "range",
                format!(
                    "priority must be between {} and {} (got {})",
                    PRIORITY_BOUNDS.0, PRIORITY_BOUNDS.1, rule.priority
                ),
            ));
        }
        for &day in &rule.days_of_week {
            if day > 6 {
                errors.push(FieldViolation::new(
                    "days_of_week",
                    "range",
                    format!("day values must be 0 (Sunday) through 6 (got {})", day),
                ));
            }
        }
        for (field, value) in [("start_time", &rule.start_time), ("end_time", &rule.end_time)] {
            if let Some(s) = value {
                if parse_hhmm(s).is_none() {
                    errors.push(FieldViolation::new(
                        field,
                        "format",
                        format!("{} must be an HH:MM time (got {:?})", field, s),
                    ));
                }
            }
        }

        // Type-specific required fields.
        match rule.rule_type {
            RuleType::TimeRange => {
                if rule.start_time.is_none() {
                    errors.push(FieldViolation::new(
                        "start_time",
                        "required",
                        "start_time is required for time_range rules",
                    ));
                }
                if rule.end_time.is_none() {
                    errors.push(FieldViolation::new(
                        "end_time",
                        "required",
                        "end_time is required for time_range rules",
                    ));
                }
            }
            RuleType::DayOfWeek => {
                if rule.days_of_week.is_empty() {
                    errors.push(FieldViolation::new(
                        "days_of_week",
                        "required",
                        "days_of_week is required for day_of_week rules",
                    ));
                }
            }
            RuleType::DateSpecific => {
                if rule.specific_dates.is_empty() {
                    errors.push(FieldViolation::new(
                        "specific_dates",
                        "required",
                        "specific_dates is required for date_specific rules",
                    ));
                }
            }
            RuleType::Seasonal => {
                if rule.date_ranges.is_empty() {
                    errors.push(FieldViolation::new(
                        "date_ranges",
                        "required",
                        "date_ranges is required for seasonal rules",
                    ));
                }
            }
        }

        errors
    }

    #[instrument(skip(self, input), fields(name = %input.name, rule_type = input.rule_type.as_str()))]
    pub async fn create_rule(&self, input: CreateRule) -> Result<TemporalPricingRule, AppError> {
        let now = Utc::now();
        let rule = TemporalPricingRule {
            rule_id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            rule_type: input.rule_type,
            start_time: input.start_time,
            end_time: input.end_time,
            days_of_week: input.days_of_week,
            specific_dates: input.specific_dates,
            date_ranges: input.date_ranges,
            multiplier: input.multiplier,
            priority: input.priority,
            country_id: input.country_id,
            state_id: input.state_id,
            city_id: input.city_id,
            zone_id: input.zone_id,
            is_active: input.is_active,
            auto_apply: input.auto_apply,
            created_utc: now,
            updated_utc: now,
        };

        let errors = Self::validate_rule(&rule);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if self.rules.find_by_name(&rule.name).await?.is_some() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Rule name already exists: {}",
                rule.name
            )));
        }

        let rule = self.rules.insert(rule).await?;
        record_rule_operation("created");
        tracing::info!(rule_id = %rule.rule_id, name = %rule.name, "Temporal rule created");
        Ok(rule)
    }

    #[instrument(skip(self, input), fields(rule_id = %rule_id))]
    pub async fn update_rule(
        &self,
        rule_id: Uuid,
        input: UpdateRule,
    ) -> Result<TemporalPricingRule, AppError> {
        let mut rule = self
            .rules
            .get(rule_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Rule not found: {}", rule_id)))?;

        if let Some(name) = input.name {
            if name != rule.name {
                if let Some(existing) = self.rules.find_by_name(&name).await? {
                    if existing.rule_id != rule_id {
                        return Err(AppError::Conflict(anyhow::anyhow!(
                            "Rule name already exists: {}",
                            name
                        )));
                    }
                }
                rule.name = name;
            }
        }
        if let Some(v) = input.description {
            rule.description = v;
        }
        if let Some(v) = input.start_time {
            rule.start_time = Some(v);
        }
        if let Some(v) = input.end_time {
            rule.end_time = Some(v);
        }
        if let Some(v) = input.days_of_week {
            rule.days_of_week = v;
        }
        if let Some(v) = input.specific_dates {
            rule.specific_dates = v;
        }
        if let Some(v) = input.date_ranges {
            rule.date_ranges = v;
        }
        if let Some(v) = input.multiplier {
            rule.multiplier = v;
        }
        if let Some(v) = input.priority {
            rule.priority = v;
        }
        if let Some(v) = input.country_id {
            rule.country_id = v;
        }
        if let Some(v) = input.state_id {
            rule.state_id = v;
        }
        if let Some(v) = input.city_id {
            rule.city_id = v;
        }
        if let Some(v) = input.zone_id {
            rule.zone_id = v;
        }
        if let Some(v) = input.is_active {
            rule.is_active = v;
        }
        if let Some(v) = input.auto_apply {
            rule.auto_apply = v;
        }

        let errors = Self::validate_rule(&rule);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        rule.updated_utc = Utc::now();
        let rule = self.rules.update(rule).await?;
        record_rule_operation("updated");
        tracing::info!(rule_id = %rule.rule_id, "Temporal rule updated");
        Ok(rule)
    }

    pub async fn get_rule(&self, rule_id: Uuid) -> Result<TemporalPricingRule, AppError> {
        self.rules
            .get(rule_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Rule not found: {}", rule_id)))
    }

    pub async fn list_rules(
        &self,
        filter: &ListRulesFilter,
    ) -> Result<Vec<TemporalPricingRule>, AppError> {
        self.rules.list(filter).await
    }

    #[instrument(skip(self), fields(rule_id = %rule_id))]
    pub async fn delete_rule(&self, rule_id: Uuid) -> Result<(), AppError> {
        if !self.rules.delete(rule_id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Rule not found: {}",
                rule_id
            )));
        }
        record_rule_operation("deleted");
        Ok(())
    }

    /// True when the rule's scope accepts the request scope: global
    /// rules always do, otherwise any single matching level qualifies
    /// (an OR across levels, not most-specific-wins).
    fn scope_matches(rule: &TemporalPricingRule, scope: &GeoScope) -> bool {
        if rule.is_global() {
            return true;
        }
        let level_matches = |rule_id: Option<Uuid>, scope_id: Option<Uuid>| match (rule_id, scope_id)
        {
            (Some(r), Some(s)) => r == s,
            _ => false,
        };
        level_matches(rule.country_id, scope.country_id)
            || level_matches(rule.state_id, scope.state_id)
            || level_matches(rule.city_id, scope.city_id)
            || level_matches(rule.zone_id, scope.zone_id)
    }

    /// Type-specific instant matcher. Empty or absent optional fields
    /// are permissive: they match any value on that dimension.
    fn matches_at(rule: &TemporalPricingRule, at: NaiveDateTime) -> bool {
        let day = at.weekday().num_days_from_sunday() as u8;
        let minutes = at.hour() * 60 + at.minute();
        let date = at.date();

        match rule.rule_type {
            RuleType::TimeRange => {
                let day_ok = rule.days_of_week.is_empty() || rule.days_of_week.contains(&day);
                day_ok
                    && time_in_range(
                        minutes,
                        rule.start_time.as_deref(),
                        rule.end_time.as_deref(),
                    )
            }
            RuleType::DayOfWeek => {
                rule.days_of_week.is_empty() || rule.days_of_week.contains(&day)
            }
            RuleType::DateSpecific => {
                rule.specific_dates.is_empty() || rule.specific_dates.contains(&date)
            }
            RuleType::Seasonal => {
                rule.date_ranges.is_empty()
                    || rule
                        .date_ranges
                        .iter()
                        .any(|r| r.start <= date && date <= r.end)
            }
        }
    }

    /// Candidate rules (`is_active && auto_apply`, scope OR-match)
    /// whose type-specific matcher accepts the instant.
    pub async fn find_applicable_rules(
        &self,
        at: NaiveDateTime,
        scope: &GeoScope,
    ) -> Result<Vec<TemporalPricingRule>, AppError> {
        let candidates = self.rules.list_auto_apply().await?;
        Ok(candidates
            .into_iter()
            .filter(|r| Self::scope_matches(r, scope))
            .filter(|r| Self::matches_at(r, at))
            .collect())
    }

    fn select_top(at: NaiveDateTime, mut rules: Vec<TemporalPricingRule>) -> RuleEvaluation {
        // Stable sort: equal priorities keep the store's ordering.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        let applied_rule: Option<RuleSummary> = rules.first().map(RuleSummary::from);
        let combined_multiplier = applied_rule
            .as_ref()
            .map(|r| r.multiplier)
            .unwrap_or(Decimal::ONE);

        RuleEvaluation {
            day_of_week: at.weekday().num_days_from_sunday() as u8,
            time: format!("{:02}:{:02}", at.hour(), at.minute()),
            applicable_rules: rules.iter().map(RuleSummary::from).collect(),
            applied_rule,
            combined_multiplier,
        }
    }

    /// Automatic evaluation: match the full rule set and apply the
    /// single highest-priority rule (SelectTop).
    #[instrument(skip(self, scope))]
    pub async fn evaluate(
        &self,
        at: NaiveDateTime,
        scope: &GeoScope,
    ) -> Result<RuleEvaluation, AppError> {
        let applicable = self.find_applicable_rules(at, scope).await?;
        record_rule_evaluation("automatic");
        Ok(Self::select_top(at, applicable))
    }

    /// Manual evaluation: load exactly the given rules, skip the
    /// matching step, and apply the same SelectTop policy. Inactive
    /// rules are excluded; an unknown id is an error.
    #[instrument(skip(self, rule_ids), fields(count = rule_ids.len()))]
    pub async fn evaluate_specific(
        &self,
        rule_ids: &[Uuid],
        at: NaiveDateTime,
    ) -> Result<RuleEvaluation, AppError> {
        let mut selected = Vec::with_capacity(rule_ids.len());
        for &rule_id in rule_ids {
            let rule = self.rules.get(rule_id).await?.ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Rule not found: {}", rule_id))
            })?;
            if rule.is_active {
                selected.push(rule);
            }
        }
        record_rule_evaluation("manual");
        Ok(Self::select_top(at, selected))
    }
}
