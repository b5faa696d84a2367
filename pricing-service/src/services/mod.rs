//! Services module for pricing-service.

pub mod calculator;
pub mod catalog;
pub mod metrics;
pub mod regional;
pub mod simulation;
pub mod store;
pub mod temporal;

pub use calculator::{CalculateRequest, PricingBreakdown, PricingCalculator};
pub use catalog::TierCatalog;
pub use metrics::{get_metrics, init_metrics, record_error};
pub use regional::{RegionalMultipliers, RegionalResolver};
pub use simulation::{SimulateRequest, SimulationComposer, SimulationQuote};
pub use store::{GeographyStore, InMemoryStore, RuleStore, TierStore};
pub use temporal::{RuleEvaluation, RuleSummary, TemporalRuleService};
