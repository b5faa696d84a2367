//! Configuration for pricing-service.

use service_core::config::Config as CoreConfig;
use service_core::error::AppError;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub common: CoreConfig,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl PricingConfig {
    /// Load configuration from the environment (and `.env` when present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            common: CoreConfig::load()?,
            service_name: env_or("SERVICE_NAME", "pricing-service"),
            log_level: env_or("LOG_LEVEL", "info"),
            otlp_endpoint: std::env::var("OTLP_ENDPOINT").ok(),
        })
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            common: CoreConfig::default(),
            service_name: "pricing-service".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}
