//! Test helper module for pricing-service integration tests.

#![allow(dead_code)]

use pricing_service::config::PricingConfig;
use pricing_service::services::InMemoryStore;
use pricing_service::startup::Application;
use rust_decimal::Decimal;
use service_core::config::Config as CoreConfig;
use std::str::FromStr;
use std::sync::Arc;

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub http_address: String,
    pub port: u16,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    /// Spawn a new test application on a random port.
    pub async fn spawn() -> Self {
        let config = PricingConfig {
            common: CoreConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            service_name: "pricing-service-test".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        };

        let store = Arc::new(InMemoryStore::new());
        let app = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let http_address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            port,
            store,
        }
    }
}

/// Parse a decimal field out of a JSON response body. Amounts and
/// multipliers serialize as strings.
pub fn dec(value: &serde_json::Value) -> Decimal {
    let s = value.as_str().unwrap_or_else(|| panic!("not a string: {value}"));
    Decimal::from_str(s).unwrap_or_else(|_| panic!("not a decimal: {s}"))
}

/// Minimal valid tier payload with a 250 base fare, 25/min, 100/km
/// and all multipliers at their defaults.
pub fn tier_payload(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "base_fare": 250,
        "minimum_fare": 500,
        "per_minute_rate": 25,
        "per_km_rate": 100
    })
}
