//! Simulation integration tests: temporal pricing layered over a base quote.

mod common;

use common::{dec, tier_payload, TestApp};
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn create_tier(app: &TestApp, client: &Client) -> String {
    let created: serde_json::Value = client
        .post(&format!("{}/tiers", app.http_address))
        .json(&tier_payload("Economy"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    created["tier_id"].as_str().unwrap().to_string()
}

fn simulate_body(tier_id: &str) -> serde_json::Value {
    serde_json::json!({
        "tier_id": tier_id,
        "distance_km": "10",
        "duration_minutes": "20",
        "date_time": "2026-08-30T18:30:00"
    })
}

#[tokio::test]
async fn simulation_without_rules_matches_base_quote() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let tier_id = create_tier(&app, &client).await;

    let quote: serde_json::Value = client
        .post(&format!("{}/pricing/simulate", app.http_address))
        .json(&simulate_body(&tier_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(quote["mode"], "automatic");
    assert_eq!(dec(&quote["temporal_adjusted_total"]), d("1750"));
    assert_eq!(dec(&quote["total_amount"]), d("2065"));
    assert!(quote["temporal_evaluation"]["applied_rule"].is_null());
}

#[tokio::test]
async fn simulation_keeps_fees_and_taxes_from_base_quote() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let tier_id = create_tier(&app, &client).await;

    // 2026-08-30 is a Sunday.
    client
        .post(&format!("{}/rules", app.http_address))
        .json(&serde_json::json!({
            "name": "Sunday Peak",
            "rule_type": "day_of_week",
            "days_of_week": [0],
            "multiplier": "1.5",
            "priority": 50
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let quote: serde_json::Value = client
        .post(&format!("{}/pricing/simulate", app.http_address))
        .json(&simulate_body(&tier_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    // Temporal multiplier scales the base amount only. Fees and taxes
    // stay as quoted: 2625 + 175 + 140.
    assert_eq!(quote["mode"], "automatic");
    assert_eq!(dec(&quote["temporal_adjusted_total"]), d("2625"));
    assert_eq!(
        dec(&quote["base_pricing"]["final_pricing"]["service_fees"]),
        d("175")
    );
    assert_eq!(
        dec(&quote["base_pricing"]["final_pricing"]["taxes"]),
        d("140")
    );
    assert_eq!(dec(&quote["total_amount"]), d("2940"));
    assert!(quote["applied_rules"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "temporal_pricing"));
}

#[tokio::test]
async fn manual_rule_selection_switches_mode() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let tier_id = create_tier(&app, &client).await;

    let rule: serde_json::Value = client
        .post(&format!("{}/rules", app.http_address))
        .json(&serde_json::json!({
            "name": "Promo",
            "rule_type": "day_of_week",
            "days_of_week": [0],
            "multiplier": "0.8",
            "priority": 1,
            "auto_apply": false
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    let mut body = simulate_body(&tier_id);
    body["rule_ids"] = serde_json::json!([rule["rule_id"]]);

    let quote: serde_json::Value = client
        .post(&format!("{}/pricing/simulate", app.http_address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(quote["mode"], "manual");
    assert_eq!(quote["temporal_evaluation"]["applied_rule"]["name"], "Promo");
    assert_eq!(dec(&quote["temporal_adjusted_total"]), d("1400"));
    assert_eq!(dec(&quote["total_amount"]), d("1715"));
}
