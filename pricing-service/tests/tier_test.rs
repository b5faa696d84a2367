//! Tier catalog integration tests: CRUD, validation, and bulk adjustment.

mod common;

use common::{dec, tier_payload, TestApp};
use reqwest::Client;
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn create_tier_returns_created() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(&format!("{}/tiers", app.http_address))
        .json(&tier_payload("Economy"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["name"], "Economy");
    assert_eq!(body["base_fare"], 250);
    assert_eq!(body["is_active"], true);
    assert_eq!(dec(&body["tier_multiplier"]), Decimal::ONE);
    assert!(Uuid::parse_str(body["tier_id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn create_tier_rejects_out_of_bound_config() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let mut payload = tier_payload("Broken");
    payload["base_fare"] = serde_json::json!(0);
    payload["surge_multiplier"] = serde_json::json!("50.0");

    let response = client
        .post(&format!("{}/tiers", app.http_address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 422);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let violations = body["violations"].as_array().expect("violations array");
    let fields: Vec<&str> = violations
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"base_fare"));
    assert!(fields.contains(&"surge_multiplier"));
}

#[tokio::test]
async fn duplicate_tier_name_conflicts() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let url = format!("{}/tiers", app.http_address);

    let first = client
        .post(&url)
        .json(&tier_payload("Premium"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(&url)
        .json(&tier_payload("Premium"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status(), 409);
}

#[tokio::test]
async fn tier_crud_cycle_works() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let created: serde_json::Value = client
        .post(&format!("{}/tiers", app.http_address))
        .json(&tier_payload("Comfort"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    let tier_id = created["tier_id"].as_str().unwrap().to_string();
    let tier_url = format!("{}/tiers/{}", app.http_address, tier_id);

    let fetched = client
        .get(&tier_url)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(fetched.status(), 200);

    let updated: serde_json::Value = client
        .put(&tier_url)
        .json(&serde_json::json!({ "per_km_rate": 150 }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(updated["per_km_rate"], 150);
    assert_eq!(updated["name"], "Comfort");

    let deleted = client
        .delete(&tier_url)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(deleted.status(), 204);

    let gone = client
        .get(&tier_url)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn delete_is_blocked_by_ride_references() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let created: serde_json::Value = client
        .post(&format!("{}/tiers", app.http_address))
        .json(&tier_payload("Legacy"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    let tier_id = Uuid::parse_str(created["tier_id"].as_str().unwrap()).unwrap();

    app.store.seed_ride_references(tier_id, 3).await;

    let response = client
        .delete(&format!("{}/tiers/{}", app.http_address, tier_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn list_tiers_hides_inactive_by_default() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let url = format!("{}/tiers", app.http_address);

    client
        .post(&url)
        .json(&tier_payload("Active"))
        .send()
        .await
        .expect("Failed to execute request");

    let mut inactive = tier_payload("Retired");
    inactive["is_active"] = serde_json::json!(false);
    client
        .post(&url)
        .json(&inactive)
        .send()
        .await
        .expect("Failed to execute request");

    let visible: serde_json::Value = client
        .get(&url)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(visible.as_array().unwrap().len(), 1);

    let all: serde_json::Value = client
        .get(&format!("{}?include_inactive=true", url))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn validate_endpoint_reports_comparison() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let baseline: serde_json::Value = client
        .post(&format!("{}/tiers", app.http_address))
        .json(&tier_payload("Economy"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    let mut candidate = tier_payload("Premium");
    candidate["base_fare"] = serde_json::json!(900);
    candidate["compare_with_tier_id"] = baseline["tier_id"].clone();

    let report: serde_json::Value = client
        .post(&format!("{}/tiers/validate", app.http_address))
        .json(&candidate)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(report["is_valid"], true);
    assert_eq!(
        report["comparison"]["competitiveness"],
        "more_expensive"
    );
}

#[tokio::test]
async fn bulk_adjust_applies_percentage_and_isolates_failures() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    let url = format!("{}/tiers", app.http_address);

    let a: serde_json::Value = client
        .post(&url)
        .json(&tier_payload("A"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    let missing = Uuid::new_v4();

    let results: serde_json::Value = client
        .post(&format!("{}/tiers/bulk-adjust", app.http_address))
        .json(&serde_json::json!({
            "tier_ids": [a["tier_id"], missing],
            "field": "base_fare",
            "adjustment_type": "percentage",
            "adjustment_value": "10"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    let results = results.as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["tier"]["base_fare"], 275);
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["error"].is_string());
}
