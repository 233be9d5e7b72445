//! HTTP-level integration tests for transfer validation, execution, and
//! the manual approval queue.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{assert_status, get_auth, post_json_auth, put_json_auth};
use sqlx::PgPool;

async fn seed_investor(app: Router, token: &str, name: &str, email: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/investors",
        token,
        serde_json::json!({
            "name": name,
            "email": email,
            "jurisdiction": "DE",
            "investor_type": "professional",
            "classification_method": "per-se professional",
            "accredited": true,
        }),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    json["id"].as_i64().unwrap()
}

async fn seed_asset(app: Router, token: &str, symbol: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/assets",
        token,
        serde_json::json!({
            "name": format!("{symbol} Units"),
            "symbol": symbol,
            "total_units": 1_000_000,
            "unit_price_cents": 10_000,
        }),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    json["id"].as_i64().unwrap()
}

async fn seed_holding(app: Router, token: &str, asset_id: i64, investor_id: i64, units: i64) {
    let response = post_json_auth(
        app,
        &format!("/api/v1/assets/{asset_id}/holdings"),
        token,
        serde_json::json!({
            "asset_id": asset_id,
            "investor_id": investor_id,
            "units": units,
        }),
    )
    .await;
    assert_status(response, StatusCode::CREATED).await;
}

async fn investor_units(app: Router, token: &str, investor_id: i64, asset_id: i64) -> i64 {
    let response = get_auth(
        app,
        &format!("/api/v1/investors/{investor_id}/holdings"),
        token,
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["asset_id"] == asset_id)
        .map(|h| h["units"].as_i64().unwrap())
        .unwrap_or(0)
}

fn transfer_body(asset_id: i64, from: i64, to: i64, units: i64) -> serde_json::Value {
    serde_json::json!({
        "asset_id": asset_id,
        "from_investor_id": from,
        "to_investor_id": to,
        "units": units,
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn execute_moves_units_between_holdings(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 1000).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers",
        &token,
        transfer_body(asset, alice, bob, 400),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;

    assert_eq!(json["transfer"]["status"], "executed");
    assert!(json["transfer"]["decision_record_id"].is_i64());
    assert!(!json["checks"].as_array().unwrap().is_empty());

    assert_eq!(investor_units(app.clone(), &token, alice, asset).await, 600);
    assert_eq!(investor_units(app, &token, bob, asset).await, 400);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fund_linked_transfer_runs_receiver_eligibility(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    for investor in [alice, bob] {
        let response = put_json_auth(
            app.clone(),
            &format!("/api/v1/investors/{investor}/kyc"),
            &token,
            serde_json::json!({ "kyc_status": "verified" }),
        )
        .await;
        assert_status(response, StatusCode::OK).await;
    }

    let response = post_json_auth(
        app.clone(),
        "/api/v1/funds",
        &token,
        serde_json::json!({
            "name": "Alpha Fund",
            "legal_form": "SICAV-RAIF",
            "domicile": "LU",
        }),
    )
    .await;
    let fund = assert_status(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/funds/{fund}/criteria"),
        &token,
        serde_json::json!({
            "jurisdiction": "DE",
            "investor_type": "professional",
            "minimum_investment_cents": 10_000_000,
            "effective_date": "2026-01-01",
        }),
    )
    .await;
    assert_status(response, StatusCode::CREATED).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/assets",
        &token,
        serde_json::json!({
            "fund_structure_id": fund,
            "name": "Alpha Fund Units",
            "symbol": "ALPH",
            "total_units": 1_000_000,
            "unit_price_cents": 10_000,
        }),
    )
    .await;
    let asset = assert_status(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();
    seed_holding(app.clone(), &token, asset, alice, 1000).await;

    // 100 units at 10,000 cents is below the fund's 10,000,000 minimum,
    // so the receiver fails the fund eligibility leg of validation.
    let response = post_json_auth(
        app,
        "/api/v1/transfers/validate",
        &token,
        transfer_body(asset, alice, bob, 100),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;

    assert_eq!(json["valid"], false);
    let min_check = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["rule"] == "minimum_investment")
        .expect("fund eligibility checks should join transfer validation");
    assert_eq!(min_check["passed"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn execute_rejects_insufficient_balance(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 100).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers",
        &token,
        transfer_body(asset, alice, bob, 500),
    )
    .await;
    let json = assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(json["code"], "RULE_VIOLATION");

    // No transfer row is kept for a rejected execution; only the
    // decision record captures the attempt.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/assets/{asset}/transfers"),
        &token,
    )
    .await;
    let history = assert_status(response, StatusCode::OK).await;
    assert!(history["data"].as_array().unwrap().is_empty());

    let response = get_auth(app.clone(), "/api/v1/decisions", &token).await;
    let decisions = assert_status(response, StatusCode::OK).await;
    let latest = &decisions["data"][0];
    assert_eq!(latest["decision_type"], "transfer_validation");
    assert_eq!(latest["result"], "rejected");

    // No units moved.
    assert_eq!(investor_units(app, &token, alice, asset).await, 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validate_reports_violations_without_moving_units(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 100).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers/validate",
        &token,
        transfer_body(asset, alice, bob, 500),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;

    assert_eq!(json["valid"], false);
    assert!(!json["violations"].as_array().unwrap().is_empty());
    let balance_check = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["rule"] == "sufficient_balance")
        .expect("balance check should run");
    assert_eq!(balance_check["passed"], false);
    assert!(json["decision_record_id"].is_i64());

    assert_eq!(investor_units(app, &token, alice, asset).await, 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn simulate_marks_decision_as_simulated(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 1000).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers/simulate",
        &token,
        transfer_body(asset, alice, bob, 100),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["valid"], true);

    let record_id = json["decision_record_id"].as_i64().unwrap();
    let response = get_auth(app, &format!("/api/v1/decisions/{record_id}"), &token).await;
    let record = assert_status(response, StatusCode::OK).await;
    assert_eq!(record["result"], "simulated");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn kyc_rule_blocks_unverified_receiver(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 1000).await;

    // Publish a rule set requiring verified KYC (the default).
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/assets/{asset}/rule-sets"),
        &token,
        serde_json::json!({ "qualification_required": false }),
    )
    .await;
    assert_status(response, StatusCode::CREATED).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers",
        &token,
        transfer_body(asset, alice, bob, 100),
    )
    .await;
    let json = assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(json["code"], "RULE_VIOLATION");

    // Verify both parties and retry.
    for id in [alice, bob] {
        let response = put_json_auth(
            app.clone(),
            &format!("/api/v1/investors/{id}/kyc"),
            &token,
            serde_json::json!({ "kyc_status": "verified" }),
        )
        .await;
        assert_status(response, StatusCode::OK).await;
    }

    let response = post_json_auth(
        app,
        "/api/v1/transfers",
        &token,
        transfer_body(asset, alice, bob, 100),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(json["transfer"]["status"], "executed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn large_transfer_waits_for_manual_approval(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 10_000).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/assets/{asset}/rule-sets"),
        &token,
        serde_json::json!({
            "qualification_required": false,
            "kyc_required": false,
            "approval_threshold_units": 1000,
        }),
    )
    .await;
    assert_status(response, StatusCode::CREATED).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers",
        &token,
        transfer_body(asset, alice, bob, 5000),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(json["transfer"]["status"], "pending_approval");
    let transfer_id = json["transfer"]["id"].as_i64().unwrap();

    // Units stay put until a reviewer approves.
    assert_eq!(
        investor_units(app.clone(), &token, alice, asset).await,
        10_000
    );

    let response = get_auth(app.clone(), "/api/v1/transfers/pending", &token).await;
    let pending = assert_status(response, StatusCode::OK).await;
    assert!(pending["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["id"] == transfer_id));

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/transfers/{transfer_id}/approve"),
        &token,
        serde_json::json!({}),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["status"], "executed");

    assert_eq!(investor_units(app.clone(), &token, alice, asset).await, 5000);
    assert_eq!(investor_units(app, &token, bob, asset).await, 5000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_pending_transfer_keeps_units(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 10_000).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/assets/{asset}/rule-sets"),
        &token,
        serde_json::json!({
            "qualification_required": false,
            "kyc_required": false,
            "approval_threshold_units": 1000,
        }),
    )
    .await;
    assert_status(response, StatusCode::CREATED).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers",
        &token,
        transfer_body(asset, alice, bob, 2000),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    let transfer_id = json["transfer"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/transfers/{transfer_id}/reject"),
        &token,
        serde_json::json!({ "reason": "concentration concerns" }),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["status"], "rejected");

    assert_eq!(
        investor_units(app.clone(), &token, alice, asset).await,
        10_000
    );
    assert_eq!(investor_units(app, &token, bob, asset).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approving_non_pending_transfer_conflicts(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);

    let alice = seed_investor(app.clone(), &token, "Alice", "alice@t.example").await;
    let bob = seed_investor(app.clone(), &token, "Bob", "bob@t.example").await;
    let asset = seed_asset(app.clone(), &token, "FND1").await;
    seed_holding(app.clone(), &token, asset, alice, 1000).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/transfers",
        &token,
        transfer_body(asset, alice, bob, 100),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    let transfer_id = json["transfer"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/transfers/{transfer_id}/approve"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
