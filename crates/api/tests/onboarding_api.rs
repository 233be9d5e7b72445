//! HTTP-level integration tests for the onboarding workflow: apply,
//! eligibility review, manual decision, allocation.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{assert_status, get_auth, post_json_auth, put_json_auth};
use sqlx::PgPool;

struct Fixture {
    investor: i64,
    fund: i64,
    asset: i64,
}

/// Seed an active fund with matching criteria, an asset, and a
/// KYC-verified professional investor from DE.
async fn seed_fixture(app: Router, token: &str) -> Fixture {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/investors",
        token,
        serde_json::json!({
            "name": "Alice",
            "email": "alice@t.example",
            "jurisdiction": "DE",
            "investor_type": "professional",
            "classification_method": "per-se professional",
            "accredited": true,
        }),
    )
    .await;
    let investor = assert_status(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/investors/{investor}/kyc"),
        token,
        serde_json::json!({ "kyc_status": "verified" }),
    )
    .await;
    assert_status(response, StatusCode::OK).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/funds",
        token,
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
        token,
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
        app,
        "/api/v1/assets",
        token,
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

    Fixture {
        investor,
        fund,
        asset,
    }
}

async fn apply(app: Router, token: &str, fixture: &Fixture) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/onboarding",
        token,
        serde_json::json!({
            "investor_id": fixture.investor,
            "fund_structure_id": fixture.fund,
            "asset_id": fixture.asset,
            "investment_amount_cents": 50_000_000,
        }),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(json["status"], "applied");
    json["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_onboarding_flow_ends_allocated(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);
    let fixture = seed_fixture(app.clone(), &token).await;
    let id = apply(app.clone(), &token, &fixture).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding/{id}/check-eligibility"),
        &token,
        serde_json::json!({}),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["evaluation"]["eligible"], true);
    assert_eq!(json["record"]["status"], "eligible");
    assert!(json["evaluation"]["decision_record_id"].is_i64());

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding/{id}/approve"),
        &token,
        serde_json::json!({ "notes": "documents verified" }),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["status"], "approved");

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding/{id}/allocate"),
        &token,
        serde_json::json!({ "units": 500 }),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["status"], "allocated");

    // The allocation created a holding.
    let response = get_auth(
        app,
        &format!("/api/v1/investors/{}/holdings", fixture.investor),
        &token,
    )
    .await;
    let holdings = assert_status(response, StatusCode::OK).await;
    let units = holdings["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["asset_id"] == fixture.asset)
        .map(|h| h["units"].as_i64().unwrap());
    assert_eq!(units, Some(500));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_before_eligibility_review_conflicts(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);
    let fixture = seed_fixture(app.clone(), &token).await;
    let id = apply(app.clone(), &token, &fixture).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/onboarding/{id}/approve"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn investor_without_criteria_is_ineligible(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);
    let fixture = seed_fixture(app.clone(), &token).await;

    // A retail investor has no matching criteria row.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/investors",
        &token,
        serde_json::json!({
            "name": "Rita",
            "email": "rita@t.example",
            "jurisdiction": "DE",
            "investor_type": "retail",
        }),
    )
    .await;
    let retail = assert_status(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/onboarding",
        &token,
        serde_json::json!({
            "investor_id": retail,
            "fund_structure_id": fixture.fund,
        }),
    )
    .await;
    let id = assert_status(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding/{id}/check-eligibility"),
        &token,
        serde_json::json!({}),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["evaluation"]["eligible"], false);
    assert_eq!(json["record"]["status"], "ineligible");

    // Ineligible is terminal.
    let response = post_json_auth(
        app,
        &format!("/api/v1/onboarding/{id}/approve"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);
    let fixture = seed_fixture(app.clone(), &token).await;
    let id = apply(app.clone(), &token, &fixture).await;

    let response = get_auth(app.clone(), "/api/v1/onboarding?status=applied", &token).await;
    let json = assert_status(response, StatusCode::OK).await;
    assert!(json["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == id));

    let response = get_auth(app.clone(), "/api/v1/onboarding?status=allocated", &token).await;
    let json = assert_status(response, StatusCode::OK).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = get_auth(app, "/api/v1/onboarding?status=bogus", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_respects_limit_and_offset(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);
    let fixture = seed_fixture(app.clone(), &token).await;
    apply(app.clone(), &token, &fixture).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/investors",
        &token,
        serde_json::json!({
            "name": "Ben",
            "email": "ben@t.example",
            "jurisdiction": "DE",
            "investor_type": "professional",
            "classification_method": "per-se professional",
        }),
    )
    .await;
    let second = assert_status(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();
    let response = post_json_auth(
        app.clone(),
        "/api/v1/onboarding",
        &token,
        serde_json::json!({
            "investor_id": second,
            "fund_structure_id": fixture.fund,
        }),
    )
    .await;
    assert_status(response, StatusCode::CREATED).await;

    let response = get_auth(app.clone(), "/api/v1/onboarding?limit=1", &token).await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = get_auth(app.clone(), "/api/v1/onboarding?limit=1&offset=1", &token).await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = get_auth(app, "/api/v1/onboarding", &token).await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn conflicting_eligibility_review_records_nothing(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);
    let fixture = seed_fixture(app.clone(), &token).await;
    let id = apply(app.clone(), &token, &fixture).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding/{id}/check-eligibility"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_status(response, StatusCode::OK).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding/{id}/approve"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_status(response, StatusCode::OK).await;

    let response = get_auth(app.clone(), "/api/v1/decisions", &token).await;
    let before = assert_status(response, StatusCode::OK).await["data"]
        .as_array()
        .unwrap()
        .len();

    // Reviewing an approved application conflicts, and the failed call
    // must leave no eligibility decision record behind.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding/{id}/check-eligibility"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(app, "/api/v1/decisions", &token).await;
    let after = assert_status(response, StatusCode::OK).await["data"]
        .as_array()
        .unwrap()
        .len();
    assert_eq!(after, before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn apply_for_unknown_investor_404s(pool: PgPool) {
    let (_, token) = common::seed_officer(&pool).await;
    let app = common::build_test_app(pool);
    let fixture = seed_fixture(app.clone(), &token).await;

    let response = post_json_auth(
        app,
        "/api/v1/onboarding",
        &token,
        serde_json::json!({
            "investor_id": 999_999,
            "fund_structure_id": fixture.fund,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
