//! Shared fixtures for repository tests.

use sqlx::PgPool;

use registra_core::types::DbId;
use registra_db::models::asset::CreateAsset;
use registra_db::models::fund_structure::CreateFundStructure;
use registra_db::models::holding::CreateHolding;
use registra_db::models::investor::{CreateInvestor, UpdateKyc};
use registra_db::repositories::{AssetRepo, FundStructureRepo, HoldingRepo, InvestorRepo};

pub const TENANT: &str = "acme";

pub async fn seed_investor(pool: &PgPool, name: &str, jurisdiction: &str) -> DbId {
    let investor = InvestorRepo::create(
        pool,
        TENANT,
        &CreateInvestor {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            tax_id: None,
            lei: None,
            jurisdiction: jurisdiction.to_string(),
            investor_type: "professional".to_string(),
            accredited: Some(true),
            classification_method: Some("per-se professional".to_string()),
            classification_date: None,
            classification_evidence: None,
        },
    )
    .await
    .unwrap();

    InvestorRepo::update_kyc(
        pool,
        TENANT,
        investor.id,
        &UpdateKyc {
            kyc_status: "verified".to_string(),
            kyc_expiry: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    investor.id
}

pub async fn seed_fund(pool: &PgPool, name: &str) -> DbId {
    FundStructureRepo::create(
        pool,
        TENANT,
        &CreateFundStructure {
            name: name.to_string(),
            legal_form: "RAIF".to_string(),
            domicile: "LU".to_string(),
            status: None,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_asset(pool: &PgPool, symbol: &str, total_units: i64) -> DbId {
    AssetRepo::create(
        pool,
        TENANT,
        &CreateAsset {
            fund_structure_id: None,
            name: format!("{symbol} Units"),
            symbol: symbol.to_string(),
            total_units,
            unit_price_cents: 100_00,
            currency: None,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_holding(pool: &PgPool, asset_id: DbId, investor_id: DbId, units: i64) {
    HoldingRepo::create(
        pool,
        TENANT,
        &CreateHolding {
            asset_id,
            investor_id,
            units,
            acquired_at: None,
        },
    )
    .await
    .unwrap();
}
