mod common;

use sqlx::PgPool;

use common::TENANT;
use registra_db::models::decision_record::CreateDecisionRecord;
use registra_db::repositories::DecisionRecordRepo;

fn record(subject_id: i64, result: &str) -> CreateDecisionRecord {
    CreateDecisionRecord {
        decision_type: "transfer_validation".to_string(),
        subject_type: "transfer".to_string(),
        subject_id,
        asset_id: None,
        rule_set_version: Some(1),
        input_snapshot: serde_json::json!({ "subject_id": subject_id, "units": 100 }),
        rule_version_snapshot: serde_json::json!({ "rule_set_version": 1 }),
        result: result.to_string(),
        result_details: serde_json::json!({
            "checks": [],
            "overall": result,
            "violation_count": 0,
        }),
        evaluated_by: None,
    }
}

async fn append(pool: &PgPool, input: &CreateDecisionRecord) -> registra_db::models::decision_record::DecisionRecord {
    let mut tx = pool.begin().await.unwrap();
    let created = DecisionRecordRepo::append(&mut tx, TENANT, input).await.unwrap();
    tx.commit().await.unwrap();
    created
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_chain_links_sequential_records(pool: PgPool) {
    let first = append(&pool, &record(1, "approved")).await;
    let second = append(&pool, &record(2, "rejected")).await;
    let third = append(&pool, &record(3, "approved")).await;

    assert_eq!(first.sequence_number, 1);
    assert!(first.previous_hash.is_none());
    assert_eq!(second.sequence_number, 2);
    assert_eq!(second.previous_hash.as_deref(), Some(first.integrity_hash.as_str()));
    assert_eq!(third.previous_hash.as_deref(), Some(second.integrity_hash.as_str()));

    let verification = DecisionRecordRepo::verify_chain(&pool, TENANT).await.unwrap();
    assert!(verification.chain_valid);
    assert_eq!(verification.verified_records, 3);
    assert!(verification.first_break.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_chains_are_per_tenant(pool: PgPool) {
    append(&pool, &record(1, "approved")).await;

    let mut tx = pool.begin().await.unwrap();
    let other = DecisionRecordRepo::append(&mut tx, "other-tenant", &record(9, "approved"))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // The other tenant starts its own chain from scratch.
    assert_eq!(other.sequence_number, 1);
    assert!(other.previous_hash.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_records_are_immutable(pool: PgPool) {
    let created = append(&pool, &record(1, "approved")).await;

    // UPDATE and DELETE are rewritten to no-ops by the schema.
    sqlx::query("UPDATE decision_records SET result = 'rejected' WHERE id = $1")
        .bind(created.id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM decision_records WHERE id = $1")
        .bind(created.id)
        .execute(&pool)
        .await
        .unwrap();

    let survivor = DecisionRecordRepo::find_by_id(&pool, TENANT, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(survivor.result, "approved");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verify_chain_detects_snapshot_tampering(pool: PgPool) {
    append(&pool, &record(1, "approved")).await;
    let second = append(&pool, &record(2, "approved")).await;
    append(&pool, &record(3, "rejected")).await;

    // The append-only rewrite rules swallow in-band UPDATEs, so drop
    // them first to simulate out-of-band tampering with a stored row.
    sqlx::query("DROP RULE decision_records_no_update ON decision_records")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE decision_records SET input_snapshot = '{\"units\": 1}'::jsonb WHERE id = $1")
        .bind(second.id)
        .execute(&pool)
        .await
        .unwrap();

    let verification = DecisionRecordRepo::verify_chain(&pool, TENANT).await.unwrap();
    assert!(!verification.chain_valid);
    assert_eq!(verification.verified_records, 1);
    assert_eq!(verification.first_break, Some(second.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_subject_newest_first(pool: PgPool) {
    append(&pool, &record(7, "rejected")).await;
    append(&pool, &record(7, "approved")).await;
    append(&pool, &record(8, "approved")).await;

    let records = DecisionRecordRepo::list_by_subject(&pool, TENANT, "transfer", 7)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].result, "approved");
    assert_eq!(records[1].result, "rejected");
}
