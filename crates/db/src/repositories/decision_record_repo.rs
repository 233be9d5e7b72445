//! Repository for the `decision_records` table.
//!
//! Records are append-only. `append` computes the next sequence number
//! and the integrity hash itself, serializing concurrent writers by
//! locking the current chain head; callers never supply chain fields.

use sqlx::{PgConnection, PgPool};

use registra_core::decision::{canonical_entry_data, compute_integrity_hash};
use registra_core::types::DbId;

use crate::models::decision_record::{ChainVerification, CreateDecisionRecord, DecisionRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, decision_type, subject_type, subject_id, asset_id, \
    rule_set_version, input_snapshot, rule_version_snapshot, result, \
    result_details, evaluated_by, sequence_number, previous_hash, \
    integrity_hash, created_at";

/// Provides append and audit operations for decision records.
pub struct DecisionRecordRepo;

impl DecisionRecordRepo {
    /// Append a decision record, extending the tenant's hash chain.
    ///
    /// Runs on a transaction connection so the record commits or rolls
    /// back together with the operation it documents.
    pub async fn append(
        conn: &mut PgConnection,
        tenant_id: &str,
        input: &CreateDecisionRecord,
    ) -> Result<DecisionRecord, sqlx::Error> {
        // Lock the chain head so concurrent appends serialize.
        let head: Option<(i64, String)> = sqlx::query_as(
            "SELECT sequence_number, integrity_hash FROM decision_records
             WHERE tenant_id = $1
             ORDER BY sequence_number DESC LIMIT 1
             FOR UPDATE",
        )
        .bind(tenant_id)
        .fetch_optional(&mut *conn)
        .await?;

        let (sequence_number, previous_hash) = match head {
            Some((seq, hash)) => (seq + 1, Some(hash)),
            None => (1, None),
        };

        let entry_data = canonical_entry_data(
            &input.decision_type,
            input.subject_id,
            &input.result,
            &input.input_snapshot,
            &input.rule_version_snapshot,
            &input.result_details,
        );
        let integrity_hash = compute_integrity_hash(previous_hash.as_deref(), &entry_data);

        let query = format!(
            "INSERT INTO decision_records
                (tenant_id, decision_type, subject_type, subject_id, asset_id,
                 rule_set_version, input_snapshot, rule_version_snapshot,
                 result, result_details, evaluated_by,
                 sequence_number, previous_hash, integrity_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DecisionRecord>(&query)
            .bind(tenant_id)
            .bind(&input.decision_type)
            .bind(&input.subject_type)
            .bind(input.subject_id)
            .bind(input.asset_id)
            .bind(input.rule_set_version)
            .bind(&input.input_snapshot)
            .bind(&input.rule_version_snapshot)
            .bind(&input.result)
            .bind(&input.result_details)
            .bind(input.evaluated_by)
            .bind(sequence_number)
            .bind(&previous_hash)
            .bind(&integrity_hash)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<DecisionRecord>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM decision_records WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, DecisionRecord>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List records for a subject, newest first.
    pub async fn list_by_subject(
        pool: &PgPool,
        tenant_id: &str,
        subject_type: &str,
        subject_id: DbId,
    ) -> Result<Vec<DecisionRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_records
             WHERE tenant_id = $1 AND subject_type = $2 AND subject_id = $3
             ORDER BY sequence_number DESC"
        );
        sqlx::query_as::<_, DecisionRecord>(&query)
            .bind(tenant_id)
            .bind(subject_type)
            .bind(subject_id)
            .fetch_all(pool)
            .await
    }

    /// List recent records, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DecisionRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_records
             WHERE tenant_id = $1
             ORDER BY sequence_number DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, DecisionRecord>(&query)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Walk the tenant's chain from the start, recomputing every hash.
    pub async fn verify_chain(
        pool: &PgPool,
        tenant_id: &str,
    ) -> Result<ChainVerification, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_records
             WHERE tenant_id = $1
             ORDER BY sequence_number ASC"
        );
        let records = sqlx::query_as::<_, DecisionRecord>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

        let mut previous: Option<String> = None;
        let mut expected_seq = 1i64;
        for record in &records {
            let entry_data = canonical_entry_data(
                &record.decision_type,
                record.subject_id,
                &record.result,
                &record.input_snapshot,
                &record.rule_version_snapshot,
                &record.result_details,
            );
            let expected_hash = compute_integrity_hash(previous.as_deref(), &entry_data);
            let links_ok = record.previous_hash == previous
                && record.integrity_hash == expected_hash
                && record.sequence_number == expected_seq;
            if !links_ok {
                return Ok(ChainVerification {
                    verified_records: expected_seq - 1,
                    chain_valid: false,
                    first_break: Some(record.id),
                });
            }
            previous = Some(record.integrity_hash.clone());
            expected_seq += 1;
        }

        Ok(ChainVerification {
            verified_records: records.len() as i64,
            chain_valid: true,
            first_break: None,
        })
    }
}
