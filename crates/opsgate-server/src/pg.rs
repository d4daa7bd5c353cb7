//! Postgres-backed stores for execution requests and the decision log.
//!
//! The pool is constructed once and injected; there is no module-level
//! singleton. Status values are stored as their wire text and parsed back on
//! read, so rows stay greppable in psql. `transition` is a single
//! conditional `UPDATE … WHERE status = $from`, which is what closes the
//! concurrent-approval race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsgate_core::audit::DecisionLogEntry;
use opsgate_core::store::{DecisionLogStore, ExecutionRequestStore};
use opsgate_core::types::{ExecutionRequest, RequestStatus};
use opsgate_core::{OpsgateError, Result};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Pool / schema bootstrap
// ---------------------------------------------------------------------------

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS exec_requests (
        id UUID PRIMARY KEY,
        candidate_id TEXT NOT NULL,
        status TEXT NOT NULL,
        action_type TEXT NOT NULL,
        requested_by_user_id TEXT,
        target_user_id TEXT,
        target_org_id TEXT,
        payload JSONB NOT NULL DEFAULT '{}'::jsonb,
        rationale TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS exec_requests_status_idx ON exec_requests (status)",
    "CREATE INDEX IF NOT EXISTS exec_requests_candidate_idx ON exec_requests (candidate_id)",
    "CREATE TABLE IF NOT EXISTS decision_log (
        id BIGSERIAL PRIMARY KEY,
        candidate_id TEXT,
        actor TEXT NOT NULL,
        action TEXT NOT NULL,
        reason TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
];

/// Connect and make sure the tables exist.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(storage_err)?;
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .map_err(storage_err)?;
    }
    Ok(pool)
}

fn storage_err(e: sqlx::Error) -> OpsgateError {
    OpsgateError::Storage(e.to_string())
}

// ---------------------------------------------------------------------------
// PgExecutionRequestStore
// ---------------------------------------------------------------------------

pub struct PgExecutionRequestStore {
    pool: PgPool,
}

impl PgExecutionRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_request(row: &PgRow) -> Result<ExecutionRequest> {
    let status: String = row.try_get("status").map_err(storage_err)?;
    let action_type: String = row.try_get("action_type").map_err(storage_err)?;
    let payload: Value = row.try_get("payload").map_err(storage_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(storage_err)?;

    Ok(ExecutionRequest {
        id: row.try_get("id").map_err(storage_err)?,
        candidate_id: row.try_get("candidate_id").map_err(storage_err)?,
        status: status.parse()?,
        action_type: action_type.parse()?,
        requested_by_user_id: row.try_get("requested_by_user_id").map_err(storage_err)?,
        target_user_id: row.try_get("target_user_id").map_err(storage_err)?,
        target_org_id: row.try_get("target_org_id").map_err(storage_err)?,
        payload: payload.as_object().cloned().unwrap_or_default(),
        rationale: row.try_get("rationale").map_err(storage_err)?,
        created_at,
    })
}

#[async_trait]
impl ExecutionRequestStore for PgExecutionRequestStore {
    async fn create(&self, request: &ExecutionRequest) -> Result<()> {
        sqlx::query(
            "INSERT INTO exec_requests
                (id, candidate_id, status, action_type, requested_by_user_id,
                 target_user_id, target_org_id, payload, rationale, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(request.id)
        .bind(&request.candidate_id)
        .bind(request.status.as_str())
        .bind(request.action_type.as_str())
        .bind(&request.requested_by_user_id)
        .bind(&request.target_user_id)
        .bind(&request.target_org_id)
        .bind(Value::Object(request.payload.clone()))
        .bind(&request.rationale)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ExecutionRequest>> {
        let row = sqlx::query("SELECT * FROM exec_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        row.as_ref().map(row_to_request).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<ExecutionRequest>> {
        let rows = sqlx::query(
            "SELECT * FROM exec_requests WHERE status = $1 ORDER BY created_at",
        )
        .bind(RequestStatus::PendingApproval.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows.iter().map(row_to_request).collect()
    }

    async fn list_pending_by_candidate(&self, candidate_id: &str) -> Result<Vec<ExecutionRequest>> {
        let rows = sqlx::query(
            "SELECT * FROM exec_requests
             WHERE status = $1 AND candidate_id = $2 ORDER BY created_at",
        )
        .bind(RequestStatus::PendingApproval.as_str())
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows.iter().map(row_to_request).collect()
    }

    async fn transition(&self, id: Uuid, from: RequestStatus, to: RequestStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE exec_requests SET status = $1 WHERE id = $2 AND status = $3",
        )
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(result.rows_affected() == 1)
    }
}

// ---------------------------------------------------------------------------
// PgDecisionLogStore
// ---------------------------------------------------------------------------

pub struct PgDecisionLogStore {
    pool: PgPool,
}

impl PgDecisionLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionLogStore for PgDecisionLogStore {
    async fn append(&self, entry: &DecisionLogEntry, candidate_id: Option<&str>) -> Result<()> {
        sqlx::query(
            "INSERT INTO decision_log (candidate_id, actor, action, reason, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(candidate_id)
        .bind(entry.actor.as_str())
        .bind(entry.action.as_str())
        .bind(&entry.reason)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}
