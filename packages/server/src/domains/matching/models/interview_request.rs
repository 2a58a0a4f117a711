use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::common::Role;
use crate::domains::matching::errors::MatchingError;

/// Interview request model - SQL persistence layer
///
/// One user's standing offer to be matched: which side of the table they
/// want to sit on, at what mastery level, and until when the offer stands.
/// A request is deactivated when matched or when reaped by the cleanup job;
/// it is never physically removed while active.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InterviewRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub mastery_id: i32,
    pub active: bool,
    pub expired_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A candidate row from the pool search: which request to claim and on
/// which shared instant the two slot sets intersect.
#[derive(Debug, Clone)]
pub struct PoolCandidate {
    pub request_id: Uuid,
    pub shared_instant: DateTime<Utc>,
}

impl InterviewRequest {
    /// Insert a new active request
    pub async fn insert(
        user_id: Uuid,
        role: Role,
        mastery_id: i32,
        expired_at: DateTime<Utc>,
        executor: impl PgExecutor<'_>,
    ) -> Result<Self, MatchingError> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO interview_requests (user_id, role, mastery_id, expired_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(user_id)
        .bind(role)
        .bind(mastery_id)
        .bind(expired_at)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Find a request by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>, MatchingError> {
        sqlx::query_as::<_, Self>("SELECT * FROM interview_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find active pool candidates whose pending slots intersect the given
    /// instants, excluding the incoming request itself.
    ///
    /// Ordering is the documented matching rule: earliest-created candidate
    /// first, earliest shared instant within a candidate.
    pub async fn find_pool_candidates(
        role: Role,
        mastery_id: i32,
        instants: &[DateTime<Utc>],
        exclude_request: Uuid,
        executor: impl PgExecutor<'_>,
    ) -> Result<Vec<PoolCandidate>, MatchingError> {
        // DISTINCT ON picks the earliest shared instant per candidate; the
        // outer ORDER BY restores FIFO creation order across candidates.
        let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            "SELECT c.id, c.date_time FROM (
                 SELECT DISTINCT ON (r.id) r.id, r.created_at, s.date_time
                 FROM interview_requests r
                 JOIN time_slots s ON s.request_id = r.id
                 WHERE r.active = true
                   AND r.role = $1
                   AND r.mastery_id = $2
                   AND r.id <> $3
                   AND s.status = 'PENDING'
                   AND s.date_time = ANY($4)
                 ORDER BY r.id, s.date_time ASC
             ) c
             ORDER BY c.created_at ASC",
        )
        .bind(role)
        .bind(mastery_id)
        .bind(exclude_request)
        .bind(instants)
        .fetch_all(executor)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(request_id, shared_instant)| PoolCandidate {
                request_id,
                shared_instant,
            })
            .collect())
    }

    /// Claim an active request with a single-writer-wins update.
    ///
    /// Returns the deactivated request, or `None` when another match already
    /// took it - the losing racer treats that as "candidate gone" and moves
    /// on rather than erroring.
    pub async fn claim(
        id: Uuid,
        executor: impl PgExecutor<'_>,
    ) -> Result<Option<Self>, MatchingError> {
        sqlx::query_as::<_, Self>(
            "UPDATE interview_requests SET active = false
             WHERE id = $1 AND active = true
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(Into::into)
    }

    /// Deactivate a request unconditionally
    pub async fn deactivate(id: Uuid, executor: impl PgExecutor<'_>) -> Result<Self, MatchingError> {
        sqlx::query_as::<_, Self>(
            "UPDATE interview_requests SET active = false WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(MatchingError::RequestNotFound(id))
    }

    /// Deactivate every request that is active and expired before `instant`,
    /// returning the affected rows.
    ///
    /// The instant is evaluated once by the caller, so a request cannot be
    /// both matched and expired by the same logical "now".
    pub async fn deactivate_expired_before(
        instant: DateTime<Utc>,
        executor: impl PgExecutor<'_>,
    ) -> Result<Vec<Self>, MatchingError> {
        sqlx::query_as::<_, Self>(
            "UPDATE interview_requests SET active = false
             WHERE active = true AND expired_at < $1
             RETURNING *",
        )
        .bind(instant)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    /// Batch-delete reaped requests (slots go with them via FK cascade)
    pub async fn delete_batch(ids: &[Uuid], pool: &PgPool) -> Result<u64, MatchingError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM interview_requests WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
