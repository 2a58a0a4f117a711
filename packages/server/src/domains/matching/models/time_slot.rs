use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domains::matching::errors::MatchingError;

/// Lifecycle state of one offered meeting instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "slot_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotStatus {
    Pending,
    Booked,
    Expired,
}

/// Time slot model - SQL persistence layer
///
/// One candidate meeting instant offered under a request. Slot status is
/// kept separate from request status: a request carries many provisional
/// offers while only one is ever realized. When a match books one slot,
/// every sibling slot of both requests expires at the same instant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeSlot {
    pub id: Uuid,
    pub request_id: Uuid,
    pub date_time: DateTime<Utc>,
    pub status: SlotStatus,
}

impl TimeSlot {
    /// Insert pending slots for a request, skipping instants it already offers
    pub async fn insert_many(
        request_id: Uuid,
        instants: &[DateTime<Utc>],
        executor: impl PgExecutor<'_>,
    ) -> Result<(), MatchingError> {
        if instants.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO time_slots (request_id, date_time)
             SELECT $1, unnest($2::timestamptz[])
             ON CONFLICT (request_id, date_time) DO NOTHING",
        )
        .bind(request_id)
        .bind(instants)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Find all slots of a request ordered by instant
    pub async fn find_by_request(
        request_id: Uuid,
        pool: &PgPool,
    ) -> Result<Vec<Self>, MatchingError> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM time_slots WHERE request_id = $1 ORDER BY date_time ASC",
        )
        .bind(request_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark the slot at `instant` as booked.
    ///
    /// Fails with [`MatchingError::SlotNotFound`] when the request offers no
    /// pending slot at that instant - the matching engine treats that as an
    /// invariant violation, never as a normal "no match".
    pub async fn book_slot(
        request_id: Uuid,
        instant: DateTime<Utc>,
        executor: impl PgExecutor<'_>,
    ) -> Result<(), MatchingError> {
        let result = sqlx::query(
            "UPDATE time_slots SET status = 'BOOKED'
             WHERE request_id = $1 AND date_time = $2 AND status = 'PENDING'",
        )
        .bind(request_id)
        .bind(instant)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MatchingError::SlotNotFound {
                request_id,
                instant,
            });
        }

        Ok(())
    }

    /// Expire every slot of a request other than `keep_instant`.
    ///
    /// Idempotent: already-expired slots are left alone, so re-invocation
    /// is a no-op.
    pub async fn expire_other_slots(
        request_id: Uuid,
        keep_instant: DateTime<Utc>,
        executor: impl PgExecutor<'_>,
    ) -> Result<u64, MatchingError> {
        let result = sqlx::query(
            "UPDATE time_slots SET status = 'EXPIRED'
             WHERE request_id = $1 AND date_time <> $2 AND status = 'PENDING'",
        )
        .bind(request_id)
        .bind(keep_instant)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Reconcile the future pending slots of a request to exactly
    /// `new_instants`.
    ///
    /// Pending future slots not in the new set are deleted; slots in the
    /// past or already booked/expired are never touched. Returns the
    /// resulting slot set of the request.
    pub async fn replace_future_slots(
        request_id: Uuid,
        new_instants: &[DateTime<Utc>],
        pool: &PgPool,
    ) -> Result<Vec<Self>, MatchingError> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM time_slots
             WHERE request_id = $1
               AND status = 'PENDING'
               AND date_time > NOW()
               AND NOT (date_time = ANY($2))",
        )
        .bind(request_id)
        .bind(new_instants)
        .execute(&mut *tx)
        .await?;

        Self::insert_many(request_id, new_instants, &mut *tx).await?;

        tx.commit().await?;

        Self::find_by_request(request_id, pool).await
    }
}
