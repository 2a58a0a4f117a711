//! Request/time-slot matching and lifecycle engine.
//!
//! `submit` persists a new request and immediately tries to match it against
//! the active pool of opposite-role, same-mastery requests. The booking of
//! both sides - one slot booked, siblings expired, both requests deactivated -
//! is a single transaction; notification fan-out happens after commit and is
//! best-effort.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::common::Role;
use crate::domains::matching::errors::MatchingError;
use crate::domains::matching::models::{InterviewRequest, TimeSlot};
use crate::domains::notifications::{NotificationDispatcher, NotificationRequest, Recipient};
use crate::domains::users::models::User;

/// Input for a new standing offer to be matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub user_id: Uuid,
    pub role: Role,
    pub mastery_id: i32,
    pub expired_at: DateTime<Utc>,
}

/// Ephemeral association of one candidate and one interviewer request.
///
/// Never persisted. Role assignment comes from each request's own role
/// field, never from submission order.
#[derive(Debug, Clone)]
pub struct InterviewPair {
    pub interview_id: Uuid,
    pub candidate: InterviewRequest,
    pub interviewer: InterviewRequest,
    pub scheduled_at: DateTime<Utc>,
}

impl InterviewPair {
    fn from_requests(
        a: InterviewRequest,
        b: InterviewRequest,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        let (candidate, interviewer) = match a.role {
            Role::Candidate => (a, b),
            Role::Interviewer => (b, a),
        };
        Self {
            interview_id: Uuid::new_v4(),
            candidate,
            interviewer,
            scheduled_at,
        }
    }
}

/// Result of a submission. "No match yet" is a normal outcome, not an error.
#[derive(Debug)]
pub enum MatchOutcome {
    Matched(InterviewPair),
    Pending(InterviewRequest),
}

pub struct MatchingEngine {
    pool: PgPool,
    dispatcher: Arc<NotificationDispatcher>,
}

impl MatchingEngine {
    pub fn new(pool: PgPool, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { pool, dispatcher }
    }

    /// Persist a request with its offered slots and attempt an immediate
    /// match.
    ///
    /// Matching rule: earliest-created candidate whose pending slots share
    /// an instant with the offered set wins; within one candidate the
    /// earliest shared instant is booked. A candidate claimed by a
    /// concurrent match mid-scan is treated as gone, not as an error.
    #[instrument(skip(self, slots), fields(user_id = %new_request.user_id, role = ?new_request.role, mastery_id = new_request.mastery_id))]
    pub async fn submit(
        &self,
        new_request: NewRequest,
        slots: Vec<DateTime<Utc>>,
    ) -> Result<MatchOutcome, MatchingError> {
        let mut tx = self.pool.begin().await?;

        let request = InterviewRequest::insert(
            new_request.user_id,
            new_request.role,
            new_request.mastery_id,
            new_request.expired_at,
            &mut *tx,
        )
        .await?;
        TimeSlot::insert_many(request.id, &slots, &mut *tx).await?;

        let candidates = InterviewRequest::find_pool_candidates(
            request.role.opposite(),
            request.mastery_id,
            &slots,
            request.id,
            &mut *tx,
        )
        .await?;

        for pool_candidate in candidates {
            // Single-writer-wins: a concurrent match racing for the same
            // candidate leaves this update with zero rows and we move on.
            let Some(counterpart) =
                InterviewRequest::claim(pool_candidate.request_id, &mut *tx).await?
            else {
                continue;
            };

            let instant = pool_candidate.shared_instant;
            let request = InterviewRequest::deactivate(request.id, &mut *tx).await?;

            TimeSlot::book_slot(request.id, instant, &mut *tx).await?;
            TimeSlot::book_slot(counterpart.id, instant, &mut *tx).await?;
            TimeSlot::expire_other_slots(request.id, instant, &mut *tx).await?;
            TimeSlot::expire_other_slots(counterpart.id, instant, &mut *tx).await?;

            tx.commit().await?;

            let pair = InterviewPair::from_requests(request, counterpart, instant);
            info!(
                interview_id = %pair.interview_id,
                candidate_request = %pair.candidate.id,
                interviewer_request = %pair.interviewer.id,
                scheduled_at = %pair.scheduled_at,
                "Matched interview pair"
            );

            self.notify_scheduled(&pair).await;

            return Ok(MatchOutcome::Matched(pair));
        }

        tx.commit().await?;
        info!(request_id = %request.id, "No match found, request stays pending");

        Ok(MatchOutcome::Pending(request))
    }

    /// Cancel a scheduled interview from one side and notify the counterpart.
    ///
    /// The pair itself is ephemeral, so the caller supplies what the
    /// counterpart needs to see: which interview, when it was scheduled, and
    /// who backed out.
    pub async fn reject(
        &self,
        counterpart_user_id: Uuid,
        interview_id: Uuid,
        scheduled_at: DateTime<Utc>,
        rejecting_first_name: String,
    ) -> Result<(), MatchingError> {
        match User::find_by_id(counterpart_user_id, &self.pool).await {
            Ok(Some(user)) => {
                self.dispatcher
                    .dispatch(NotificationRequest::rejected(
                        Recipient::from(user),
                        rejecting_first_name,
                        interview_id,
                        scheduled_at,
                    ))
                    .await;
            }
            Ok(None) => {
                warn!(user_id = %counterpart_user_id, "Rejection counterpart not found");
            }
            Err(e) => {
                warn!(user_id = %counterpart_user_id, error = %e, "Failed to load rejection counterpart");
            }
        }

        Ok(())
    }

    /// Emit the two `scheduled` notifications for a fresh pair.
    ///
    /// Best-effort by design: the booking already committed, and a channel
    /// or lookup failure must never unwind it.
    async fn notify_scheduled(&self, pair: &InterviewPair) {
        for request in [&pair.candidate, &pair.interviewer] {
            let user = match User::find_by_id(request.user_id, &self.pool).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(user_id = %request.user_id, "Match participant has no user record");
                    continue;
                }
                Err(e) => {
                    warn!(user_id = %request.user_id, error = %e, "Failed to load match participant");
                    continue;
                }
            };

            let summary = self
                .dispatcher
                .dispatch(NotificationRequest::scheduled(
                    Recipient::from(user),
                    request.role,
                    pair.interview_id,
                    pair.scheduled_at,
                ))
                .await;

            if summary.failed > 0 {
                warn!(
                    user_id = %request.user_id,
                    interview_id = %pair.interview_id,
                    failed = summary.failed,
                    "Some channels failed for scheduled notification"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: Role) -> InterviewRequest {
        InterviewRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            mastery_id: 5,
            active: false,
            expired_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pair_roles_come_from_request_fields_not_order() {
        let interviewer = request(Role::Interviewer);
        let candidate = request(Role::Candidate);
        let at = Utc::now();

        // Interviewer submitted first: still fills the interviewer seat.
        let pair = InterviewPair::from_requests(interviewer.clone(), candidate.clone(), at);
        assert_eq!(pair.candidate.id, candidate.id);
        assert_eq!(pair.interviewer.id, interviewer.id);

        let pair = InterviewPair::from_requests(candidate.clone(), interviewer.clone(), at);
        assert_eq!(pair.candidate.id, candidate.id);
        assert_eq!(pair.interviewer.id, interviewer.id);
    }
}
