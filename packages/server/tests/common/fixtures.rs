//! Shared fixtures for integration tests.
//!
//! All tests in a binary share one database, so fixtures isolate by data:
//! every test works in its own mastery level and its own users.

use anyhow::Result;
use chrono::{DateTime, Duration, DurationRound, Utc};
use sqlx::PgPool;
use std::sync::atomic::{AtomicI32, Ordering};
use uuid::Uuid;

use server_core::common::Role;
use server_core::domains::matching::models::{InterviewRequest, TimeSlot};
use server_core::domains::matching::NewRequest;
use server_core::domains::users::models::User;

static NEXT_MASTERY: AtomicI32 = AtomicI32::new(10_000);

/// A mastery level no other test in this run uses, so matching pools
/// never overlap across tests.
pub fn unique_mastery() -> i32 {
    NEXT_MASTERY.fetch_add(1, Ordering::SeqCst)
}

/// A future instant truncated to whole seconds, so values survive the
/// round trip through timestamptz unchanged.
pub fn instant_in(hours: i64) -> DateTime<Utc> {
    (Utc::now() + Duration::hours(hours))
        .duration_trunc(Duration::seconds(1))
        .expect("second truncation is always in range")
}

pub async fn create_test_user(first_name: &str, pool: &PgPool) -> Result<User> {
    let email = format!(
        "{}-{}@example.org",
        first_name.to_lowercase(),
        Uuid::new_v4()
    );
    User::insert(first_name, Some(&email), None, pool).await
}

/// Submission input for a request that stays valid for a week.
pub fn new_request(user_id: Uuid, role: Role, mastery_id: i32) -> NewRequest {
    NewRequest {
        user_id,
        role,
        mastery_id,
        expired_at: instant_in(24 * 7),
    }
}

/// Insert an active request with pending slots directly, bypassing the
/// matching engine. Used to seed the pool a test matches against.
pub async fn seed_request(
    user_id: Uuid,
    role: Role,
    mastery_id: i32,
    slots: &[DateTime<Utc>],
    pool: &PgPool,
) -> Result<InterviewRequest> {
    let request =
        InterviewRequest::insert(user_id, role, mastery_id, instant_in(24 * 7), pool).await?;
    TimeSlot::insert_many(request.id, slots, pool).await?;
    Ok(request)
}

/// Insert a request whose expiry instant is already in the past.
pub async fn seed_expired_request(
    user_id: Uuid,
    mastery_id: i32,
    pool: &PgPool,
) -> Result<InterviewRequest> {
    let request = InterviewRequest::insert(
        user_id,
        Role::Candidate,
        mastery_id,
        Utc::now() - Duration::hours(1),
        pool,
    )
    .await?;
    TimeSlot::insert_many(request.id, &[instant_in(48)], pool).await?;
    Ok(request)
}
