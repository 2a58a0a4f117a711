//! Scheduled expiry cleanup for interview requests.
//!
//! An explicit ticker task owned by the process supervisor: after a startup
//! grace delay it runs on a fixed cadence, deactivates requests past their
//! expiry instant, notifies their owners, and deletes the reaped rows.
//!
//! ```text
//! Ticker (every cleanup_interval, first run after cleanup_initial_delay)
//!     │
//!     └─► run_expiry_cleanup()
//!             ├─► deactivate requests with active AND expired_at < now
//!             ├─► per request: "request-expired" notification to the owner
//!             └─► batch-delete the reaped requests
//! ```

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domains::matching::models::InterviewRequest;
use crate::domains::notifications::{NotificationDispatcher, NotificationRequest, Recipient};
use crate::domains::users::models::User;

/// What one cleanup run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// Requests deactivated this run.
    pub reaped: usize,
    /// Rows removed by the trailing batch delete.
    pub deleted: u64,
    /// Owners whose notification could not be attempted or fully delivered.
    pub notification_failures: usize,
}

/// Spawn the cleanup ticker task.
///
/// The first run happens `initial_delay` after boot - never immediately -
/// and every `interval` after that. The task runs for the life of the
/// process; a failed run is logged and the ticker keeps going.
pub fn start_cleanup_scheduler(
    pool: PgPool,
    dispatcher: Arc<NotificationDispatcher>,
    interval: Duration,
    initial_delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            initial_delay_secs = initial_delay.as_secs(),
            "Expiry cleanup scheduler started"
        );

        tokio::time::sleep(initial_delay).await;
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            match run_expiry_cleanup(&pool, &dispatcher).await {
                Ok(stats) => {
                    info!(
                        reaped = stats.reaped,
                        deleted = stats.deleted,
                        notification_failures = stats.notification_failures,
                        "Expiry cleanup run complete"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Expiry cleanup run failed");
                }
            }
        }
    })
}

/// Run one cleanup pass.
///
/// "Now" is snapshotted once at run start, so a request cannot be matched
/// and expired by the same logical instant, and a request expiring mid-scan
/// is picked up by the next run instead. Per-owner notification failures
/// are counted but never abort the batch; deletion waits until every
/// notification has been attempted, not until any of them succeeded.
pub async fn run_expiry_cleanup(
    pool: &PgPool,
    dispatcher: &NotificationDispatcher,
) -> Result<CleanupStats> {
    let now = Utc::now();

    let reaped = InterviewRequest::deactivate_expired_before(now, pool).await?;
    if reaped.is_empty() {
        return Ok(CleanupStats::default());
    }

    info!(count = reaped.len(), cutoff = %now, "Reaping expired interview requests");

    let mut notification_failures = 0;
    for request in &reaped {
        match User::find_by_id(request.user_id, pool).await {
            Ok(Some(user)) => {
                let summary = dispatcher
                    .dispatch(NotificationRequest::request_expired(Recipient::from(user)))
                    .await;
                if summary.delivered == 0 && summary.attempted > 0 {
                    notification_failures += 1;
                }
            }
            Ok(None) => {
                warn!(
                    request_id = %request.id,
                    user_id = %request.user_id,
                    "Expired request owner has no user record"
                );
                notification_failures += 1;
            }
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    user_id = %request.user_id,
                    error = %e,
                    "Failed to load expired request owner"
                );
                notification_failures += 1;
            }
        }
    }

    let ids: Vec<Uuid> = reaped.iter().map(|r| r.id).collect();
    let deleted = InterviewRequest::delete_batch(&ids, pool).await?;

    Ok(CleanupStats {
        reaped: reaped.len(),
        deleted,
        notification_failures,
    })
}
