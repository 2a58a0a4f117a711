use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the matching engine and the time-slot ledger.
///
/// "No match found" is not an error - it is a normal [`MatchOutcome`]
/// variant. These errors are invariant violations or infrastructure
/// failures.
///
/// [`MatchOutcome`]: crate::domains::matching::MatchOutcome
#[derive(Error, Debug)]
pub enum MatchingError {
    #[error("no pending slot at {instant} for request {request_id}")]
    SlotNotFound {
        request_id: Uuid,
        instant: DateTime<Utc>,
    },

    #[error("interview request {0} not found")]
    RequestNotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
