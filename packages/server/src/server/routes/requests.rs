//! Interview request endpoints: submission and slot reconciliation.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::domains::matching::models::{InterviewRequest, TimeSlot};
use crate::domains::matching::{MatchOutcome, MatchingError, NewRequest};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestBody {
    #[serde(flatten)]
    pub request: NewRequest,
    pub slots: Vec<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestResponse {
    pub outcome: &'static str,
    pub request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date_time: Option<DateTime<Utc>>,
}

/// Submit availability and attempt an immediate match.
///
/// The caller always gets a definite matched/pending outcome synchronously;
/// notification delivery is fire-and-forget behind it.
pub async fn submit_request_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<SubmitRequestBody>,
) -> Result<Json<SubmitRequestResponse>, (StatusCode, String)> {
    let submitter = body.request.user_id;

    match state.engine.submit(body.request, body.slots).await {
        Ok(MatchOutcome::Matched(pair)) => {
            let request_id = if pair.candidate.user_id == submitter {
                pair.candidate.id
            } else {
                pair.interviewer.id
            };
            Ok(Json(SubmitRequestResponse {
                outcome: "matched",
                request_id,
                interview_id: Some(pair.interview_id),
                scheduled_date_time: Some(pair.scheduled_at),
            }))
        }
        Ok(MatchOutcome::Pending(request)) => Ok(Json(SubmitRequestResponse {
            outcome: "pending",
            request_id: request.id,
            interview_id: None,
            scheduled_date_time: None,
        })),
        Err(e) => {
            error!(error = %e, "Request submission failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "request submission failed".to_string(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectInterviewBody {
    pub counterpart_user_id: Uuid,
    pub scheduled_date_time: DateTime<Utc>,
    pub rejecting_first_name: String,
}

/// Cancel a scheduled interview from one side.
///
/// Pairs are ephemeral, so the caller supplies what the counterpart needs
/// to see. Always succeeds from the caller's side; the counterpart
/// notification is best-effort behind it.
pub async fn reject_interview_handler(
    Extension(state): Extension<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(body): Json<RejectInterviewBody>,
) -> Result<StatusCode, (StatusCode, String)> {
    match state
        .engine
        .reject(
            body.counterpart_user_id,
            interview_id,
            body.scheduled_date_time,
            body.rejecting_first_name,
        )
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!(error = %e, "Interview rejection failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "interview rejection failed".to_string(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSlotsBody {
    pub slots: Vec<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub id: Uuid,
    pub date_time: DateTime<Utc>,
    pub status: crate::domains::matching::models::SlotStatus,
}

/// Reconcile the future pending slots of a request to the given set.
pub async fn replace_slots_handler(
    Extension(state): Extension<AppState>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<ReplaceSlotsBody>,
) -> Result<Json<Vec<SlotView>>, (StatusCode, String)> {
    match InterviewRequest::find_by_id(request_id, &state.db_pool).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("interview request {} not found", request_id),
            ))
        }
        Err(e) => {
            error!(error = %e, "Request lookup failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "request lookup failed".to_string(),
            ));
        }
    }

    match TimeSlot::replace_future_slots(request_id, &body.slots, &state.db_pool).await {
        Ok(slots) => Ok(Json(
            slots
                .into_iter()
                .map(|s| SlotView {
                    id: s.id,
                    date_time: s.date_time,
                    status: s.status,
                })
                .collect(),
        )),
        Err(MatchingError::RequestNotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            format!("interview request {} not found", id),
        )),
        Err(e) => {
            error!(error = %e, "Slot reconciliation failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "slot reconciliation failed".to_string(),
            ))
        }
    }
}
