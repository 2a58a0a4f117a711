//! Notification value types and their wire payloads.
//!
//! A [`NotificationRequest`] is an immutable description of one notification:
//! built by the triggering component (matching engine, cleanup job, socket
//! handshake), consumed exactly once by the dispatcher, never retried
//! automatically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Role;
use crate::domains::users::models::User;

/// Who a notification is addressed to, carrying everything the delivery
/// channels need to resolve their transports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: Uuid,
    pub first_name: String,
    pub email: Option<String>,
    pub web_push_token: Option<String>,
}

impl From<User> for Recipient {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name,
            email: user.email,
            web_push_token: user.web_push_token,
        }
    }
}

/// Logical notification type. Drives both channel routing and payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    Greeting,
    RequestExpired,
    Rejected,
    Scheduled,
    Feedback,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Greeting => "greeting",
            NotificationType::RequestExpired => "request-expired",
            NotificationType::Rejected => "rejected",
            NotificationType::Scheduled => "scheduled",
            NotificationType::Feedback => "feedback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPayload {
    pub role: Role,
    pub scheduled_date_time: DateTime<Utc>,
    pub interview_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedPayload {
    pub rejection_name: String,
    pub scheduled_date_time: DateTime<Utc>,
    pub rejected_interview_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestExpiredPayload {
    pub user_first_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingPayload {
    pub user_first_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    pub feedback_id: Uuid,
}

/// Typed payload, one variant per notification type.
///
/// Serializes untagged: the wire message is the plain payload object, no
/// envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    Scheduled(ScheduledPayload),
    Rejected(RejectedPayload),
    RequestExpired(RequestExpiredPayload),
    Greeting(GreetingPayload),
    Feedback(FeedbackPayload),
}

/// An immutable value describing one notification to deliver.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub recipient: Recipient,
    pub notification_type: NotificationType,
    /// Subject line for channels that need one (email).
    pub subject: Option<String>,
    /// Free-text body for channels that need one (email).
    pub content: Option<String>,
    pub payload: NotificationPayload,
    pub interview_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub rejection_name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Whether a durable copy is written before channel fan-out.
    pub persistent: bool,
}

impl NotificationRequest {
    /// Both participants of a fresh match get one of these.
    pub fn scheduled(
        recipient: Recipient,
        role: Role,
        interview_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: Some("Your mock interview is scheduled".to_string()),
            content: Some(format!(
                "Hi {}, your mock interview is scheduled for {}.",
                recipient.first_name,
                scheduled_at.to_rfc3339()
            )),
            payload: NotificationPayload::Scheduled(ScheduledPayload {
                role,
                scheduled_date_time: scheduled_at,
                interview_id,
            }),
            recipient,
            notification_type: NotificationType::Scheduled,
            interview_id: Some(interview_id),
            scheduled_at: Some(scheduled_at),
            rejection_name: None,
            created_at: Utc::now(),
            persistent: true,
        }
    }

    /// Emitted by the cleanup job for each reaped request.
    pub fn request_expired(recipient: Recipient) -> Self {
        Self {
            subject: Some("Your interview request expired".to_string()),
            content: Some(format!(
                "Hi {}, your interview request expired without a match. \
                 Submit new availability to keep practicing.",
                recipient.first_name
            )),
            payload: NotificationPayload::RequestExpired(RequestExpiredPayload {
                user_first_name: recipient.first_name.clone(),
            }),
            recipient,
            notification_type: NotificationType::RequestExpired,
            interview_id: None,
            scheduled_at: None,
            rejection_name: None,
            created_at: Utc::now(),
            persistent: true,
        }
    }

    /// Sent to the counterpart when one side cancels a scheduled interview.
    pub fn rejected(
        recipient: Recipient,
        rejection_name: String,
        interview_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: Some("Your mock interview was cancelled".to_string()),
            content: Some(format!(
                "Hi {}, {} cancelled your mock interview scheduled for {}.",
                recipient.first_name,
                rejection_name,
                scheduled_at.to_rfc3339()
            )),
            payload: NotificationPayload::Rejected(RejectedPayload {
                rejection_name: rejection_name.clone(),
                scheduled_date_time: scheduled_at,
                rejected_interview_id: interview_id,
            }),
            recipient,
            notification_type: NotificationType::Rejected,
            interview_id: Some(interview_id),
            scheduled_at: Some(scheduled_at),
            rejection_name: Some(rejection_name),
            created_at: Utc::now(),
            persistent: true,
        }
    }

    /// Sent over the fresh connection when a user comes online.
    pub fn greeting(recipient: Recipient) -> Self {
        Self {
            subject: None,
            content: None,
            payload: NotificationPayload::Greeting(GreetingPayload {
                user_first_name: recipient.first_name.clone(),
            }),
            recipient,
            notification_type: NotificationType::Greeting,
            interview_id: None,
            scheduled_at: None,
            rejection_name: None,
            created_at: Utc::now(),
            persistent: false,
        }
    }

    /// Points a participant at freshly submitted interview feedback.
    pub fn feedback(recipient: Recipient, feedback_id: Uuid) -> Self {
        Self {
            subject: None,
            content: None,
            payload: NotificationPayload::Feedback(FeedbackPayload { feedback_id }),
            recipient,
            notification_type: NotificationType::Feedback,
            interview_id: None,
            scheduled_at: None,
            rejection_name: None,
            created_at: Utc::now(),
            persistent: true,
        }
    }
}
