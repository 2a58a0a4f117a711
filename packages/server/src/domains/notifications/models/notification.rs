use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domains::notifications::types::NotificationRequest;

/// Notification record - durable copy of a delivered notification
///
/// Only notifications flagged `persistent` are written here; live-only
/// traffic (greetings) never is.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub interview_id: Option<Uuid>,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Record a durable copy of a notification
    pub async fn record(notification: &NotificationRequest, pool: &PgPool) -> Result<()> {
        let payload = serde_json::to_value(&notification.payload)?;

        sqlx::query(
            "INSERT INTO notifications (user_id, notification_type, interview_id, payload)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(notification.recipient.user_id)
        .bind(notification.notification_type.as_str())
        .bind(notification.interview_id)
        .bind(payload)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Find all durable notifications for a user, newest first
    pub async fn find_by_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
