//! Fans one notification out to its delivery channels.
//!
//! The dispatcher is a pure router over a fixed `ChannelKind → channel` map
//! populated at startup. Channel attempts are isolated: an unavailable
//! channel is skipped, a transport failure is logged, and neither ever
//! reaches the triggering business operation - a match or a cleanup
//! deactivation succeeds even if every channel fails.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, warn};

use crate::domains::notifications::channels::{
    ChannelKind, EmailChannel, LivePushChannel, NotificationChannel, WebPushChannel,
};
use crate::domains::notifications::models::Notification;
use crate::domains::notifications::types::{NotificationRequest, NotificationType};
use crate::kernel::session_registry::SessionRegistry;
use crate::kernel::traits::{BaseEmailService, BaseWebPushService};

/// Outcome of one dispatch, for callers that want to log or count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct NotificationDispatcher {
    pool: PgPool,
    channels: HashMap<ChannelKind, Arc<dyn NotificationChannel>>,
}

/// Which channels a notification type goes out on.
fn routes_for(notification_type: NotificationType) -> &'static [ChannelKind] {
    match notification_type {
        NotificationType::Scheduled
        | NotificationType::Rejected
        | NotificationType::RequestExpired => &[ChannelKind::LivePush, ChannelKind::Email],
        NotificationType::Greeting => &[ChannelKind::LivePush],
        NotificationType::Feedback => &[ChannelKind::LivePush, ChannelKind::WebPush],
    }
}

impl NotificationDispatcher {
    /// Build the dispatcher with the standard channel set.
    pub fn new(
        pool: PgPool,
        registry: SessionRegistry,
        email: Arc<dyn BaseEmailService>,
        web_push: Arc<dyn BaseWebPushService>,
    ) -> Self {
        Self::from_channels(
            pool,
            vec![
                Arc::new(LivePushChannel::new(registry)),
                Arc::new(EmailChannel::new(email)),
                Arc::new(WebPushChannel::new(web_push)),
            ],
        )
    }

    /// Build the dispatcher from an explicit channel set (tests swap in mocks).
    pub fn from_channels(pool: PgPool, channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self {
            pool,
            channels: channels.into_iter().map(|c| (c.kind(), c)).collect(),
        }
    }

    /// Deliver one notification across its channels. Fire-and-forget from
    /// the caller's perspective: never returns an error.
    pub async fn dispatch(&self, notification: NotificationRequest) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        if notification.persistent {
            if let Err(e) = Notification::record(&notification, &self.pool).await {
                warn!(
                    user_id = %notification.recipient.user_id,
                    notification_type = notification.notification_type.as_str(),
                    error = %e,
                    "Failed to persist durable notification copy"
                );
            }
        }

        for kind in routes_for(notification.notification_type) {
            summary.attempted += 1;

            let Some(channel) = self.channels.get(kind) else {
                warn!(channel = ?kind, "No channel registered for kind");
                summary.skipped += 1;
                continue;
            };

            if !channel.is_available(&notification.recipient).await {
                debug!(
                    channel = ?kind,
                    user_id = %notification.recipient.user_id,
                    "Channel unavailable for recipient, skipping"
                );
                summary.skipped += 1;
                continue;
            }

            match channel.send(&notification.recipient, &notification).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    warn!(
                        channel = ?kind,
                        user_id = %notification.recipient.user_id,
                        notification_type = notification.notification_type.as_str(),
                        error = %e,
                        "Channel delivery failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::notifications::types::Recipient;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn lazy_pool() -> PgPool {
        // Never connected: the tests below only dispatch non-persistent
        // notifications or rely on the durable write being best-effort.
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    fn recipient() -> Recipient {
        Recipient {
            user_id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            email: Some("ada@example.org".to_string()),
            web_push_token: Some("push-token".to_string()),
        }
    }

    struct StubChannel {
        kind: ChannelKind,
        available: bool,
        fail: bool,
        sent: Mutex<Vec<Uuid>>,
    }

    impl StubChannel {
        fn new(kind: ChannelKind) -> Self {
            Self {
                kind,
                available: true,
                fail: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn unavailable(mut self) -> Self {
            self.available = false;
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait]
    impl NotificationChannel for StubChannel {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        async fn is_available(&self, _recipient: &Recipient) -> bool {
            self.available
        }

        async fn send(
            &self,
            recipient: &Recipient,
            _notification: &NotificationRequest,
        ) -> Result<()> {
            if self.fail {
                anyhow::bail!("transport down");
            }
            self.sent.lock().unwrap().push(recipient.user_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unavailable_channel_is_skipped_not_failed() {
        let live = Arc::new(StubChannel::new(ChannelKind::LivePush).unavailable());
        let email = Arc::new(StubChannel::new(ChannelKind::Email));
        let dispatcher =
            NotificationDispatcher::from_channels(lazy_pool(), vec![live.clone(), email.clone()]);

        // request-expired routes to live-push + email
        let mut notification = NotificationRequest::request_expired(recipient());
        notification.persistent = false;

        let summary = dispatcher.dispatch(notification).await;
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_channel_failure_does_not_stop_remaining_channels() {
        let live = Arc::new(StubChannel::new(ChannelKind::LivePush).failing());
        let email = Arc::new(StubChannel::new(ChannelKind::Email));
        let dispatcher =
            NotificationDispatcher::from_channels(lazy_pool(), vec![live, email.clone()]);

        let mut notification = NotificationRequest::request_expired(recipient());
        notification.persistent = false;

        let summary = dispatcher.dispatch(notification).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_greeting_routes_to_live_push_only() {
        let live = Arc::new(StubChannel::new(ChannelKind::LivePush));
        let email = Arc::new(StubChannel::new(ChannelKind::Email));
        let dispatcher =
            NotificationDispatcher::from_channels(lazy_pool(), vec![live.clone(), email.clone()]);

        let summary = dispatcher
            .dispatch(NotificationRequest::greeting(recipient()))
            .await;

        assert_eq!(summary.attempted, 1);
        assert_eq!(live.sent.lock().unwrap().len(), 1);
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_channel_is_counted_as_skipped() {
        // Feedback routes to live-push + web-push; only live-push registered.
        let live = Arc::new(StubChannel::new(ChannelKind::LivePush));
        let dispatcher = NotificationDispatcher::from_channels(lazy_pool(), vec![live]);

        let mut notification = NotificationRequest::feedback(recipient(), Uuid::new_v4());
        notification.persistent = false;

        let summary = dispatcher.dispatch(notification).await;
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.skipped, 1);
    }
}
