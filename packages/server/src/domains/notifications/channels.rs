//! Delivery channels for notification fan-out.
//!
//! Channels are a closed set of variants, each behind the same capability
//! trait. The dispatcher is a pure router: everything channel-specific
//! (session lookup, transports, addressing) lives here.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domains::notifications::types::{NotificationRequest, Recipient};
use crate::kernel::session_registry::SessionRegistry;
use crate::kernel::traits::{BaseEmailService, BaseWebPushService};

/// The closed set of delivery channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    LivePush,
    Email,
    WebPush,
}

/// Capability interface shared by every channel.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// Whether this channel can currently reach the recipient.
    ///
    /// An unavailable channel is skipped silently - offline is not an error.
    async fn is_available(&self, recipient: &Recipient) -> bool;

    async fn send(&self, recipient: &Recipient, notification: &NotificationRequest)
        -> Result<()>;
}

/// Pushes the serialized payload to every live connection of the recipient.
pub struct LivePushChannel {
    registry: SessionRegistry,
}

impl LivePushChannel {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl NotificationChannel for LivePushChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::LivePush
    }

    async fn is_available(&self, recipient: &Recipient) -> bool {
        !self.registry.sessions_for(recipient.user_id).await.is_empty()
    }

    async fn send(
        &self,
        recipient: &Recipient,
        notification: &NotificationRequest,
    ) -> Result<()> {
        let payload = serde_json::to_value(&notification.payload)?;

        // One text frame per connection in the recipient's live set. A
        // connection that died since the snapshot just drops its frame.
        for session in self.registry.sessions_for(recipient.user_id).await {
            if !self.registry.is_open(&session) {
                continue;
            }
            if !session.push(payload.clone()) {
                debug!(
                    session_id = %session.id(),
                    user_id = %recipient.user_id,
                    "Live push skipped: connection closed mid-send"
                );
            }
        }

        Ok(())
    }
}

/// Hands the notification to the transactional email transport.
pub struct EmailChannel {
    email: Arc<dyn BaseEmailService>,
}

impl EmailChannel {
    pub fn new(email: Arc<dyn BaseEmailService>) -> Self {
        Self { email }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn is_available(&self, recipient: &Recipient) -> bool {
        recipient.email.is_some()
    }

    async fn send(
        &self,
        recipient: &Recipient,
        notification: &NotificationRequest,
    ) -> Result<()> {
        let Some(address) = recipient.email.as_deref() else {
            anyhow::bail!("recipient {} has no email address", recipient.user_id);
        };

        let subject = notification
            .subject
            .as_deref()
            .unwrap_or("Peerprep notification");
        let body = match notification.content.as_deref() {
            Some(content) => content.to_string(),
            // Template rendering lives in the email service; the raw payload
            // is enough for types that carry no free text.
            None => serde_json::to_value(&notification.payload)?.to_string(),
        };

        self.email.send_email(address, subject, &body).await
    }
}

/// Hands the serialized payload to the web-push transport.
pub struct WebPushChannel {
    web_push: Arc<dyn BaseWebPushService>,
}

impl WebPushChannel {
    pub fn new(web_push: Arc<dyn BaseWebPushService>) -> Self {
        Self { web_push }
    }
}

#[async_trait]
impl NotificationChannel for WebPushChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::WebPush
    }

    async fn is_available(&self, recipient: &Recipient) -> bool {
        recipient.web_push_token.is_some()
    }

    async fn send(
        &self,
        recipient: &Recipient,
        notification: &NotificationRequest,
    ) -> Result<()> {
        let Some(token) = recipient.web_push_token.as_deref() else {
            anyhow::bail!("recipient {} has no web push token", recipient.user_id);
        };

        let payload = serde_json::to_value(&notification.payload)?;
        self.web_push.send_web_push(token, payload).await
    }
}
