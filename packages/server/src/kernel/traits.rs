// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Channel routing
// and payload construction live in the notifications domain; these traits
// cover the outbound transports it hands off to.
//
// Naming convention: Base* for trait names (e.g., BaseEmailService)

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Email Transport Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseEmailService: Send + Sync {
    /// Send a transactional email. The implementation owns template
    /// rendering and timeouts.
    async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

// =============================================================================
// Web Push Transport Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseWebPushService: Send + Sync {
    /// Send a web push message to a registered push token.
    async fn send_web_push(&self, push_token: &str, payload: serde_json::Value) -> Result<()>;
}
