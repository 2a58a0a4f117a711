// TestDependencies - mock implementations for testing
//
// Mock transports that can stand in for the real email / web-push clients
// in dispatcher and integration tests. Each records the calls it received
// and can be flipped into a failing mode.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{BaseEmailService, BaseWebPushService};

// =============================================================================
// Mock Email Service
// =============================================================================

/// Arguments captured from a send_email call
#[derive(Debug, Clone)]
pub struct EmailCallArgs {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct MockEmailService {
    calls: Arc<Mutex<Vec<EmailCallArgs>>>,
    fail: bool,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail with a transport error
    pub fn failing() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<EmailCallArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseEmailService for MockEmailService {
    async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("mock email transport down");
        }
        self.calls.lock().unwrap().push(EmailCallArgs {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// Mock Web Push Service
// =============================================================================

/// Arguments captured from a send_web_push call
#[derive(Debug, Clone)]
pub struct WebPushCallArgs {
    pub push_token: String,
    pub payload: serde_json::Value,
}

#[derive(Default)]
pub struct MockWebPushService {
    calls: Arc<Mutex<Vec<WebPushCallArgs>>>,
    fail: bool,
}

impl MockWebPushService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<WebPushCallArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseWebPushService for MockWebPushService {
    async fn send_web_push(&self, push_token: &str, payload: serde_json::Value) -> Result<()> {
        if self.fail {
            anyhow::bail!("mock web push transport down");
        }
        self.calls.lock().unwrap().push(WebPushCallArgs {
            push_token: push_token.to_string(),
            payload,
        });
        Ok(())
    }
}
