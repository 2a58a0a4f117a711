use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::kernel::traits::BaseEmailService;

const SEND_ENDPOINT: &str = "https://api.resend.com/emails";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Transactional email client
///
/// Thin HTTP client over the email provider's send API. Without an API key
/// (local development) sends are logged and dropped instead of failing the
/// triggering operation.
pub struct EmailClient {
    client: Client,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize)]
struct EmailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl EmailClient {
    pub fn new(api_key: Option<String>, from: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl BaseEmailService for EmailClient {
    async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let Some(api_key) = &self.api_key else {
            warn!(recipient, subject, "EMAIL_API_KEY not set, dropping email");
            return Ok(());
        };

        let message = EmailMessage {
            from: &self.from,
            to: recipient,
            subject,
            text: body,
        };

        info!(recipient, subject, "Sending transactional email");

        let response = self
            .client
            .post(SEND_ENDPOINT)
            .timeout(SEND_TIMEOUT)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            error!("Email send failed {}: {}", status, body);
            anyhow::bail!("Email API error {}: {}", status, body);
        }

        Ok(())
    }
}
