use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::kernel::traits::BaseWebPushService;

const PUSH_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Web push client
///
/// Sends push messages to browser/app push tokens through the push gateway.
pub struct WebPushClient {
    client: Client,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    to: &'a str,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    data: Vec<PushTicket>,
}

#[derive(Debug, Deserialize)]
struct PushTicket {
    status: String,
    #[allow(dead_code)]
    message: Option<String>,
}

impl WebPushClient {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            access_token,
        }
    }
}

#[async_trait]
impl BaseWebPushService for WebPushClient {
    async fn send_web_push(&self, push_token: &str, payload: serde_json::Value) -> Result<()> {
        let message = PushMessage {
            to: push_token,
            data: payload,
        };

        let mut request = self
            .client
            .post(PUSH_ENDPOINT)
            .timeout(SEND_TIMEOUT)
            .json(&message);

        // Access token raises rate limits; sends work without one.
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        } else {
            warn!("WEB_PUSH_API_KEY not set, sending unauthenticated");
        }

        info!(push_token, "Sending web push message");

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            error!("Web push failed {}: {}", status, body);
            anyhow::bail!("Web push API error {}: {}", status, body);
        }

        let push_response: PushResponse = response.json().await?;
        for ticket in &push_response.data {
            if ticket.status == "error" {
                error!("Web push ticket error: {:?}", ticket);
                anyhow::bail!("Web push ticket error: {:?}", ticket);
            }
        }

        Ok(())
    }
}
