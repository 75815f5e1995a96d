use std::time::Duration;

use async_trait::async_trait;

use super::{Sink, SinkError};
use crate::submission::record::Envelope;

const MAX_REDIRECTS: usize = 10;
const BODY_EXCERPT: usize = 200;

/// Posts the storage payload to the spreadsheet webhook.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| format!("Failed to build webhook client: {e}"))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Sink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<String, SinkError> {
        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&envelope.payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout(e.to_string())
                } else if e.is_builder() {
                    SinkError::Build(e.to_string())
                } else {
                    SinkError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(BODY_EXCERPT)
            .collect::<String>();

        if status.is_success() {
            Ok(format!("stored (HTTP {})", status.as_u16()))
        } else {
            Err(SinkError::NonSuccessStatus {
                status: status.as_u16(),
                body,
            })
        }
    }
}
